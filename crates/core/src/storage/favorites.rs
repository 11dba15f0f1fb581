//! Favorite lines, keyed by line id.

use serde::{Deserialize, Serialize};

use helpbus_transit::{Line, LineIdentifier};

use super::{KeyValueStore, StoreKey, get_json, set_json};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: LineIdentifier,
    pub name: String,
    /// The line's destination, offered as a search shortcut
    pub address: String,
}

pub struct Favorites<S> {
    store: S,
}

impl<S: KeyValueStore> Favorites<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Vec<Favorite>> {
        Ok(get_json(&self.store, StoreKey::Favorites)?.unwrap_or_default())
    }

    pub fn contains(&self, id: &LineIdentifier) -> Result<bool> {
        Ok(self.load()?.iter().any(|f| &f.id == id))
    }

    /// Add `line` if absent, remove it otherwise. Returns whether the line is
    /// a favorite afterwards.
    pub fn toggle(&self, line: &Line) -> Result<bool> {
        let mut favorites = self.load()?;
        let before = favorites.len();
        favorites.retain(|f| &f.id != line.id());

        let added = favorites.len() == before;
        if added {
            favorites.push(Favorite {
                id: line.id().clone(),
                name: line.name().to_owned(),
                address: line.destination().to_owned(),
            });
        }

        set_json(&self.store, StoreKey::Favorites, &favorites)?;
        Ok(added)
    }
}
