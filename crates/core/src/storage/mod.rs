//! Durable key-value storage for recents, favorites, and the last known
//! user position.
//!
//! Values are JSON documents stored under a handful of fixed keys.

pub mod favorites;
pub mod recents;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{AsRefStr, EnumIter, IntoStaticStr};
use tracing::warn;

use crate::error::Result;

pub use favorites::{Favorite, Favorites};
pub use recents::{RecentSearch, Recents};
pub use sqlite::SqliteStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, EnumIter)]
pub enum StoreKey {
    #[strum(serialize = "helpbus_recents_v1")]
    Recents,
    #[strum(serialize = "helpbus_favs_v1")]
    Favorites,
    #[strum(serialize = "helpbus_userloc_v1")]
    UserLocation,
}

/// Last-write-wins string store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Result<Option<String>>;
    fn set(&self, key: StoreKey, value: &str) -> Result<()>;
    fn remove(&self, key: StoreKey) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        (**self).remove(key)
    }
}

/// Read a JSON value; unreadable documents are logged and treated as absent.
pub fn get_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: StoreKey) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(key = key.as_ref(), error = %err, "discarding corrupt stored value");
            Ok(None)
        }
    }
}

pub fn set_json<T: Serialize + ?Sized>(store: &impl KeyValueStore, key: StoreKey, value: &T) -> Result<()> {
    let payload = serde_json::to_string(value)?;
    store.set(key, &payload)
}

/// In-process store; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<StoreKey, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        Ok(self.values().get(&key).cloned())
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        self.values().insert(key, value.to_owned());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        self.values().remove(&key);
        Ok(())
    }
}
