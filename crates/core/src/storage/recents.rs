//! Most-recent-first list of destination searches.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{KeyValueStore, StoreKey, get_json, set_json};
use crate::error::Result;

/// Shown as the origin when the user searched from their own position
pub const CURRENT_LOCATION_LABEL: &str = "Sua localização";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub origin: String,
    pub destination: String,
    /// Empty when no line was picked yet
    #[serde(rename = "bus_line_id", default)]
    pub line_id: String,
    #[serde(rename = "bus_line_number", default)]
    pub line_number: String,
}

impl RecentSearch {
    /// Entries with the same key replace each other
    pub fn key(&self) -> String {
        format!("{}||{}", self.destination, self.line_number)
    }
}

pub struct Recents<S> {
    store: S,
    capacity: usize,
}

impl<S: KeyValueStore> Recents<S> {
    pub fn new(store: S, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub fn load(&self) -> Result<Vec<RecentSearch>> {
        Ok(get_json(&self.store, StoreKey::Recents)?.unwrap_or_default())
    }

    /// Put `search` first, drop older entries with the same key, and keep
    /// at most `capacity` entries. Searches without a destination are ignored.
    pub fn save(&self, search: RecentSearch) -> Result<Vec<RecentSearch>> {
        if search.destination.trim().is_empty() {
            debug!("not recording search without destination");
            return self.load();
        }

        let updated: Vec<RecentSearch> = std::iter::once(search)
            .chain(self.load()?)
            .unique_by(RecentSearch::key)
            .take(self.capacity)
            .collect();

        set_json(&self.store, StoreKey::Recents, &updated)?;
        Ok(updated)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(StoreKey::Recents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn search(destination: &str, line_number: &str) -> RecentSearch {
        RecentSearch {
            origin: CURRENT_LOCATION_LABEL.into(),
            destination: destination.into(),
            line_id: line_number.into(),
            line_number: line_number.into(),
        }
    }

    #[test]
    fn test_newest_first_and_deduplicated() {
        let recents = Recents::new(MemoryStore::new(), 8);

        recents.save(search("Trindade", "")).unwrap();
        recents.save(search("Costeira", "330")).unwrap();
        recents.save(search("Trindade", "1224")).unwrap();
        let mut replaced = search("Trindade", "");
        replaced.origin = "Centro".into();
        recents.save(replaced).unwrap();

        let keys: Vec<_> = recents.load().unwrap().iter().map(RecentSearch::key).collect();
        assert_eq!(keys, ["Trindade||", "Trindade||1224", "Costeira||330"]);
        assert_eq!(recents.load().unwrap()[0].origin, "Centro");
    }

    #[test]
    fn test_capacity() {
        let recents = Recents::new(MemoryStore::new(), 3);
        for i in 0..5 {
            recents.save(search(&format!("Destino {}", i), "")).unwrap();
        }

        let destinations: Vec<_> = recents.load().unwrap().into_iter().map(|r| r.destination).collect();
        assert_eq!(destinations, ["Destino 4", "Destino 3", "Destino 2"]);
    }

    #[test]
    fn test_blank_destination_ignored() {
        let recents = Recents::new(MemoryStore::new(), 8);
        recents.save(search("  ", "330")).unwrap();
        assert!(recents.load().unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let store = MemoryStore::new();
        let recents = Recents::new(&store, 8);
        recents.save(search("Trindade", "")).unwrap();
        recents.clear().unwrap();

        assert!(recents.load().unwrap().is_empty());
        assert!(store.get(StoreKey::Recents).unwrap().is_none());
    }

    #[test]
    fn test_stored_json_shape() {
        let store = MemoryStore::new();
        Recents::new(&store, 8).save(search("Trindade", "1224")).unwrap();

        let raw = store.get(StoreKey::Recents).unwrap().unwrap();
        assert!(raw.contains(r#""bus_line_number":"1224""#));
    }
}
