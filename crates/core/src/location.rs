//! Where the user is.
//!
//! Platform position lookups are slow and can fail; they are folded into a
//! single `Option<Coordinate>` here so route computations stay synchronous.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use helpbus_transit::Coordinate;

use crate::error::Result;
use crate::storage::{KeyValueStore, StoreKey, get_json, set_json};

/// Platform capability reporting the device position.
pub trait LocationSource: Send + Sync {
    /// `None` when the position is unavailable or permission was denied
    fn current_position(&self) -> BoxFuture<'_, Option<Coordinate>>;
}

/// A source that always reports the same answer.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedLocation(pub Option<Coordinate>);

impl LocationSource for FixedLocation {
    fn current_position(&self) -> BoxFuture<'_, Option<Coordinate>> {
        futures_util::future::ready(self.0).boxed()
    }
}

/// Ask `source` for the position, giving up after `timeout`.
pub async fn locate(source: &dyn LocationSource, timeout: Duration) -> Option<Coordinate> {
    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(Some(position)) if position.is_valid() => Some(position),
        Ok(Some(position)) => {
            warn!(%position, "ignoring out-of-range position");
            None
        }
        Ok(None) => {
            debug!("position unavailable");
            None
        }
        Err(_) => {
            debug!(?timeout, "position lookup timed out");
            None
        }
    }
}

/// Explicit position first (e.g. from a link), then the platform source.
pub async fn resolve_user_position(
    explicit: Option<Coordinate>,
    source: &dyn LocationSource,
    timeout: Duration,
) -> Option<Coordinate> {
    match explicit {
        Some(position) => Some(position),
        None => locate(source, timeout).await,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    pub lat: f64,
    #[serde(rename = "lng")]
    pub lon: f64,
    #[serde(rename = "ts", with = "chrono::serde::ts_milliseconds")]
    pub recorded_at: DateTime<Utc>,
}

impl CachedLocation {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

pub fn cache_user_location(store: &impl KeyValueStore, position: Coordinate, now: DateTime<Utc>) -> Result<()> {
    let entry = CachedLocation {
        lat: position.lat,
        lon: position.lon,
        recorded_at: now,
    };
    set_json(store, StoreKey::UserLocation, &entry)
}

/// The cached position, unless it is older than `max_age` at `now`.
pub fn cached_user_location(
    store: &impl KeyValueStore,
    max_age: Duration,
    now: DateTime<Utc>,
) -> Result<Option<Coordinate>> {
    let Some(entry) = get_json::<CachedLocation>(store, StoreKey::UserLocation)? else {
        return Ok(None);
    };

    let age = now.signed_duration_since(entry.recorded_at);
    let fresh = age
        .to_std()
        .map(|age| age <= max_age)
        // Recorded in the future: clock skew, keep it
        .unwrap_or(true);

    if !fresh {
        debug!(%age, "cached position is stale");
        return Ok(None);
    }

    Ok(Some(entry.position()).filter(Coordinate::is_valid))
}
