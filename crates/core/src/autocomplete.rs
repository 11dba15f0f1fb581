//! Debounced place suggestions for a text field.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::geocode::{Geocoder, Place, search_or_empty};

/// Suggestion lookups for one input field.
///
/// Each call to [`suggest`](Autocomplete::suggest) supersedes the calls still
/// waiting out their delay; only the latest one reaches the geocoder.
pub struct Autocomplete<G> {
    geocoder: Arc<G>,
    delay: Duration,
    limit: usize,
    generation: AtomicU64,
}

impl<G: Geocoder> Autocomplete<G> {
    pub fn new(geocoder: Arc<G>, delay: Duration, limit: usize) -> Self {
        Self {
            geocoder,
            delay,
            limit,
            generation: AtomicU64::new(0),
        }
    }

    /// `None` when a newer keystroke arrived during the delay.
    pub async fn suggest(&self, query: &str) -> Option<Vec<Place>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = query.trim();
        if query.is_empty() {
            return Some(Vec::new());
        }

        tokio::time::sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(query, "suggestion superseded");
            return None;
        }

        let places = search_or_empty(self.geocoder.as_ref(), query, self.limit).await;

        // A newer keystroke during the request also wins
        (self.generation.load(Ordering::SeqCst) == ticket).then_some(places)
    }
}
