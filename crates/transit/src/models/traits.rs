//! Core traits for line data.
//!
//! Callers hand a catalog to the planner explicitly; implementations can be
//! in-memory, database-backed, or remote.

use std::sync::Arc;

use crate::identifiers::*;
use crate::matching::{LineStop, MatchResult};
use crate::models::types::*;

// ============================================================================
// Catalog Trait
// ============================================================================

/// Provider of all bus lines with lookup and query methods
pub trait LineCatalog: Send + Sync {
    // ---- Lookups ----
    fn get_line(&self, id: &LineIdentifier) -> Option<Arc<Line>>;

    // ---- Collections ----
    fn all_lines(&self) -> &[Arc<Line>];

    fn is_empty(&self) -> bool {
        self.all_lines().is_empty()
    }

    // ---- Spatial queries ----

    /// Stops within radius (meters), closest first
    fn stops_near(&self, point: Coordinate, radius_m: f64) -> Vec<LineStop<'_>>;

    /// Lines with a stop within radius (meters), ranked like
    /// [`find_lines_near`](crate::matching::find_lines_near)
    fn lines_near(&self, point: Coordinate, radius_m: f64) -> Vec<MatchResult<'_>>;

    /// The N stops closest to a point, across all lines
    fn nearest_stops(&self, point: Coordinate, n: usize) -> Vec<LineStop<'_>>;
}
