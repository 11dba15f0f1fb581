//! R-tree nodes for spatial indexing.
//!
//! Wraps line stops with geometric data for efficient spatial queries.
//!
//! ## Two-Stage Filtering
//!
//! The spatial queries use a two-stage filtering approach:
//! 1. **R-tree filter**: Euclidean distance in degrees with a radius widened
//!    for the query latitude, so no qualifying stop is dropped
//! 2. **Haversine filter**: Exact geodesic distance on the filtered results

use rstar::{PointDistance, RTreeObject, AABB};

use crate::models::types::Coordinate;

// ============================================================================
// Stop Spatial Node
// ============================================================================

/// A stop position tagged with where it lives in the catalog.
#[derive(Clone, Debug)]
pub struct StopNode {
    /// Index of the line in catalog order
    pub line_index: usize,
    /// Index of the stop within its line
    pub stop_index: usize,
    point: [f64; 2],
}

impl StopNode {
    pub fn new(position: Coordinate, line_index: usize, stop_index: usize) -> Self {
        Self {
            line_index,
            stop_index,
            point: [position.lon, position.lat],
        }
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.point[1], self.point[0])
    }
}

impl RTreeObject for StopNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StopNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Query point in R-tree axis order
pub fn query_point(position: Coordinate) -> [f64; 2] {
    [position.lon, position.lat]
}
