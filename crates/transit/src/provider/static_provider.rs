//! In-memory line catalog.
//!
//! Stores all lines in memory with a stop R-tree for fast proximity queries.

use std::collections::HashMap;
use std::sync::Arc;

use rstar::RTree;

use crate::identifiers::*;
use crate::matching::{match_line, LineStop, MatchResult};
use crate::models::{traits::*, types::*};
use crate::spatial::index::{query_point, StopNode};
use crate::spatial::queries::{haversine_distance, search_radius_degrees};

// ============================================================================
// Static Catalog
// ============================================================================

/// In-memory line catalog with spatial indexing
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone)]
pub struct StaticLineCatalog {
    // Core data, in the order the lines were supplied
    lines: Vec<Arc<Line>>,

    // Lookup map into `lines`
    line_map: HashMap<LineIdentifier, usize>,

    // Spatial index
    stop_tree: Arc<RTree<StopNode>>,
}

impl StaticLineCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            line_map: HashMap::new(),
            stop_tree: Arc::new(RTree::new()),
        }
    }

    /// Build a catalog from parsed lines
    ///
    /// When two lines share an id, lookups return the first one.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let lines: Vec<Arc<Line>> = lines.into_iter().map(Arc::new).collect();

        let mut line_map = HashMap::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            line_map.entry(line.id().clone()).or_insert(i);
        }

        let stop_tree = RTree::bulk_load(
            lines
                .iter()
                .enumerate()
                .flat_map(|(line_index, line)| {
                    line.stops()
                        .iter()
                        .enumerate()
                        .map(move |(stop_index, s)| StopNode::new(s.position, line_index, stop_index))
                })
                .collect(),
        );

        Self {
            lines,
            line_map,
            stop_tree: Arc::new(stop_tree),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    fn line_stop(&self, node: &StopNode, point: Coordinate) -> LineStop<'_> {
        let line = self.lines[node.line_index].as_ref();
        let stop = &line.stops()[node.stop_index];
        LineStop {
            line,
            index: node.stop_index,
            stop,
            distance_m: haversine_distance(point, stop.position),
        }
    }

    /// R-tree candidates that can lie within `radius_m`, plus the exact filter
    fn candidates(&self, point: Coordinate, radius_m: f64) -> impl Iterator<Item = &StopNode> {
        let degrees = search_radius_degrees(radius_m, point.lat);
        self.stop_tree
            .locate_within_distance(query_point(point), degrees * degrees)
            .filter(move |node| haversine_distance(point, node.position()) <= radius_m)
    }
}

impl Default for StaticLineCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Line>> for StaticLineCatalog {
    fn from(lines: Vec<Line>) -> Self {
        Self::from_lines(lines)
    }
}

impl LineCatalog for StaticLineCatalog {
    fn get_line(&self, id: &LineIdentifier) -> Option<Arc<Line>> {
        self.line_map.get(id).map(|&i| self.lines[i].clone())
    }

    fn all_lines(&self) -> &[Arc<Line>] {
        &self.lines
    }

    fn stops_near(&self, point: Coordinate, radius_m: f64) -> Vec<LineStop<'_>> {
        // Validate radius is positive
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Vec::new();
        }

        let mut stops: Vec<LineStop<'_>> = self
            .candidates(point, radius_m)
            .map(|node| self.line_stop(node, point))
            .collect();

        stops.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.line.id().as_str().cmp(b.line.id().as_str()))
                .then_with(|| a.index.cmp(&b.index))
        });
        stops
    }

    fn lines_near(&self, point: Coordinate, radius_m: f64) -> Vec<MatchResult<'_>> {
        // Validate radius is positive
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Vec::new();
        }

        // Only lines with an indexed hit need the full per-line scan
        let mut hit_lines: Vec<usize> = self.candidates(point, radius_m).map(|n| n.line_index).collect();
        hit_lines.sort_unstable();
        hit_lines.dedup();

        tracing::debug!(
            candidates = hit_lines.len(),
            total = self.lines.len(),
            radius_m,
            "spatial prefilter for lines near {}",
            point
        );

        let mut matches: Vec<MatchResult<'_>> = hit_lines
            .into_iter()
            .filter_map(|i| match_line(&self.lines[i], point, radius_m))
            .collect();

        // Stable: catalog order breaks ties
        matches.sort_by(|a, b| a.nearest_distance.total_cmp(&b.nearest_distance));
        matches
    }

    fn nearest_stops(&self, point: Coordinate, n: usize) -> Vec<LineStop<'_>> {
        let mut stops: Vec<LineStop<'_>> = self
            .lines
            .iter()
            .flat_map(|line| {
                line.stops().iter().enumerate().map(move |(index, stop)| LineStop {
                    line: line.as_ref(),
                    index,
                    stop,
                    distance_m: haversine_distance(point, stop.position),
                })
            })
            .collect();

        stops.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        stops.truncate(n);
        stops
    }
}
