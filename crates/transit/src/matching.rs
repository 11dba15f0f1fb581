//! Proximity matching of lines against a target position.

use crate::models::types::{Coordinate, Line, Stop};
use crate::spatial::queries::haversine_distance;

/// Radius used when the caller does not pick one
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 900.0;

/// A stop of some line together with its distance to a query point.
#[derive(Clone, Debug, PartialEq)]
pub struct LineStop<'a> {
    pub line: &'a Line,
    /// Position of the stop within `line.stops()`
    pub index: usize,
    pub stop: &'a Stop,
    pub distance_m: f64,
}

/// A line with at least one stop inside the search radius.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult<'a> {
    pub line: &'a Line,
    /// Qualifying stops, in line order
    pub nearest_stops: Vec<LineStop<'a>>,
    /// Minimum distance over `nearest_stops`
    pub nearest_distance: f64,
}

impl<'a> MatchResult<'a> {
    /// The qualifying stop closest to the target (first one on ties).
    ///
    /// `None` only for a hand-built result without stops.
    pub fn closest_stop(&self) -> Option<&LineStop<'a>> {
        self.nearest_stops
            .iter()
            .reduce(|best, candidate| if candidate.distance_m < best.distance_m { candidate } else { best })
    }
}

/// Find lines with a stop within `radius_m` of `target`, closest first.
///
/// Lines whose closest stop is equally far keep their input order. A radius
/// that is not a positive finite number matches nothing.
pub fn find_lines_near<'a, I>(lines: I, target: Coordinate, radius_m: f64) -> Vec<MatchResult<'a>>
where
    I: IntoIterator<Item = &'a Line>,
{
    if !(radius_m > 0.0 && radius_m.is_finite()) {
        return Vec::new();
    }

    let mut matches: Vec<MatchResult<'a>> = lines
        .into_iter()
        .filter_map(|line| match_line(line, target, radius_m))
        .collect();

    // Vec::sort_by is stable
    matches.sort_by(|a, b| a.nearest_distance.total_cmp(&b.nearest_distance));
    matches
}

pub(crate) fn match_line(line: &Line, target: Coordinate, radius_m: f64) -> Option<MatchResult<'_>> {
    let nearest_stops: Vec<LineStop<'_>> = line
        .stops()
        .iter()
        .enumerate()
        .map(|(index, stop)| LineStop {
            line,
            index,
            stop,
            distance_m: haversine_distance(target, stop.position),
        })
        .filter(|s| s.distance_m <= radius_m)
        .collect();

    let nearest_distance = nearest_stops
        .iter()
        .map(|s| s.distance_m)
        .min_by(f64::total_cmp)?;

    Some(MatchResult {
        line,
        nearest_stops,
        nearest_distance,
    })
}
