//! Route summaries: length, travel time, nearest stop, and upcoming stops.

use crate::models::types::{Coordinate, Line, Stop};
use crate::spatial::queries::{haversine_distance, route_length};

/// Average bus speed used for travel time estimates
pub const BUS_SPEED_KMH: f64 = 25.0;

/// Average walking speed used for walk time estimates
pub const WALK_SPEED_KMH: f64 = 5.0;

/// How many stops after the nearest one are listed
pub const NEXT_STOPS_WINDOW: usize = 3;

/// Walk from the user's position to the nearest stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkEstimate {
    pub meters: f64,
    pub minutes: u32,
}

/// Read-only presentation data for one line.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSummary<'a> {
    pub line: &'a Line,
    pub distance_km: f64,
    pub eta_minutes: u32,
    /// Stop closest to the user, or 0 when the user position is unknown
    pub nearest_stop_index: usize,
    /// Up to [`NEXT_STOPS_WINDOW`] stops after the nearest one
    pub next_stops: &'a [Stop],
    /// Present only when a user position was given
    pub walk: Option<WalkEstimate>,
}

impl<'a> RouteSummary<'a> {
    pub fn nearest_stop(&self) -> &'a Stop {
        &self.line.stops()[self.nearest_stop_index]
    }
}

/// Minutes to cover `km` at `speed_kmh`, rounded half away from zero
pub fn travel_minutes(km: f64, speed_kmh: f64) -> u32 {
    (km / speed_kmh * 60.0).round() as u32
}

/// Index of the stop closest to `point` (first one on ties)
pub fn nearest_stop_index(stops: &[Stop], point: Coordinate) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, stop) in stops.iter().enumerate() {
        let d = haversine_distance(point, stop.position);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Summarize `line` for a user at `user` (if known).
pub fn summarize(line: &Line, user: Option<Coordinate>) -> RouteSummary<'_> {
    let stops = line.stops();

    let positions: Vec<Coordinate> = stops.iter().map(|s| s.position).collect();
    let distance_km = route_length(&positions) / 1000.0;
    let eta_minutes = travel_minutes(distance_km, BUS_SPEED_KMH);

    let nearest_stop_index = user
        .and_then(|point| nearest_stop_index(stops, point))
        .unwrap_or(0);

    let window_start = (nearest_stop_index + 1).min(stops.len());
    let window_end = (window_start + NEXT_STOPS_WINDOW).min(stops.len());
    let next_stops = &stops[window_start..window_end];

    let walk = user.map(|point| {
        let meters = haversine_distance(point, stops[nearest_stop_index].position);
        WalkEstimate {
            meters,
            minutes: travel_minutes(meters / 1000.0, WALK_SPEED_KMH),
        }
    });

    RouteSummary {
        line,
        distance_km,
        eta_minutes,
        nearest_stop_index,
        next_stops,
        walk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::*;
    use crate::models::types::LineParts;
    use approx::assert_relative_eq;

    fn ticen_costeira() -> Line {
        let stops = vec![
            Stop::new("TICEN", Coordinate::new(-27.5954, -48.5480), 1),
            Stop::new("Praça XV", Coordinate::new(-27.5969, -48.5495), 2),
            Stop::new("Beiramar Shopping", Coordinate::new(-27.5920, -48.5500), 3),
            Stop::new("CIC", Coordinate::new(-27.5850, -48.5550), 4),
            Stop::new("Costeira do Pirajubaé", Coordinate::new(-27.6100, -48.5650), 5),
        ];

        Line::new(LineParts {
            id: LineIdentifier::new("330"),
            number: LineNumber::new("330"),
            name: "TICEN - Costeira".into(),
            origin: "TICEN".into(),
            destination: "Costeira do Pirajubaé".into(),
            stops,
        })
        .unwrap()
    }

    #[test]
    fn test_without_user() {
        let line = ticen_costeira();
        let summary = summarize(&line, None);

        assert_eq!(summary.nearest_stop_index, 0);
        assert_eq!(summary.next_stops, &line.stops()[1..4]);
        assert_eq!(summary.nearest_stop().name.as_ref(), "TICEN");
        assert!(summary.walk.is_none());
    }

    #[test]
    fn test_user_on_fourth_stop() {
        let line = ticen_costeira();
        let summary = summarize(&line, Some(line.stops()[3].position));

        assert_eq!(summary.nearest_stop_index, 3);
        assert_eq!(summary.next_stops.len(), 1);
        assert_eq!(summary.next_stops[0].name.as_ref(), "Costeira do Pirajubaé");

        let walk = summary.walk.unwrap();
        assert_eq!(walk.meters, 0.0);
        assert_eq!(walk.minutes, 0);
    }

    #[test]
    fn test_user_at_terminus_has_no_next_stops() {
        let line = ticen_costeira();
        let summary = summarize(&line, Some(Coordinate::new(-27.62, -48.57)));

        assert_eq!(summary.nearest_stop_index, 4);
        assert!(summary.next_stops.is_empty());
    }

    #[test]
    fn test_distance_and_eta() {
        let line = ticen_costeira();
        let summary = summarize(&line, None);

        let expected_km: f64 = line
            .stops()
            .windows(2)
            .map(|w| haversine_distance(w[0].position, w[1].position))
            .sum::<f64>()
            / 1000.0;

        assert_relative_eq!(summary.distance_km, expected_km);
        assert_eq!(summary.eta_minutes, (expected_km / 25.0 * 60.0).round() as u32);
    }

    #[test]
    fn test_walk_estimate() {
        let line = ticen_costeira();
        // ~1 km east of TICEN, every other stop lies further west
        let user = Coordinate::new(-27.5954, -48.5380);

        let walk = summarize(&line, Some(user)).walk.unwrap();
        assert_relative_eq!(walk.meters, haversine_distance(user, line.stops()[0].position));
        assert_relative_eq!(walk.meters, 986.0, max_relative = 0.01);
        assert_eq!(walk.minutes, 12);
    }

    #[test]
    fn test_single_stop_line() {
        let line = Line::new(LineParts {
            id: LineIdentifier::new("x"),
            number: LineNumber::new("x"),
            name: "Loop".into(),
            origin: "TICEN".into(),
            destination: "TICEN".into(),
            stops: vec![Stop::new("TICEN", Coordinate::new(-27.5954, -48.5480), 1)],
        })
        .unwrap();

        let summary = summarize(&line, Some(Coordinate::new(-27.6, -48.6)));
        assert_eq!(summary.distance_km, 0.0);
        assert_eq!(summary.eta_minutes, 0);
        assert_eq!(summary.nearest_stop_index, 0);
        assert!(summary.next_stops.is_empty());
    }

    #[test]
    fn test_nearest_ties_pick_first() {
        let line = ticen_costeira();
        let duplicated: Vec<Stop> = vec![line.stops()[1].clone(), line.stops()[1].clone()];
        assert_eq!(nearest_stop_index(&duplicated, line.stops()[1].position), Some(0));
        assert_eq!(nearest_stop_index(&[], line.stops()[1].position), None);
    }

    #[test]
    fn test_travel_minutes_rounding() {
        // 3.6 and 2.4 minutes
        assert_eq!(travel_minutes(1.5, BUS_SPEED_KMH), 4);
        assert_eq!(travel_minutes(1.0, BUS_SPEED_KMH), 2);
        assert_eq!(travel_minutes(0.0, WALK_SPEED_KMH), 0);
    }

    #[test]
    fn test_idempotent() {
        let line = ticen_costeira();
        let user = Some(Coordinate::new(-27.5930, -48.5499));
        assert_eq!(summarize(&line, user), summarize(&line, user));
    }
}
