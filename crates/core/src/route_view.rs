//! Everything the map page shows for one line.

use std::time::Duration;

use geo::LineString;
use serde::Serialize;

use helpbus_transit::prelude::{Coordinate, Line, Stop, summarize};

use crate::error::Result;
use crate::location::{LocationSource, resolve_user_position};
use crate::request::RouteRequest;

/// Bounds of the circle drawn around the user, in meters
const WALK_RADIUS_MIN_M: f64 = 80.0;
const WALK_RADIUS_MAX_M: f64 = 500.0;
const WALK_RADIUS_MARGIN_M: f64 = 20.0;

/// Fraction of the route where the approaching bus is drawn
const BUS_MARKER_FRACTION: f64 = 0.6;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpcomingStop {
    pub name: String,
    pub order: u32,
    pub position: Coordinate,
    /// Last entry of the list
    pub is_destination: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserMarker {
    pub position: Coordinate,
    pub walk_meters: f64,
    pub walk_minutes: u32,
    /// Radius of the circle drawn around the user
    pub walking_radius_m: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteView {
    pub title: String,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub distance_text: String,
    pub eta_minutes: u32,
    pub time_text: String,
    pub nearest_stop_index: usize,
    pub nearest_stop_text: String,
    pub next_stops: Vec<UpcomingStop>,
    pub user: Option<UserMarker>,
    /// Where the approaching bus is drawn, for lines with more than two stops
    pub bus_marker: Option<Coordinate>,
    pub center: Coordinate,
    #[serde(skip)]
    pub path: LineString,
}

impl RouteView {
    /// Build the view of `line` for a user at `user` (if known).
    pub fn new(line: &Line, user: Option<Coordinate>) -> Self {
        let summary = summarize(line, user);
        let nearest = summary.nearest_stop();

        let user = user.zip(summary.walk).map(|(position, walk)| UserMarker {
            position,
            walk_meters: walk.meters,
            walk_minutes: walk.minutes,
            walking_radius_m: walking_radius(walk.meters),
        });

        let nearest_stop_text = match &user {
            Some(marker) => format!(
                "{} · {} m ({} min camin.)",
                nearest.name,
                marker.walk_meters.round(),
                marker.walk_minutes
            ),
            None => nearest.name.to_string(),
        };

        let count = summary.next_stops.len();
        let next_stops = summary
            .next_stops
            .iter()
            .enumerate()
            .map(|(i, stop)| upcoming(stop, i + 1 == count))
            .collect();

        Self {
            title: format!("Linha {}", line.number()),
            name: line.name().to_owned(),
            origin: line.origin().to_owned(),
            destination: line.destination().to_owned(),
            distance_km: summary.distance_km,
            distance_text: format!("{} km", summary.distance_km.round()),
            eta_minutes: summary.eta_minutes,
            time_text: format!("{} min", summary.eta_minutes),
            nearest_stop_index: summary.nearest_stop_index,
            nearest_stop_text,
            next_stops,
            user,
            bus_marker: bus_marker(line.stops()),
            center: line.first_stop().position,
            path: line.path(),
        }
    }
}

fn upcoming(stop: &Stop, is_destination: bool) -> UpcomingStop {
    UpcomingStop {
        name: stop.name.to_string(),
        order: stop.order,
        position: stop.position,
        is_destination,
    }
}

fn walking_radius(walk_meters: f64) -> f64 {
    (walk_meters + WALK_RADIUS_MARGIN_M).clamp(WALK_RADIUS_MIN_M, WALK_RADIUS_MAX_M)
}

fn bus_marker(stops: &[Stop]) -> Option<Coordinate> {
    if stops.len() <= 2 {
        return None;
    }
    let index = (stops.len() as f64 * BUS_MARKER_FRACTION).floor() as usize;
    stops.get(index).map(|s| s.position)
}

/// Resolve the line and the user position of a map-page request, then build
/// its view. The platform source is only asked when the request carries no
/// user position.
pub async fn plan_route(
    request: &RouteRequest,
    source: &dyn LocationSource,
    timeout: Duration,
) -> Result<RouteView> {
    let line = request.line_or_default()?;
    let user = resolve_user_position(request.user, source, timeout).await;
    Ok(RouteView::new(&line, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_line;
    use crate::location::FixedLocation;

    #[test]
    fn test_view_without_user() {
        let line = default_line().unwrap();
        let view = RouteView::new(&line, None);

        assert_eq!(view.title, "Linha 330");
        assert_eq!(view.nearest_stop_text, "TICEN");
        assert_eq!(view.time_text, format!("{} min", view.eta_minutes));
        assert_eq!(view.distance_text, format!("{} km", view.distance_km.round()));
        assert!(view.user.is_none());

        let names: Vec<_> = view.next_stops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Praça XV", "Beiramar Shopping", "CIC"]);
        assert!(view.next_stops[2].is_destination);
        assert!(!view.next_stops[0].is_destination);

        // floor(5 * 0.6) = 3
        assert_eq!(view.bus_marker, Some(line.stops()[3].position));
        assert_eq!(view.center, line.first_stop().position);
        assert_eq!(view.path.0.len(), 5);
    }

    #[test]
    fn test_view_with_user() {
        let line = default_line().unwrap();
        // ~986 m east of TICEN
        let user = Coordinate::new(-27.5954, -48.5380);
        let view = RouteView::new(&line, Some(user));

        let marker = view.user.as_ref().unwrap();
        assert_eq!(marker.walk_minutes, 12);
        assert_eq!(marker.walking_radius_m, 500.0);
        assert_eq!(view.nearest_stop_text, "TICEN · 985 m (12 min camin.)");
    }

    #[test]
    fn test_walking_radius_bounds() {
        assert_eq!(walking_radius(0.0), 80.0);
        assert_eq!(walking_radius(100.0), 120.0);
        assert_eq!(walking_radius(2_000.0), 500.0);
    }

    #[test]
    fn test_bus_marker_needs_three_stops() {
        let line = default_line().unwrap();
        assert_eq!(bus_marker(&line.stops()[..2]), None);
        assert_eq!(bus_marker(&line.stops()[..3]), Some(line.stops()[1].position));
    }

    #[tokio::test(start_paused = true)]
    async fn test_plan_route_prefers_request_position() {
        let request = RouteRequest {
            user: Some(Coordinate::new(-27.5850, -48.5550)),
            ..RouteRequest::default()
        };
        let elsewhere = FixedLocation(Some(Coordinate::new(-27.5954, -48.5480)));

        let view = plan_route(&request, &elsewhere, Duration::from_secs(6)).await.unwrap();
        assert_eq!(view.nearest_stop_index, 3);
        assert_eq!(view.next_stops.len(), 1);
        assert!(view.next_stops[0].is_destination);
    }

    #[tokio::test(start_paused = true)]
    async fn test_plan_route_uses_source() {
        let source = FixedLocation(Some(Coordinate::new(-27.5969, -48.5495)));
        let view = plan_route(&RouteRequest::default(), &source, Duration::from_secs(6))
            .await
            .unwrap();

        assert_eq!(view.nearest_stop_index, 1);
        assert_eq!(view.nearest_stop_text, "Praça XV · 0 m (0 min camin.)");
    }
}
