//! Core data types for bus line data.

use std::fmt;
use std::sync::Arc;

use geo::{Coord, LineString, Point};

use crate::identifiers::*;

// ============================================================================
// Coordinates
// ============================================================================

/// A WGS84 position in decimal degrees.
///
/// Serialized as a `[lat, lon]` pair. Distance functions accept any value;
/// range checks belong at the boundary (see [`Coordinate::try_new`]).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 2]", into = "[f64; 2]"))]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a coordinate, rejecting values outside [-90, 90] x [-180, 180].
    pub fn try_new(lat: f64, lon: f64) -> Result<Self> {
        let coordinate = Self::new(lat, lon);
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(TransitError::InvalidCoordinate { lat, lon })
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self::new(lat, lon)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

// geo uses x = longitude, y = latitude
impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lon, c.lat)
    }
}

impl From<Point> for Coordinate {
    fn from(p: Point) -> Self {
        Self::new(p.y(), p.x())
    }
}

impl From<Coordinate> for Coord {
    fn from(c: Coordinate) -> Self {
        Coord { x: c.lon, y: c.lat }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A named point along a line.
///
/// `order` is the stop's position in the line's sequence, starting at 1.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub name: Arc<str>,
    pub position: Coordinate,
    pub order: u32,
}

impl Stop {
    pub fn new(name: impl Into<Arc<str>>, position: Coordinate, order: u32) -> Self {
        Self {
            name: name.into(),
            position,
            order,
        }
    }
}

/// A bus line: an ordered sequence of stops from origin to destination.
///
/// The stop list is validated on construction and cannot be emptied afterwards,
/// so every `Line` has at least one stop and strictly increasing `order`s.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LineParts", into = "LineParts"))]
pub struct Line {
    id: LineIdentifier,
    number: LineNumber,
    name: Arc<str>,
    origin: Arc<str>,
    destination: Arc<str>,
    stops: Vec<Stop>,
}

/// Unvalidated field set of a [`Line`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineParts {
    pub id: LineIdentifier,
    pub number: LineNumber,
    pub name: Arc<str>,
    pub origin: Arc<str>,
    pub destination: Arc<str>,
    pub stops: Vec<Stop>,
}

impl Line {
    pub fn new(parts: LineParts) -> Result<Self> {
        let LineParts {
            id,
            number,
            name,
            origin,
            destination,
            stops,
        } = parts;

        if stops.is_empty() {
            return Err(TransitError::InvalidData(format!("Line {} has no stops", id)));
        }

        if let Some(stop) = stops.iter().find(|s| s.order == 0) {
            return Err(TransitError::InvalidData(format!(
                "Line {}: stop '{}' has order 0 (orders start at 1)",
                id, stop.name
            )));
        }

        if let Some(pair) = stops.windows(2).find(|w| w[1].order <= w[0].order) {
            return Err(TransitError::InvalidData(format!(
                "Line {}: stop '{}' (order {}) does not follow '{}' (order {})",
                id, pair[1].name, pair[1].order, pair[0].name, pair[0].order
            )));
        }

        if let Some(stop) = stops.iter().find(|s| !s.position.is_valid()) {
            return Err(TransitError::InvalidCoordinate {
                lat: stop.position.lat,
                lon: stop.position.lon,
            });
        }

        Ok(Self {
            id,
            number,
            name,
            origin,
            destination,
            stops,
        })
    }

    pub fn id(&self) -> &LineIdentifier {
        &self.id
    }

    pub fn number(&self) -> &LineNumber {
        &self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Stops in travel order (never empty)
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn first_stop(&self) -> &Stop {
        &self.stops[0]
    }

    pub fn last_stop(&self) -> &Stop {
        &self.stops[self.stops.len() - 1]
    }

    /// Stop positions as a geo path (for drawing the route)
    pub fn path(&self) -> LineString {
        self.stops
            .iter()
            .map(|s| Coord::from(s.position))
            .collect::<Vec<_>>()
            .into()
    }
}

impl TryFrom<LineParts> for Line {
    type Error = TransitError;

    fn try_from(parts: LineParts) -> Result<Self> {
        Line::new(parts)
    }
}

impl From<Line> for LineParts {
    fn from(line: Line) -> Self {
        Self {
            id: line.id,
            number: line.number,
            name: line.name,
            origin: line.origin,
            destination: line.destination,
            stops: line.stops,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Line not found: {0}")]
    LineNotFound(LineIdentifier),

    #[error("Invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;
