//! Line records as they arrive from catalog files and map-page links.
//!
//! Records are loosely shaped: any field may be missing, numbers may be
//! strings or numbers. Defaults are applied here, once, so the rest of the
//! crate only ever sees validated [`Line`]s.

use serde::{Deserialize, Deserializer};

use helpbus_transit::prelude::*;

use crate::error::Result;

const DEMO_LINES_JSON: &str = include_str!("../data/demo_lines.json");

/// Fallback position for a stop without one (TICEN terminal)
pub const DEFAULT_STOP_POSITION: Coordinate = Coordinate::new(-27.5954, -48.5480);

const DEFAULT_NUMBER: &str = "330";
const DEFAULT_NAME: &str = "TICEN - Costeira";
const DEFAULT_ORIGIN: &str = "TICEN";
const DEFAULT_DESTINATION: &str = "Costeira do Pirajubaé";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LineRecord {
    #[serde(default, deserialize_with = "text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub destination: Option<String>,
    #[serde(default)]
    pub stops: Vec<StopRecord>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StopRecord {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<Coordinate>,
    #[serde(default)]
    pub order: Option<u32>,
}

/// Accept a string or a number; blank strings count as missing
fn text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        Some(Text::Str(s)) if !s.trim().is_empty() => Some(s),
        Some(Text::Int(n)) => Some(n.to_string()),
        Some(Text::Float(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl StopRecord {
    /// `next_order` is used when the record has no usable order of its own
    fn into_stop(self, index: usize, next_order: u32) -> Stop {
        let order = self.order.filter(|&o| o > 0).unwrap_or(next_order);
        Stop::new(
            self.name.unwrap_or_else(|| format!("Parada {}", index + 1)),
            self.position.unwrap_or(DEFAULT_STOP_POSITION),
            order,
        )
    }
}

impl LineRecord {
    /// Apply defaults and validate.
    ///
    /// A record without stops gets the TICEN - Costeira route.
    pub fn into_line(self) -> Result<Line> {
        let mut stops: Vec<Stop> = if self.stops.is_empty() {
            default_stops()
        } else {
            // A missing order continues after the highest one seen so far
            let mut highest = 0;
            self.stops
                .into_iter()
                .enumerate()
                .map(|(i, s)| {
                    let stop = s.into_stop(i, highest + 1);
                    highest = highest.max(stop.order);
                    stop
                })
                .collect()
        };
        stops.sort_by_key(|s| s.order);

        let number = self.number.unwrap_or_else(|| DEFAULT_NUMBER.to_owned());
        let id = self.id.unwrap_or_else(|| number.clone());

        let line = Line::new(LineParts {
            id: LineIdentifier::new(id),
            number: LineNumber::new(number),
            name: self.name.as_deref().unwrap_or(DEFAULT_NAME).into(),
            origin: self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN).into(),
            destination: self.destination.as_deref().unwrap_or(DEFAULT_DESTINATION).into(),
            stops,
        })?;

        Ok(line)
    }
}

fn default_stops() -> Vec<Stop> {
    vec![
        Stop::new("TICEN", Coordinate::new(-27.5954, -48.5480), 1),
        Stop::new("Praça XV", Coordinate::new(-27.5969, -48.5495), 2),
        Stop::new("Beiramar Shopping", Coordinate::new(-27.5920, -48.5500), 3),
        Stop::new("CIC", Coordinate::new(-27.5850, -48.5550), 4),
        Stop::new("Costeira do Pirajubaé", Coordinate::new(-27.6100, -48.5650), 5),
    ]
}

/// The line shown when a map page is opened without one
pub fn default_line() -> Result<Line> {
    LineRecord::default().into_line()
}

/// Parse a JSON array of line records.
pub fn parse_catalog(json: &str) -> Result<Vec<Line>> {
    let records: Vec<LineRecord> = serde_json::from_str(json)?;
    records.into_iter().map(LineRecord::into_line).collect()
}

/// Parse a single line record (map-page `line` parameter).
pub fn parse_line(json: &str) -> Result<Line> {
    let record: LineRecord = serde_json::from_str(json)?;
    record.into_line()
}

/// Built-in demo lines (330 TICEN - Costeira, 1224 TICEN - Trindade)
pub fn demo_catalog() -> Result<StaticLineCatalog> {
    Ok(StaticLineCatalog::from_lines(parse_catalog(DEMO_LINES_JSON)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_demo_catalog() {
        let catalog = demo_catalog().unwrap();
        let ids: Vec<_> = catalog.all_lines().iter().map(|l| l.id().to_string()).collect();
        assert_eq!(ids, ["330", "1224"]);

        let trindade = catalog.get_line(&LineIdentifier::new("1224")).unwrap();
        assert_eq!(trindade.last_stop().name.as_ref(), "Trindade");
        assert_eq!(trindade.last_stop().order, 4);
    }

    #[test]
    fn test_default_line() {
        let line = default_line().unwrap();
        assert_eq!(line.number().as_str(), "330");
        assert_eq!(line.id().as_str(), "330");
        assert_eq!(line.name(), "TICEN - Costeira");
        assert_eq!(line.destination(), "Costeira do Pirajubaé");
        assert_eq!(line.stops().len(), 5);
    }

    #[test]
    fn test_stop_defaults() {
        let line = parse_line(
            r#"{"number": 42, "stops": [
                {"position": [-27.60, -48.55]},
                {"name": "", "order": 0},
                {"name": "Centro", "position": [-27.59, -48.54], "order": 7}
            ]}"#,
        )
        .unwrap();

        assert_eq!(line.id().as_str(), "42");
        assert_eq!(line.number().as_str(), "42");

        let stops = line.stops();
        assert_eq!(stops[0].name.as_ref(), "Parada 1");
        assert_eq!(stops[0].order, 1);
        assert_eq!(stops[1].name.as_ref(), "Parada 2");
        assert_eq!(stops[1].order, 2);
        assert_eq!(stops[1].position, DEFAULT_STOP_POSITION);
        assert_eq!(stops[2].order, 7);
    }

    #[test]
    fn test_missing_order_follows_explicit_ones() {
        let line = parse_line(
            r#"{"number": "1224", "stops": [
                {"name": "TICEN", "order": 2},
                {"name": "Praça XV"},
                {"name": "Trindade", "order": 5},
                {"name": "UFSC"}
            ]}"#,
        )
        .unwrap();

        let orders: Vec<_> = line.stops().iter().map(|s| (s.name.as_ref(), s.order)).collect();
        assert_eq!(orders, [("TICEN", 2), ("Praça XV", 3), ("Trindade", 5), ("UFSC", 6)]);
    }

    #[test]
    fn test_out_of_order_stops_are_sorted() {
        let line = parse_line(
            r#"{"id": "x", "stops": [
                {"name": "B", "position": [-27.6, -48.5], "order": 2},
                {"name": "A", "position": [-27.5, -48.5], "order": 1}
            ]}"#,
        )
        .unwrap();

        assert_eq!(line.first_stop().name.as_ref(), "A");
    }

    #[test]
    fn test_invalid_records() {
        let duplicate_orders = r#"{"stops": [
            {"name": "A", "order": 3},
            {"name": "B", "order": 3}
        ]}"#;
        assert!(matches!(parse_line(duplicate_orders), Err(Error::Transit(_))));

        let bad_position = r#"{"stops": [{"name": "A", "position": [120.0, 0.0]}]}"#;
        assert!(matches!(parse_line(bad_position), Err(Error::Transit(_))));

        assert!(matches!(parse_catalog("{"), Err(Error::Serialization(_))));
    }
}
