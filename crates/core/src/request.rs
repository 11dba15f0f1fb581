//! Query-string contract of the map page.
//!
//! `line` carries a JSON line record, `destLat`/`destLng` the searched
//! destination and `userLat`/`userLng` a known user position.

use reqwest::Url;
use tracing::warn;

use helpbus_transit::{Coordinate, Line};

use crate::catalog::{default_line, parse_line};
use crate::error::{Error, Result};

// Base for query encoding/decoding; only the query part is ever used
const PAGE_BASE: &str = "http://helpbus.invalid/map.html";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteRequest {
    pub line: Option<Line>,
    pub destination: Option<Coordinate>,
    pub user: Option<Coordinate>,
}

impl RouteRequest {
    /// Parse a query string (with or without the leading `?`).
    ///
    /// Unusable parameters are dropped rather than rejected.
    pub fn from_query(query: &str) -> Result<Self> {
        let mut url = Url::parse(PAGE_BASE).map_err(|e| Error::InvalidRequest(e.to_string()))?;
        url.set_query(Some(query.trim_start_matches('?')));

        let mut line = None;
        let (mut dest_lat, mut dest_lng) = (None, None);
        let (mut user_lat, mut user_lng) = (None, None);

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "line" => line = decode_line(&value),
                "destLat" => dest_lat = value.trim().parse::<f64>().ok(),
                "destLng" => dest_lng = value.trim().parse::<f64>().ok(),
                "userLat" => user_lat = value.trim().parse::<f64>().ok(),
                "userLng" => user_lng = value.trim().parse::<f64>().ok(),
                _ => {}
            }
        }

        Ok(Self {
            line,
            destination: coordinate(dest_lat, dest_lng),
            user: coordinate(user_lat, user_lng),
        })
    }

    /// Encode as a query string (without the leading `?`).
    pub fn to_query(&self) -> Result<String> {
        let mut url = Url::parse(PAGE_BASE).map_err(|e| Error::InvalidRequest(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(line) = &self.line {
                pairs.append_pair("line", &serde_json::to_string(line)?);
            }
            if let Some(dest) = self.destination {
                pairs.append_pair("destLat", &dest.lat.to_string());
                pairs.append_pair("destLng", &dest.lon.to_string());
            }
            if let Some(user) = self.user {
                pairs.append_pair("userLat", &user.lat.to_string());
                pairs.append_pair("userLng", &user.lon.to_string());
            }
        }
        Ok(url.query().unwrap_or_default().to_owned())
    }

    /// The requested line, or the default TICEN - Costeira line.
    pub fn line_or_default(&self) -> Result<Line> {
        match &self.line {
            Some(line) => Ok(line.clone()),
            None => default_line(),
        }
    }
}

/// The value may have been percent-encoded twice by the sender.
fn decode_line(value: &str) -> Option<Line> {
    let error = match parse_line(value) {
        Ok(line) => return Some(line),
        Err(e) => e,
    };

    let error = match percent_decode(value).filter(|decoded| decoded != value) {
        Some(decoded) => match parse_line(&decoded) {
            Ok(line) => return Some(line),
            Err(e) => e,
        },
        None => error,
    };

    warn!(error = %error, "ignoring unreadable line parameter, showing the default line instead");
    None
}

fn percent_decode(value: &str) -> Option<String> {
    let mut url = Url::parse(PAGE_BASE).ok()?;
    url.set_query(Some(&format!("v={}", value)));
    url.query_pairs().next().map(|(_, v)| v.into_owned())
}

fn coordinate(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinate> {
    let position = Coordinate::try_new(lat?, lon?);
    if let Err(e) = &position {
        warn!(error = %e, "ignoring position parameter");
    }
    position.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::demo_catalog;
    use helpbus_transit::{LineCatalog, LineIdentifier};

    #[test]
    fn test_empty_query() {
        let request = RouteRequest::from_query("").unwrap();
        assert_eq!(request, RouteRequest::default());

        let line = request.line_or_default().unwrap();
        assert_eq!(line.number().as_str(), "330");
        assert_eq!(line.stops().len(), 5);
    }

    #[test]
    fn test_round_trip() {
        let catalog = demo_catalog().unwrap();
        let line = catalog.get_line(&LineIdentifier::new("1224")).unwrap();

        let request = RouteRequest {
            line: Some((*line).clone()),
            destination: Some(Coordinate::new(-27.6050, -48.5150)),
            user: Some(Coordinate::new(-27.5969, -48.5495)),
        };

        let query = request.to_query().unwrap();
        assert!(query.starts_with("line="));
        assert!(query.contains("destLat=-27.605"));

        assert_eq!(RouteRequest::from_query(&format!("?{}", query)).unwrap(), request);
    }

    #[test]
    fn test_legacy_line_parameter() {
        // encodeURIComponent(JSON.stringify(line)), sent without extra encoding
        let query = "line=%7B%22id%22%3A%22330%22%2C%22number%22%3A%22330%22%2C%22stops%22%3A%5B%7B%22name%22%3A%22TICEN%22%2C%22position%22%3A%5B-27.5954%2C-48.548%5D%2C%22order%22%3A1%7D%5D%7D&userLat=-27.5969&userLng=-48.5495";
        let request = RouteRequest::from_query(query).unwrap();

        let line = request.line.unwrap();
        assert_eq!(line.id().as_str(), "330");
        assert_eq!(line.stops()[0].name.as_ref(), "TICEN");
        assert_eq!(request.user, Some(Coordinate::new(-27.5969, -48.5495)));
        assert_eq!(request.destination, None);
    }

    #[test]
    fn test_double_encoded_line() {
        let json = r#"{"number":"1224","stops":[{"name":"TICEN","position":[-27.5954,-48.548],"order":1}]}"#;
        let once = percent_encode(json);
        let twice = percent_encode(&once);

        let request = RouteRequest::from_query(&format!("line={}", twice)).unwrap();
        assert_eq!(request.line.unwrap().number().as_str(), "1224");
    }

    #[test]
    fn test_bad_parameters_are_dropped() {
        let request =
            RouteRequest::from_query("line=%7Bnope&destLat=abc&destLng=-48.5&userLat=-27.6&userLng=999").unwrap();
        assert_eq!(request, RouteRequest::default());

        // Only one half of a coordinate
        let request = RouteRequest::from_query("destLat=-27.6").unwrap();
        assert_eq!(request.destination, None);
    }

    fn percent_encode(value: &str) -> String {
        let mut url = Url::parse(PAGE_BASE).unwrap();
        url.query_pairs_mut().append_pair("v", value);
        url.query().unwrap().trim_start_matches("v=").to_owned()
    }
}
