//! Free-text place search.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use helpbus_transit::Coordinate;

use crate::config::GeocoderConfig;
use crate::error::{Error, Result};

/// Queries shorter than this are not sent to the geocoder
pub const MIN_QUERY_CHARS: usize = 2;

/// A geocoded place with its display name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub position: Coordinate,
}

/// Resolves free text to candidate places, best first.
pub trait Geocoder: Send + Sync {
    fn search<'a>(&'a self, query: &'a str, limit: usize) -> BoxFuture<'a, Result<Vec<Place>>>;
}

/// OpenStreetMap Nominatim search client.
#[derive(Clone, Debug)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: Url,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidRequest(format!("geocoder url '{}': {}", config.base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent).map_err(http_header)?);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, base_url })
    }

    fn search_url(&self, query: &str, limit: usize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string())
            .append_pair("addressdetails", "1");
        url
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<Place>> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let url = self.search_url(query, limit);
        debug!(%url, "geocoding");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, query, "geocoder request failed");
            return Ok(Vec::new());
        }

        let body = response.text().await?;
        parse_nominatim(&body)
    }
}

impl Geocoder for NominatimGeocoder {
    fn search<'a>(&'a self, query: &'a str, limit: usize) -> BoxFuture<'a, Result<Vec<Place>>> {
        self.fetch(query, limit).boxed()
    }
}

fn http_header(e: reqwest::header::InvalidHeaderValue) -> Error {
    Error::InvalidRequest(format!("header value: {}", e))
}

#[derive(Deserialize)]
struct NominatimEntry {
    display_name: String,
    lat: String,
    lon: String,
}

/// Parse a Nominatim JSON result list; entries with unusable coordinates
/// are skipped.
pub fn parse_nominatim(body: &str) -> Result<Vec<Place>> {
    let entries: Vec<NominatimEntry> = serde_json::from_str(body)?;

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let lat = entry.lat.trim().parse::<f64>().ok()?;
            let lon = entry.lon.trim().parse::<f64>().ok()?;
            match Coordinate::try_new(lat, lon) {
                Ok(position) => Some(Place {
                    name: entry.display_name,
                    position,
                }),
                Err(e) => {
                    warn!(name = %entry.display_name, error = %e, "skipping geocoder result");
                    None
                }
            }
        })
        .collect())
}

/// Search, logging and swallowing failures; callers that only render
/// suggestions treat an unreachable geocoder like an empty result.
pub async fn search_or_empty(geocoder: &dyn Geocoder, query: &str, limit: usize) -> Vec<Place> {
    match geocoder.search(query, limit).await {
        Ok(places) => places,
        Err(e) => {
            warn!(query, error = %e, "geocoder unavailable");
            Vec::new()
        }
    }
}
