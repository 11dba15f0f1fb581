use std::env;
use std::path::PathBuf;
use std::time::Duration;

use helpbus_transit::matching::DEFAULT_SEARCH_RADIUS_M;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Clone)]
pub struct Config {
    /// Max distance (meters) between a destination and a stop of a suggested line
    pub search_radius_m: f64,
    pub geocoder: GeocoderConfig,
    /// How long to wait for the platform to report the user's position
    pub location_timeout: Duration,
    /// Cached user positions older than this are ignored
    pub location_max_age: Duration,
    pub recents_capacity: usize,
    pub origin_debounce: Duration,
    pub destination_debounce: Duration,
    pub database_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub suggestion_limit: usize,
    pub destination_limit: usize,
    pub origin_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            geocoder: GeocoderConfig::default(),
            location_timeout: Duration::from_millis(6_000),
            location_max_age: Duration::from_secs(900),
            recents_capacity: 8,
            origin_debounce: Duration::from_millis(350),
            destination_debounce: Duration::from_millis(300),
            database_path: PathBuf::from("helpbus.sqlite3"),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_owned(),
            user_agent: concat!("helpbus/", env!("CARGO_PKG_VERSION")).to_owned(),
            suggestion_limit: 6,
            destination_limit: 4,
            origin_limit: 3,
        }
    }
}

impl Config {
    /// Defaults overridden by `HELPBUS_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let search_radius_m = env_f64("HELPBUS_SEARCH_RADIUS_M", defaults.search_radius_m);
        let location_timeout = Duration::from_millis(env_u64(
            "HELPBUS_LOCATION_TIMEOUT_MS",
            defaults.location_timeout.as_millis() as u64,
        ));
        let location_max_age = Duration::from_secs(env_u64(
            "HELPBUS_LOCATION_MAX_AGE_S",
            defaults.location_max_age.as_secs(),
        ));
        let recents_capacity =
            env_u64("HELPBUS_RECENTS_CAPACITY", defaults.recents_capacity as u64) as usize;
        let database_path = env::var_os("HELPBUS_DATABASE")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);
        let geocoder = GeocoderConfig::from_env();

        Self {
            search_radius_m,
            geocoder,
            location_timeout,
            location_max_age,
            recents_capacity,
            database_path,
            ..defaults
        }
    }
}

impl GeocoderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("HELPBUS_GEOCODER_URL").unwrap_or(defaults.base_url),
            user_agent: env::var("HELPBUS_USER_AGENT").unwrap_or(defaults.user_agent),
            ..defaults
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|value| value.parse::<u64>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search_radius_m, 900.0);
        assert_eq!(config.recents_capacity, 8);
        assert_eq!(config.location_timeout, Duration::from_secs(6));
        assert_eq!(config.geocoder.destination_limit, 4);
        assert!(config.geocoder.user_agent.starts_with("helpbus/"));
    }

    #[test]
    fn test_env_helpers_fall_back() {
        // Keys nobody sets
        assert_eq!(env_f64("HELPBUS_TEST_UNSET_F64", 1.5), 1.5);
        assert_eq!(env_u64("HELPBUS_TEST_UNSET_U64", 7), 7);
    }
}
