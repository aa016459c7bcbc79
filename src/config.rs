use chrono_tz::Tz;
use std::time::Duration;

use crate::transit::Coordinate;

pub const DEFAULT_LOCATION: Coordinate = Coordinate::new(47.649281, -122.358524);
pub const LOCATION_ACCURACY_THRESHOLD_M: f64 = 200.0;

pub const SEARCH_RADIUS_M: u32 = 1000;
pub const MAX_ARRIVALS: usize = 5;
pub const MINUTES_AFTER: u32 = 120;

pub const WEATHER_INTERVAL_MS: u64 = 60_000;
pub const STOPS_INTERVAL_MS: u64 = 30_000;
pub const SERVER_INTERVAL_MS: u64 = 5_000;
pub const IMAGE_INTERVAL_MS: u64 = 60 * 60 * 1000;
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Immutable runtime settings, built once from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub display_name: Option<String>,
    pub timezone: Tz,

    pub oba_domain: String,
    pub oba_key: String,
    pub weather_base_url: String,
    pub weather_key: Option<String>,
    pub unsplash_base_url: String,
    pub unsplash_key: Option<String>,
    pub game_server_url: Option<String>,

    pub search_radius_m: u32,
    pub max_arrivals: usize,
    pub minutes_after: u32,

    pub weather_interval: Duration,
    pub stops_interval: Duration,
    pub server_interval: Duration,
    pub image_interval: Duration,
    pub request_timeout: Duration,

    pub default_location: Coordinate,
    pub accuracy_threshold_m: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            display_name: None,
            timezone: chrono_tz::America::Los_Angeles,
            oba_domain: "https://api.pugetsound.onebusaway.org".to_string(),
            oba_key: "TEST".to_string(),
            weather_base_url: "https://api.openweathermap.org".to_string(),
            weather_key: None,
            unsplash_base_url: "https://api.unsplash.com".to_string(),
            unsplash_key: None,
            game_server_url: None,
            search_radius_m: SEARCH_RADIUS_M,
            max_arrivals: MAX_ARRIVALS,
            minutes_after: MINUTES_AFTER,
            weather_interval: Duration::from_millis(WEATHER_INTERVAL_MS),
            stops_interval: Duration::from_millis(STOPS_INTERVAL_MS),
            server_interval: Duration::from_millis(SERVER_INTERVAL_MS),
            image_interval: Duration::from_millis(IMAGE_INTERVAL_MS),
            request_timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            default_location: DEFAULT_LOCATION,
            accuracy_threshold_m: LOCATION_ACCURACY_THRESHOLD_M,
        }
    }
}
