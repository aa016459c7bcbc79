mod api;
mod config;
mod format;
mod realtime;
mod sources;
mod state;
mod transit;

use anyhow::{Context, anyhow};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::realtime::location::{PositionEvent, watch_location};
use crate::realtime::{Dashboard, Sources};
use crate::state::AppState;
use crate::transit::Coordinate;

#[derive(Parser)]
#[command(name = "nearby-transit-dashboard")]
#[command(about = "New-tab dashboard with nearby transit arrivals, weather and game-server status")]
struct Args {
    /// Port to run the HTTP server on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    port: u16,

    /// Name used in the greeting
    #[arg(long, env = "DISPLAY_NAME")]
    name: Option<String>,

    /// IANA timezone for the clock and "last updated" labels
    #[arg(long, env = "DASHBOARD_TZ", default_value = "America/Los_Angeles")]
    timezone: String,

    #[arg(long, env = "OBA_DOMAIN", default_value = "https://api.pugetsound.onebusaway.org")]
    oba_domain: String,

    #[arg(long, env = "OBA_KEY", default_value = "TEST")]
    oba_key: String,

    #[arg(long, env = "WEATHER_BASE_URL", default_value = "https://api.openweathermap.org")]
    weather_base_url: String,

    /// OpenWeatherMap API key. Weather is disabled without one.
    #[arg(long, env = "WEATHER_KEY")]
    weather_key: Option<String>,

    #[arg(long, env = "UNSPLASH_BASE_URL", default_value = "https://api.unsplash.com")]
    unsplash_base_url: String,

    /// Unsplash access key. Background images are disabled without one.
    #[arg(long, env = "UNSPLASH_KEY")]
    unsplash_key: Option<String>,

    /// Game-server status endpoint. The server panel is disabled without one.
    #[arg(long, env = "GAME_SERVER_URL")]
    game_server_url: Option<String>,

    /// Stop search radius in meters
    #[arg(long, env = "SEARCH_RADIUS", default_value_t = config::SEARCH_RADIUS_M)]
    radius: u32,

    /// Arrivals shown per stop
    #[arg(long, env = "MAX_ARRIVALS", default_value_t = config::MAX_ARRIVALS)]
    max_arrivals: usize,

    /// How far ahead to ask for arrivals, in minutes
    #[arg(long, env = "MINUTES_AFTER", default_value_t = config::MINUTES_AFTER)]
    minutes_after: u32,

    #[arg(long, env = "WEATHER_INTERVAL_MS", default_value_t = config::WEATHER_INTERVAL_MS)]
    weather_interval_ms: u64,

    #[arg(long, env = "STOPS_INTERVAL_MS", default_value_t = config::STOPS_INTERVAL_MS)]
    stops_interval_ms: u64,

    #[arg(long, env = "SERVER_INTERVAL_MS", default_value_t = config::SERVER_INTERVAL_MS)]
    server_interval_ms: u64,

    #[arg(long, env = "IMAGE_INTERVAL_MS", default_value_t = config::IMAGE_INTERVAL_MS)]
    image_interval_ms: u64,

    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = config::REQUEST_TIMEOUT_MS)]
    request_timeout_ms: u64,

    /// Position used when geolocation is unavailable
    #[arg(long, env = "DEFAULT_LATITUDE", default_value_t = config::DEFAULT_LOCATION.latitude)]
    default_latitude: f64,

    #[arg(long, env = "DEFAULT_LONGITUDE", default_value_t = config::DEFAULT_LOCATION.longitude)]
    default_longitude: f64,

    /// Stop watching the position once a sample is more accurate than this
    #[arg(long, env = "ACCURACY_THRESHOLD", default_value_t = config::LOCATION_ACCURACY_THRESHOLD_M)]
    accuracy_threshold: f64,

    /// Fixed position to start from, skipping the browser's geolocation
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,
}

impl Args {
    fn to_config(&self) -> anyhow::Result<Config> {
        let timezone = self
            .timezone
            .parse()
            .map_err(|_| anyhow!("Unknown timezone: {}", self.timezone))?;

        Ok(Config {
            port: self.port,
            display_name: self.name.clone(),
            timezone,
            oba_domain: self.oba_domain.clone(),
            oba_key: self.oba_key.clone(),
            weather_base_url: self.weather_base_url.clone(),
            weather_key: self.weather_key.clone(),
            unsplash_base_url: self.unsplash_base_url.clone(),
            unsplash_key: self.unsplash_key.clone(),
            game_server_url: self.game_server_url.clone(),
            search_radius_m: self.radius,
            max_arrivals: self.max_arrivals,
            minutes_after: self.minutes_after,
            weather_interval: Duration::from_millis(self.weather_interval_ms),
            stops_interval: Duration::from_millis(self.stops_interval_ms),
            server_interval: Duration::from_millis(self.server_interval_ms),
            image_interval: Duration::from_millis(self.image_interval_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            default_location: Coordinate::new(self.default_latitude, self.default_longitude),
            accuracy_threshold_m: self.accuracy_threshold,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Arc::new(args.to_config()?);

    info!("Starting nearby transit dashboard...");

    let state = Arc::new(AppState::new(config.clone()));
    let sources = Sources::from_config(&config).context("Failed to build HTTP client")?;
    let dashboard = Dashboard::start(state.clone(), sources);

    let (location_tx, location_rx) = mpsc::channel::<PositionEvent>(16);
    if let (Some(latitude), Some(longitude)) = (args.latitude, args.longitude) {
        location_tx
            .send(PositionEvent::Fix {
                latitude,
                longitude,
                accuracy: 0.0,
            })
            .await
            .context("Location watch closed before startup")?;
    }

    let watch_handle = tokio::spawn(watch_location(
        state.clone(),
        location_rx,
        dashboard.location_triggers(),
    ));

    let api_handle = tokio::spawn(api::server::run_server(state, location_tx, config.port));

    tokio::select! {
        result = api_handle => match result {
            Ok(Ok(())) => error!("API server exited"),
            Ok(Err(e)) => error!("API server failed: {e:#}"),
            Err(e) => error!("API server task panicked: {e}"),
        },
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    watch_handle.abort();
    drop(dashboard);
    Ok(())
}
