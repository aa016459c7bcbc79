//! Shared dashboard state. Pollers write, the HTTP renderer reads.
//!
//! Every panel lives in a [`Slot`] that is only ever replaced wholesale by
//! swapping in a new `Arc`, so a reader sees either the previous cycle or the
//! next one, never a mix.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::sources::{BackgroundImage, ServerStatus, WeatherReport};
use crate::transit::{ArrivalBoard, Coordinate};

#[derive(Debug, Serialize)]
pub struct Published<T> {
    /// Cycle number of the poll that produced this value.
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
    pub value: Arc<T>,
}

impl<T> Clone for Published<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            updated_at: self.updated_at,
            value: self.value.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Slot<T> {
    inner: RwLock<Option<Published<T>>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current value unless a later cycle already published.
    /// Returns whether `value` was stored.
    pub async fn publish(&self, generation: u64, value: T) -> bool {
        let next = Published {
            generation,
            updated_at: Utc::now(),
            value: Arc::new(value),
        };

        let mut current = self.inner.write().await;
        if current
            .as_ref()
            .is_some_and(|published| published.generation > generation)
        {
            return false;
        }
        *current = Some(next);
        true
    }

    pub async fn latest(&self) -> Option<Published<T>> {
        self.inner.read().await.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    Device,
    /// Geolocation reported an error; the configured default is in use.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationStatus {
    pub position: Option<Coordinate>,
    pub accuracy_m: Option<f64>,
    pub source: Option<PositionSource>,
    /// False once a fix was accurate enough to stop observing.
    pub watching: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for LocationStatus {
    fn default() -> Self {
        Self {
            position: None,
            accuracy_m: None,
            source: None,
            watching: true,
            updated_at: None,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    location: RwLock<LocationStatus>,
    pub weather: Slot<WeatherReport>,
    pub transit: Slot<ArrivalBoard>,
    pub server: Slot<ServerStatus>,
    pub image: Slot<BackgroundImage>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            location: RwLock::new(LocationStatus::default()),
            weather: Slot::new(),
            transit: Slot::new(),
            server: Slot::new(),
            image: Slot::new(),
        }
    }

    /// Last known position, if any sample or fallback has been recorded.
    pub async fn origin(&self) -> Option<Coordinate> {
        self.location.read().await.position
    }

    pub async fn location(&self) -> LocationStatus {
        self.location.read().await.clone()
    }

    pub async fn record_fix(&self, position: Coordinate, accuracy_m: f64) {
        let mut location = self.location.write().await;
        location.position = Some(position);
        location.accuracy_m = Some(accuracy_m);
        location.source = Some(PositionSource::Device);
        location.updated_at = Some(Utc::now());
    }

    /// Switches to the configured default position, even over an earlier
    /// fix, and returns it.
    pub async fn record_unavailable(&self) -> Coordinate {
        let fallback = self.config.default_location;
        let mut location = self.location.write().await;
        location.position = Some(fallback);
        location.accuracy_m = None;
        location.source = Some(PositionSource::Fallback);
        location.updated_at = Some(Utc::now());
        fallback
    }

    pub async fn stop_watching(&self) {
        self.location.write().await.watching = false;
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            location: self.location().await,
            weather: self.weather.latest().await,
            transit: self.transit.latest().await,
            server: self.server.latest().await,
            image: self.image.latest().await,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub location: LocationStatus,
    pub weather: Option<Published<WeatherReport>>,
    pub transit: Option<Published<ArrivalBoard>>,
    pub server: Option<Published<ServerStatus>>,
    pub image: Option<Published<BackgroundImage>>,
}
