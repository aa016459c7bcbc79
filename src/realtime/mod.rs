pub mod fetcher;
pub mod location;
pub mod poller;

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::realtime::poller::{Cycle, PollHandle, PollTrigger, start_polling};
use crate::sources::weather::CurrentWeather;
use crate::sources::{
    BackgroundImage, FetchError, GameServerClient, OneBusAwayClient, ServerStatus, TransitSource,
    UnsplashClient, WeatherClient, WeatherReport, http,
};
use crate::state::AppState;
use crate::transit::ArrivalBoard;

/// Upstream APIs the dashboard polls. Optional ones are skipped when not
/// configured.
pub struct Sources {
    pub transit: Arc<dyn TransitSource>,
    pub weather: Option<WeatherClient>,
    pub game_server: Option<GameServerClient>,
    pub images: Option<UnsplashClient>,
}

impl Sources {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let client = http::build_client(config.request_timeout)?;

        Ok(Self {
            transit: Arc::new(OneBusAwayClient::new(
                client.clone(),
                &config.oba_domain,
                &config.oba_key,
                config.search_radius_m,
                config.minutes_after,
            )),
            weather: config
                .weather_key
                .as_ref()
                .map(|key| WeatherClient::new(client.clone(), &config.weather_base_url, key)),
            game_server: config
                .game_server_url
                .as_ref()
                .map(|url| GameServerClient::new(client.clone(), url)),
            images: config
                .unsplash_key
                .as_ref()
                .map(|key| UnsplashClient::new(client.clone(), &config.unsplash_base_url, key)),
        })
    }
}

/// The running set of polls. Dropping it stops them all.
pub struct Dashboard {
    pub transit: PollHandle,
    pub weather: Option<PollHandle>,
    pub server: Option<PollHandle>,
    pub image: Option<PollHandle>,
}

impl Dashboard {
    pub fn start(state: Arc<AppState>, sources: Sources) -> Self {
        let config = state.config.clone();

        let transit = start_polling(
            "transit",
            config.stops_interval,
            {
                let state = state.clone();
                let source = sources.transit.clone();
                move || {
                    let state = state.clone();
                    let source = source.clone();
                    async move {
                        let origin = state.origin().await.ok_or(FetchError::NoPosition)?;
                        fetcher::fetch_arrival_board(
                            source.as_ref(),
                            origin,
                            state.config.max_arrivals,
                        )
                        .await
                    }
                }
            },
            {
                let state = state.clone();
                move |cycle: Cycle, board: ArrivalBoard| {
                    let state = state.clone();
                    async move {
                        if !state.transit.publish(cycle.generation, board).await {
                            debug!(generation = cycle.generation, "Dropped stale arrival board");
                        }
                        anyhow::Ok(())
                    }
                }
            },
            None,
        );

        let weather = sources.weather.map(|client| {
            start_polling(
                "weather",
                config.weather_interval,
                {
                    let state = state.clone();
                    move || {
                        let state = state.clone();
                        let client = client.clone();
                        async move {
                            let position = state.origin().await.ok_or(FetchError::NoPosition)?;
                            client.current(position).await
                        }
                    }
                },
                {
                    let state = state.clone();
                    move |cycle: Cycle, current: CurrentWeather| {
                        let state = state.clone();
                        async move {
                            let report = WeatherReport::try_from(current)?;
                            state.weather.publish(cycle.generation, report).await;
                            anyhow::Ok(())
                        }
                    }
                },
                None,
            )
        });

        let server = sources.game_server.map(|client| {
            start_polling(
                "game-server",
                config.server_interval,
                move || {
                    let client = client.clone();
                    async move { client.status().await }
                },
                {
                    let state = state.clone();
                    move |cycle: Cycle, status: ServerStatus| {
                        let state = state.clone();
                        async move {
                            state.server.publish(cycle.generation, status).await;
                            anyhow::Ok(())
                        }
                    }
                },
                None,
            )
        });

        let image = sources.images.map(|client| {
            start_polling(
                "image",
                config.image_interval,
                move || {
                    let client = client.clone();
                    async move { client.random_photo().await }
                },
                {
                    let state = state.clone();
                    move |cycle: Cycle, image: BackgroundImage| {
                        let state = state.clone();
                        async move {
                            state.image.publish(cycle.generation, image).await;
                            anyhow::Ok(())
                        }
                    }
                },
                None,
            )
        });

        info!(
            weather = weather.is_some(),
            game_server = server.is_some(),
            images = image.is_some(),
            "Started polls"
        );

        Self {
            transit,
            weather,
            server,
            image,
        }
    }

    /// Polls that re-run whenever a new position sample arrives.
    pub fn location_triggers(&self) -> Vec<PollTrigger> {
        std::iter::once(&self.transit)
            .chain(self.weather.as_ref())
            .map(PollHandle::trigger_handle)
            .collect()
    }
}
