use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

use crate::api::render;
use crate::realtime::location::PositionEvent;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Clone)]
struct ApiContext {
    state: Arc<AppState>,
    location_tx: mpsc::Sender<PositionEvent>,
}

pub fn router(state: Arc<AppState>, location_tx: mpsc::Sender<PositionEvent>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/fragments/{panel}", get(fragment))
        .route("/api/state", get(snapshot))
        .route("/api/location", post(report_location))
        .route("/health", get(health_check))
        .with_state(ApiContext { state, location_tx })
}

pub async fn run_server(
    state: Arc<AppState>,
    location_tx: mpsc::Sender<PositionEvent>,
    port: u16,
) -> anyhow::Result<()> {
    let app = router(state, location_tx);

    let addr = format!("0.0.0.0:{}", port);
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn fragment(State(ctx): State<ApiContext>, Path(panel): Path<String>) -> Response {
    let state = &ctx.state;
    let config = &state.config;

    let html = match panel.as_str() {
        "clock" => {
            let now = chrono::Utc::now().with_timezone(&config.timezone);
            render::clock(&now, config.display_name.as_deref())
        }
        "weather" => {
            let weather = state.weather.latest().await;
            render::weather(weather.as_ref().map(|p| p.value.as_ref()))
        }
        "stops" => {
            let transit = state.transit.latest().await;
            render::stops(
                transit.as_ref().map(|p| p.value.as_ref()),
                chrono::Utc::now().timestamp_millis(),
                config.max_arrivals,
            )
        }
        "server" => {
            let server = state.server.latest().await;
            render::server(server.as_ref().map(|p| p.value.as_ref()))
        }
        "footer" => {
            let location = state.location().await;
            let transit = state.transit.latest().await;
            let image = state.image.latest().await;
            render::footer(
                &config.timezone,
                &location,
                transit.as_ref(),
                image.as_ref().map(|p| p.value.as_ref()),
            )
        }
        _ => return (StatusCode::NOT_FOUND, "Unknown panel").into_response(),
    };

    Html(html).into_response()
}

async fn snapshot(State(ctx): State<ApiContext>) -> impl IntoResponse {
    Json(ctx.state.snapshot().await)
}

#[derive(Debug, Serialize)]
struct LocationReply {
    watching: bool,
}

async fn report_location(
    State(ctx): State<ApiContext>,
    Json(event): Json<PositionEvent>,
) -> Response {
    if !event.is_valid() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Invalid position").into_response();
    }
    if !ctx.state.location().await.watching {
        return Json(LocationReply { watching: false }).into_response();
    }

    match ctx.location_tx.try_send(event) {
        Ok(()) => (StatusCode::ACCEPTED, Json(LocationReply { watching: true })).into_response(),
        Err(TrySendError::Closed(_)) => Json(LocationReply { watching: false }).into_response(),
        Err(TrySendError::Full(_)) => {
            warn!("Position event queue full, dropping sample");
            (StatusCode::TOO_MANY_REQUESTS, "Position queue full").into_response()
        }
    }
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
