use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::realtime::poller::PollTrigger;
use crate::state::AppState;
use crate::transit::Coordinate;

/// One report from the browser's geolocation watch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PositionEvent {
    Fix {
        latitude: f64,
        longitude: f64,
        accuracy: f64,
    },
    Unavailable {
        code: u16,
        message: String,
    },
}

impl PositionEvent {
    pub fn is_valid(&self) -> bool {
        match self {
            PositionEvent::Fix {
                latitude,
                longitude,
                accuracy,
            } => {
                latitude.is_finite()
                    && longitude.is_finite()
                    && accuracy.is_finite()
                    && (-90.0..=90.0).contains(latitude)
                    && (-180.0..=180.0).contains(longitude)
            }
            PositionEvent::Unavailable { .. } => true,
        }
    }
}

/// Consumes position events until one is accurate enough, re-running the
/// location-driven polls on each. Timers keep running on the last fix after
/// the watch ends.
pub async fn watch_location(
    state: Arc<AppState>,
    mut events: mpsc::Receiver<PositionEvent>,
    dependents: Vec<PollTrigger>,
) {
    let threshold = state.config.accuracy_threshold_m;

    while let Some(event) = events.recv().await {
        if !event.is_valid() {
            warn!("Ignoring invalid position event: {event:?}");
            continue;
        }

        match event {
            PositionEvent::Fix {
                latitude,
                longitude,
                accuracy,
            } => {
                state
                    .record_fix(Coordinate::new(latitude, longitude), accuracy)
                    .await;
                dependents.iter().for_each(PollTrigger::fire);

                if accuracy < threshold {
                    state.stop_watching().await;
                    info!("Location watch stopped. Accuracy: {accuracy} m");
                    break;
                }
                info!(latitude, longitude, accuracy, "Location updated");
            }
            PositionEvent::Unavailable { code, message } => {
                warn!("Geolocation error ({code}): {message}");
                let position = state.record_unavailable().await;
                info!(
                    latitude = position.latitude,
                    longitude = position.longitude,
                    "Using position"
                );
                dependents.iter().for_each(PollTrigger::fire);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::realtime::poller::{Cycle, start_polling};
    use crate::sources::FetchError;
    use crate::state::PositionSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_poll(calls: Arc<AtomicUsize>) -> crate::realtime::poller::PollHandle {
        start_polling(
            "location-test",
            Duration::from_secs(3600),
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), FetchError>(()) }
            },
            |_cycle: Cycle, _: ()| async { anyhow::Ok(()) },
            None,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_samples_trigger_polls_until_accurate() {
        let state = Arc::new(AppState::new(Arc::new(Config::default())));
        let calls = Arc::new(AtomicUsize::new(0));
        let poll = counting_poll(calls.clone());
        let (tx, rx) = mpsc::channel(8);

        let watch = tokio::spawn(watch_location(
            state.clone(),
            rx,
            vec![poll.trigger_handle()],
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tx.send(PositionEvent::Fix {
            latitude: 47.6,
            longitude: -122.3,
            accuracy: 1500.0,
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(state.location().await.watching);

        tx.send(PositionEvent::Fix {
            latitude: 47.65,
            longitude: -122.35,
            accuracy: 25.0,
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        watch.await.unwrap();
        let location = state.location().await;
        assert!(!location.watching);
        assert_eq!(location.position, Some(Coordinate::new(47.65, -122.35)));
        assert_eq!(location.accuracy_m, Some(25.0));

        // The watch no longer listens.
        assert!(
            tx.send(PositionEvent::Fix {
                latitude: 0.0,
                longitude: 0.0,
                accuracy: 1.0,
            })
            .await
            .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_falls_back_to_default() {
        let state = Arc::new(AppState::new(Arc::new(Config::default())));
        let calls = Arc::new(AtomicUsize::new(0));
        let poll = counting_poll(calls.clone());
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(watch_location(
            state.clone(),
            rx,
            vec![poll.trigger_handle()],
        ));
        tokio::time::sleep(Duration::from_secs(1)).await;

        tx.send(PositionEvent::Unavailable {
            code: 1,
            message: "User denied Geolocation".to_string(),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let location = state.location().await;
        assert_eq!(location.position, Some(Config::default().default_location));
        assert_eq!(location.source, Some(PositionSource::Fallback));
        assert!(location.watching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_after_fix_uses_default() {
        let state = Arc::new(AppState::new(Arc::new(Config::default())));
        let calls = Arc::new(AtomicUsize::new(0));
        let poll = counting_poll(calls.clone());
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(watch_location(
            state.clone(),
            rx,
            vec![poll.trigger_handle()],
        ));
        tokio::time::sleep(Duration::from_secs(1)).await;

        tx.send(PositionEvent::Fix {
            latitude: 47.6,
            longitude: -122.3,
            accuracy: 800.0,
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(state.location().await.source, Some(PositionSource::Device));

        tx.send(PositionEvent::Unavailable {
            code: 3,
            message: "Timeout expired".to_string(),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let location = state.location().await;
        assert_eq!(location.position, Some(Config::default().default_location));
        assert_eq!(location.source, Some(PositionSource::Fallback));
    }

    #[test]
    fn test_decode_events() {
        let fix: PositionEvent =
            serde_json::from_str(r#"{"latitude": 47.6, "longitude": -122.3, "accuracy": 12.5}"#)
                .unwrap();
        assert!(matches!(fix, PositionEvent::Fix { accuracy, .. } if accuracy == 12.5));

        let error: PositionEvent =
            serde_json::from_str(r#"{"code": 3, "message": "Timeout expired"}"#).unwrap();
        assert!(matches!(error, PositionEvent::Unavailable { code: 3, .. }));
    }

    #[test]
    fn test_out_of_range_fix_is_invalid() {
        let fix = PositionEvent::Fix {
            latitude: 123.0,
            longitude: 0.0,
            accuracy: 5.0,
        };
        assert!(!fix.is_valid());
    }
}
