use futures::future::join_all;
use tracing::{info, warn};

use crate::sources::{Result, TransitSource};
use crate::transit::{ArrivalBoard, Coordinate, rank_stops};

/// One full transit cycle: nearby stops, then every stop's arrivals.
///
/// The per-stop requests run concurrently and the board is only returned
/// once all of them have settled. A stop whose request failed is kept with
/// no arrivals so the others still show up.
pub async fn fetch_arrival_board(
    source: &dyn TransitSource,
    origin: Coordinate,
    max_arrivals: usize,
) -> Result<ArrivalBoard> {
    let stops = source.stops_for_location(origin).await?;
    let ranked = rank_stops(stops, origin)?;

    let results = join_all(ranked.iter().map(|stop| source.arrivals_for_stop(&stop.id))).await;

    let mut board = ArrivalBoard::new();
    for (stop, result) in ranked.into_iter().zip(results) {
        match result {
            Ok(arrivals) => board.push(stop, arrivals, max_arrivals),
            Err(e) => {
                warn!(stop_id = %stop.id, "Arrivals fetch error: {e}");
                board.push_failed(stop);
            }
        }
    }

    info!(
        stops = board.len(),
        failed = board.failed_count(),
        "Rebuilt arrival board"
    );
    Ok(board)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sources::FetchError;
    use crate::transit::{Arrival, EntryStatus, Stop};
    use futures::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory transit source. Stops listed in `failing` answer with an
    /// HTTP error.
    #[derive(Default)]
    pub(crate) struct FakeTransit {
        pub stops: Vec<Stop>,
        pub arrivals: HashMap<String, Vec<Arrival>>,
        pub failing: Vec<String>,
        pub fail_stops: bool,
        pub requested: Mutex<Vec<String>>,
    }

    impl TransitSource for FakeTransit {
        fn stops_for_location<'a>(
            &'a self,
            _origin: Coordinate,
        ) -> BoxFuture<'a, Result<Vec<Stop>>> {
            Box::pin(async move {
                if self.fail_stops {
                    return Err(FetchError::Status {
                        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                        url: "stops-for-location".to_string(),
                    });
                }
                Ok(self.stops.clone())
            })
        }

        fn arrivals_for_stop<'a>(
            &'a self,
            stop_id: &'a str,
        ) -> BoxFuture<'a, Result<Vec<Arrival>>> {
            Box::pin(async move {
                self.requested.lock().unwrap().push(stop_id.to_string());
                if self.failing.iter().any(|id| id == stop_id) {
                    return Err(FetchError::Status {
                        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                        url: format!("arrivals-and-departures-for-stop/{stop_id}"),
                    });
                }
                Ok(self.arrivals.get(stop_id).cloned().unwrap_or_default())
            })
        }
    }

    pub(crate) const ORIGIN: Coordinate = Coordinate::new(47.649281, -122.358524);

    /// A stop `meters` north of [`ORIGIN`].
    pub(crate) fn stop_north(id: &str, meters: f64) -> Stop {
        Stop::new(
            id,
            format!("Stop {id}"),
            ORIGIN.latitude + meters / 111_195.0,
            ORIGIN.longitude,
        )
    }

    pub(crate) fn arrival(route: &str, destination: &str, stop_id: &str) -> Arrival {
        Arrival {
            route: Some(route.to_string()),
            destination: destination.to_string(),
            vehicle_id: format!("1_{route}"),
            stop_id: stop_id.to_string(),
            scheduled_departure_ms: 1_760_600_000_000,
            predicted_departure_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_failed_stop_does_not_block_others() {
        let source = FakeTransit {
            stops: vec![
                stop_north("1", 100.0),
                stop_north("2", 200.0),
                stop_north("3", 300.0),
            ],
            arrivals: HashMap::from([
                ("1".to_string(), vec![arrival("5", "Downtown", "1")]),
                ("2".to_string(), vec![arrival("40", "Fremont", "2")]),
                ("3".to_string(), vec![arrival("44", "Ballard", "3")]),
            ]),
            failing: vec!["2".to_string()],
            ..Default::default()
        };

        let board = fetch_arrival_board(&source, ORIGIN, 5).await.unwrap();

        assert_eq!(source.requested.lock().unwrap().len(), 3);
        assert_eq!(board.len(), 3);
        assert_eq!(board.get("1").unwrap().arrivals.len(), 1);
        assert_eq!(board.get("3").unwrap().arrivals.len(), 1);
        assert_eq!(board.get("2").unwrap().status, EntryStatus::Failed);
        assert!(board.get("2").unwrap().arrivals.is_empty());
    }

    #[tokio::test]
    async fn test_board_is_ranked_and_deduplicated() {
        let source = FakeTransit {
            stops: vec![stop_north("far", 500.0), stop_north("near", 50.0)],
            arrivals: HashMap::from([(
                "near".to_string(),
                vec![
                    arrival("5", "Downtown", "near"),
                    arrival("5", "Downtown", "near"),
                    arrival("44", "Ballard", "near"),
                ],
            )]),
            ..Default::default()
        };

        let board = fetch_arrival_board(&source, ORIGIN, 5).await.unwrap();

        let ids: Vec<&str> = board.entries().iter().map(|e| e.stop.id.as_str()).collect();
        assert_eq!(ids, ["near", "far"]);
        assert_eq!(board.entries()[0].stop.distance, 50);
        assert_eq!(board.entries()[1].stop.distance, 500);

        let routes: Vec<Option<&str>> = board
            .get("near")
            .unwrap()
            .arrivals
            .iter()
            .map(|a| a.route.as_deref())
            .collect();
        assert_eq!(routes, [Some("5"), Some("44")]);
    }

    #[tokio::test]
    async fn test_stop_list_failure_fails_the_cycle() {
        let source = FakeTransit {
            fail_stops: true,
            ..Default::default()
        };

        let result = fetch_arrival_board(&source, ORIGIN, 5).await;
        assert!(matches!(result, Err(FetchError::Status { .. })));
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_stops_nearby() {
        let source = FakeTransit::default();
        let board = fetch_arrival_board(&source, ORIGIN, 5).await.unwrap();
        assert!(board.is_empty());
    }
}
