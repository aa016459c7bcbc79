use futures::future::BoxFuture;
use serde::Deserialize;

use crate::sources::{Result, http};
use crate::transit::{Arrival, Coordinate, Stop};

/// Where nearby stops and their upcoming departures come from.
pub trait TransitSource: Send + Sync {
    fn stops_for_location<'a>(&'a self, origin: Coordinate) -> BoxFuture<'a, Result<Vec<Stop>>>;

    fn arrivals_for_stop<'a>(&'a self, stop_id: &'a str) -> BoxFuture<'a, Result<Vec<Arrival>>>;
}

/// Client for the OneBusAway REST API.
#[derive(Debug, Clone)]
pub struct OneBusAwayClient {
    client: reqwest::Client,
    domain: String,
    key: String,
    radius_m: u32,
    minutes_after: u32,
}

impl OneBusAwayClient {
    pub fn new(
        client: reqwest::Client,
        domain: impl Into<String>,
        key: impl Into<String>,
        radius_m: u32,
        minutes_after: u32,
    ) -> Self {
        Self {
            client,
            domain: domain.into().trim_end_matches('/').to_string(),
            key: key.into(),
            radius_m,
            minutes_after,
        }
    }

    async fn fetch_stops(&self, origin: Coordinate) -> Result<Vec<Stop>> {
        let url = format!("{}/api/where/stops-for-location.json", self.domain);
        let response: ListResponse<StopRecord> = http::get_json(
            &self.client,
            &url,
            &[
                ("key", self.key.clone()),
                ("lat", origin.latitude.to_string()),
                ("lon", origin.longitude.to_string()),
                ("radius", self.radius_m.to_string()),
                ("includeReferences", "false".to_string()),
            ],
        )
        .await?;

        Ok(response.data.list.into_iter().map(Stop::from).collect())
    }

    async fn fetch_arrivals(&self, stop_id: &str) -> Result<Vec<Arrival>> {
        let url = format!(
            "{}/api/where/arrivals-and-departures-for-stop/{}.json",
            self.domain,
            urlencoding::encode(stop_id)
        );
        let response: EntryResponse = http::get_json(
            &self.client,
            &url,
            &[
                ("key", self.key.clone()),
                ("minutesBefore", "0".to_string()),
                ("minutesAfter", self.minutes_after.to_string()),
                ("includeReferences", "false".to_string()),
            ],
        )
        .await?;

        Ok(response
            .data
            .entry
            .arrivals_and_departures
            .into_iter()
            .map(Arrival::from)
            .collect())
    }
}

impl TransitSource for OneBusAwayClient {
    fn stops_for_location<'a>(&'a self, origin: Coordinate) -> BoxFuture<'a, Result<Vec<Stop>>> {
        Box::pin(self.fetch_stops(origin))
    }

    fn arrivals_for_stop<'a>(&'a self, stop_id: &'a str) -> BoxFuture<'a, Result<Vec<Arrival>>> {
        Box::pin(self.fetch_arrivals(stop_id))
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: ListData<T>,
}

#[derive(Debug, Deserialize)]
struct ListData<T> {
    list: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StopRecord {
    id: String,
    name: String,
    #[serde(default)]
    direction: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<StopRecord> for Stop {
    fn from(record: StopRecord) -> Self {
        Stop {
            id: record.id,
            name: record.name,
            direction: record.direction.filter(|d| !d.is_empty()),
            lat: record.lat,
            lon: record.lon,
            distance: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntryResponse {
    data: EntryData,
}

#[derive(Debug, Deserialize)]
struct EntryData {
    entry: ArrivalsEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalsEntry {
    arrivals_and_departures: Vec<ArrivalRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalRecord {
    #[serde(default)]
    route_short_name: Option<String>,
    trip_headsign: String,
    #[serde(default)]
    vehicle_id: String,
    stop_id: String,
    scheduled_departure_time: i64,
    #[serde(default)]
    predicted_departure_time: i64,
}

impl From<ArrivalRecord> for Arrival {
    fn from(record: ArrivalRecord) -> Self {
        Arrival {
            route: record.route_short_name.filter(|r| !r.is_empty()),
            destination: record.trip_headsign,
            vehicle_id: record.vehicle_id,
            stop_id: record.stop_id,
            scheduled_departure_ms: record.scheduled_departure_time,
            predicted_departure_ms: record.predicted_departure_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_stops_for_location() {
        let body = r#"{
            "code": 200,
            "data": {
                "limitExceeded": false,
                "list": [
                    {"id": "1_75403", "name": "NW Market St & 15th Ave NW", "direction": "E",
                     "lat": 47.668, "lon": -122.376, "code": "75403", "routeIds": ["1_100447"]},
                    {"id": "1_75404", "name": "15th Ave NW & NW Market St", "direction": "",
                     "lat": 47.669, "lon": -122.377}
                ]
            }
        }"#;

        let response: ListResponse<StopRecord> = serde_json::from_str(body).unwrap();
        let stops: Vec<Stop> = response.data.list.into_iter().map(Stop::from).collect();

        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].id, "1_75403");
        assert_eq!(stops[0].direction.as_deref(), Some("E"));
        assert_eq!(stops[1].direction, None);
        assert_eq!(stops[1].distance, 0);
    }

    #[test]
    fn test_decode_arrivals_for_stop() {
        let body = r#"{
            "data": {
                "entry": {
                    "stopId": "1_75403",
                    "arrivalsAndDepartures": [
                        {"routeShortName": "44", "tripHeadsign": "Ballard", "vehicleId": "1_4301",
                         "stopId": "1_75403", "scheduledDepartureTime": 1760600000000,
                         "predictedDepartureTime": 1760600060000},
                        {"routeShortName": "", "tripHeadsign": "Downtown", "vehicleId": "",
                         "stopId": "1_75403", "scheduledDepartureTime": 1760600300000,
                         "predictedDepartureTime": 0}
                    ]
                }
            }
        }"#;

        let response: EntryResponse = serde_json::from_str(body).unwrap();
        let arrivals: Vec<Arrival> = response
            .data
            .entry
            .arrivals_and_departures
            .into_iter()
            .map(Arrival::from)
            .collect();

        assert_eq!(arrivals.len(), 2);
        assert_eq!(arrivals[0].route.as_deref(), Some("44"));
        assert_eq!(arrivals[0].deviation_ms(), Some(60_000));
        assert_eq!(arrivals[1].route, None);
        assert_eq!(arrivals[1].deviation_ms(), None);
    }

    #[test]
    fn test_unexpected_shape_is_a_decode_error() {
        let body = r#"{"data": {"entry": {}}}"#;
        assert!(serde_json::from_str::<EntryResponse>(body).is_err());
    }

    #[test]
    fn test_domain_trailing_slash_is_trimmed() {
        let client = OneBusAwayClient::new(
            reqwest::Client::new(),
            "http://api.pugetsound.onebusaway.org/",
            "TEST",
            1000,
            120,
        );
        assert_eq!(client.domain, "http://api.pugetsound.onebusaway.org");
    }
}
