use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::sources::{Result, http};
use crate::transit::Coordinate;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl WeatherClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    pub async fn current(&self, position: Coordinate) -> Result<CurrentWeather> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        http::get_json(
            &self.client,
            &url,
            &[
                ("lat", position.latitude.to_string()),
                ("lon", position.longitude.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.key.clone()),
            ],
        )
        .await
    }
}

/// Raw current-conditions payload, metric units.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub name: String,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

/// What the weather panel shows, temperatures rounded to whole °C.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub place: String,
    pub description: String,
    pub icon_url: String,
    pub temperature: i64,
    pub temperature_low: i64,
    pub temperature_high: i64,
}

impl TryFrom<CurrentWeather> for WeatherReport {
    type Error = anyhow::Error;

    fn try_from(current: CurrentWeather) -> anyhow::Result<Self> {
        let condition = current
            .weather
            .into_iter()
            .next()
            .context("weather response has no conditions")?;

        Ok(WeatherReport {
            place: current.name,
            description: condition.description,
            icon_url: format!("https://openweathermap.org/img/wn/{}@4x.png", condition.icon),
            temperature: current.main.temp.round() as i64,
            temperature_low: current.main.temp_min.round() as i64,
            temperature_high: current.main.temp_max.round() as i64,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BODY: &str = r#"{
        "coord": {"lon": -122.3585, "lat": 47.6493},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 11.6, "feels_like": 10.9, "temp_min": 9.4, "temp_max": 13.5,
                 "pressure": 1016, "humidity": 82},
        "name": "Seattle"
    }"#;

    #[test]
    fn test_report_from_current_weather() {
        let current: CurrentWeather = serde_json::from_str(BODY).unwrap();
        let report = WeatherReport::try_from(current).unwrap();

        assert_eq!(report.place, "Seattle");
        assert_eq!(report.description, "light rain");
        assert_eq!(report.icon_url, "https://openweathermap.org/img/wn/10d@4x.png");
        assert_eq!(report.temperature, 12);
        assert_eq!(report.temperature_low, 9);
        assert_eq!(report.temperature_high, 14);
    }

    #[test]
    fn test_missing_conditions_fail_conversion() {
        let current: CurrentWeather = serde_json::from_str(
            r#"{"name": "Seattle", "main": {"temp": 1.0, "temp_min": 0.0, "temp_max": 2.0}}"#,
        )
        .unwrap();
        assert!(WeatherReport::try_from(current).is_err());
    }
}
