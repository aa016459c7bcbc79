use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub direction: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Meters from the origin of the ranking pass that produced this stop.
    pub distance: u32,
}

impl Stop {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            direction: None,
            lat,
            lon,
            distance: 0,
        }
    }

    #[cfg(test)]
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// `Name (N) | 1_75403 | 120 m`
    pub fn title(&self) -> String {
        match &self.direction {
            Some(direction) => format!(
                "{} ({}) | {} | {} m",
                self.name, direction, self.id, self.distance
            ),
            None => format!("{} | {} | {} m", self.name, self.id, self.distance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    pub route: Option<String>,
    pub destination: String,
    pub vehicle_id: String,
    pub stop_id: String,
    pub scheduled_departure_ms: i64,
    /// Zero when the agency has no live prediction for this departure.
    pub predicted_departure_ms: i64,
}

impl Arrival {
    pub fn has_prediction(&self) -> bool {
        self.predicted_departure_ms != 0
    }

    pub fn effective_arrival_ms(&self) -> i64 {
        if self.has_prediction() {
            self.predicted_departure_ms
        } else {
            self.scheduled_departure_ms
        }
    }

    /// Positive when running late. `None` means there is no live data, which
    /// is not the same thing as running on time.
    pub fn deviation_ms(&self) -> Option<i64> {
        self.has_prediction()
            .then(|| self.predicted_departure_ms - self.scheduled_departure_ms)
    }

    pub fn key(&self) -> (Option<&str>, &str) {
        (self.route.as_deref(), self.destination.as_str())
    }
}
