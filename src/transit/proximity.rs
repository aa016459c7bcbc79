use crate::transit::{Coordinate, Stop};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, GeoError>;

/// Great-circle distance in whole meters.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<u32> {
    if ![lat1, lon1, lat2, lon2].iter().all(|v| v.is_finite()) {
        return Err(GeoError::InvalidInput(format!(
            "non-finite coordinate in ({lat1}, {lon1}) -> ({lat2}, {lon2})"
        )));
    }

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding error can push `a` a hair over 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    Ok((EARTH_RADIUS_M * c).round() as u32)
}

/// Assigns each stop its distance to `origin` and sorts nearest first.
///
/// Equal distances keep their upstream order, which matters for co-located
/// stop poles. No radius filtering happens here; the stops request is already
/// bounded.
pub fn rank_stops(stops: Vec<Stop>, origin: Coordinate) -> Result<Vec<Stop>> {
    let mut ranked = stops
        .into_iter()
        .map(|mut stop| {
            stop.distance =
                distance_meters(stop.lat, stop.lon, origin.latitude, origin.longitude)?;
            Ok(stop)
        })
        .collect::<Result<Vec<_>>>()?;

    ranked.sort_by_key(|stop| stop.distance);
    Ok(ranked)
}
