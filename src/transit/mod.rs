pub mod arrivals;
pub mod proximity;
pub mod types;

pub use arrivals::{ArrivalBoard, EntryStatus};
pub use proximity::{GeoError, rank_stops};
pub use types::{Arrival, Coordinate, Stop};
