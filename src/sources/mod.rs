pub mod error;
pub mod game_server;
pub mod http;
pub mod onebusaway;
pub mod unsplash;
pub mod weather;

pub use error::{FetchError, Result};
pub use game_server::{GameServerClient, ServerStatus};
pub use onebusaway::{OneBusAwayClient, TransitSource};
pub use unsplash::{BackgroundImage, UnsplashClient};
pub use weather::{WeatherClient, WeatherReport};
