pub mod render;
pub mod server;
