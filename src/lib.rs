pub mod config;
pub mod domain;
pub mod errors;
pub mod room;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod utils;
pub mod ws;

pub use config::AppConfig;
pub use errors::{GameError, LobbyError};
pub use state::AppState;
