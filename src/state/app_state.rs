//! Shared application state handed to every worker.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::room::RoomDirectory;
use crate::services::OutcomeReporter;

pub struct AppState {
    directory: Arc<RoomDirectory>,
}

impl AppState {
    pub fn new(config: &AppConfig, reporter: Arc<dyn OutcomeReporter>) -> Self {
        Self {
            directory: RoomDirectory::new(reporter, config.turn_timeout),
        }
    }

    pub fn directory(&self) -> Arc<RoomDirectory> {
        Arc::clone(&self.directory)
    }
}
