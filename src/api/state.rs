use std::sync::Arc;

use crate::agents::EventRouter;
use crate::config::HeartbeatConfig;

/// Shared state handed to every axum handler
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EventRouter>,
    pub heartbeat: HeartbeatConfig,
}

impl AppState {
    pub fn new(router: Arc<EventRouter>, heartbeat: HeartbeatConfig) -> Self {
        Self { router, heartbeat }
    }
}
