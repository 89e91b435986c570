// Application state module
// Shared, read-only after startup except for the connection counter

use std::sync::atomic::AtomicUsize;

use crate::config::Config;
use crate::handler::ServeStatic;

/// State shared by every connection
pub struct AppState {
    pub config: Config,
    pub serve_static: ServeStatic,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, serve_static: ServeStatic) -> Self {
        Self {
            config,
            serve_static,
            active_connections: AtomicUsize::new(0),
        }
    }
}
