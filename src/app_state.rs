//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::bus::Publisher;
use crate::handlers::EventJournal;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Publishing handle of the running bus.
    pub publisher: Publisher,
    /// Journal of recently dispatched events.
    pub journal: EventJournal,
    /// Names of the handlers registered at startup.
    pub handlers: Arc<[String]>,
}
