use std::sync::Arc;

use crate::source::RowSource;

/// Shared application state.
///
/// The row-source handle is created once at startup and reused for the
/// process lifetime; it is read-only, so no lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn RowSource>,
    pub match_field: String,
    pub fetch_limit: usize,
    pub cors_origins: Vec<String>,
}
