//! Shared application state.
//!
//! Handlers receive this via axum's `State` extractor; there is no global
//! connection singleton. Cloning is cheap (the pool inside `Database` is
//! reference-counted).

use shopkeep_db::Database;

use crate::config::ApiConfig;

/// State injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

impl AppState {
    /// Creates application state from its parts.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState { db, config }
    }
}
