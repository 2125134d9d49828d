//! # Shopkeep API
//!
//! REST server for the shop-management backend.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Request Flow                                   │
//! │                                                                         │
//! │  HTTP request                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  axum Router ──► extractor (State / Path / Query / Json)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  handler: parse → validate (shopkeep-core) → repos (shopkeep-db)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JSON envelope                                                          │
//! │    ok:    { "success": true,  "data": ..., "message": ... }             │
//! │    error: { "success": false, "error": ... }   (via ApiError)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers hold no connection state of their own; everything they need
//! arrives through [`state::AppState`].

pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;
pub use routes::router;
pub use state::AppState;
