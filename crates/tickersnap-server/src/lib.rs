//! HTTP surface for the tickersnap service.
//!
//! One read-only operation: `GET /top-stocks` returns the snapshot list for
//! the fixed symbol set as a JSON array. `GET /health` is a liveness probe.
//! Every response carries permissive CORS headers.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use routes::{create_router, top_symbols, TOP_SYMBOLS};
pub use state::AppState;
