//! REST routes and handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use tickersnap_core::{StockSnapshot, Symbol};

use crate::state::AppState;

/// Fixed symbol list served by `/top-stocks`.
pub const TOP_SYMBOLS: [&str; 5] = ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"];

/// Parsed form of [`TOP_SYMBOLS`].
pub fn top_symbols() -> Vec<Symbol> {
    TOP_SYMBOLS
        .iter()
        .map(|raw| Symbol::parse(raw).expect("fixed symbol list is valid"))
        .collect()
}

/// Build the service router.
///
/// Every route carries the permissive CORS layer: the request origin,
/// methods, and headers are mirrored back and credentials are allowed.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/top-stocks", get(top_stocks))
        .route("/health", get(health))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn top_stocks(State(state): State<AppState>) -> Json<Vec<StockSnapshot>> {
    Json(state.fetcher().snapshots(&top_symbols()).await)
}

async fn health() -> &'static str {
    "ok"
}
