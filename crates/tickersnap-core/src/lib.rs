//! # Tickersnap Core
//!
//! Domain contracts and provider plumbing for the tickersnap snapshot
//! service.
//!
//! ## Overview
//!
//! This crate provides everything below the HTTP surface:
//!
//! - **Typed domain models** for symbols, provider profiles, and wire
//!   snapshots
//! - **Provider contract** ([`ProfileSource`]) with structured per-symbol
//!   errors
//! - **Yahoo adapter** for the quoteSummary endpoint, including session
//!   handling and an offline mode for tests
//! - **Batch fetcher** that tolerates individual symbol failures
//! - **Circuit breaker** around upstream calls
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo) |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`domain`] | Domain models (Symbol, SymbolProfile, StockSnapshot) |
//! | [`error`] | Validation errors |
//! | [`fetcher`] | Batch snapshot fetcher |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`provider`] | Provider contract and provider errors |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickersnap_core::{
//!     HttpClient, ProfileSource, ReqwestHttpClient, SnapshotFetcher, Symbol, YahooAdapter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
//!     let source: Arc<dyn ProfileSource> = Arc::new(YahooAdapter::with_transport(transport));
//!     let fetcher = SnapshotFetcher::new(source);
//!
//!     let symbols = vec![Symbol::parse("AAPL")?];
//!     for snapshot in fetcher.snapshots(&symbols).await {
//!         println!("{}: {:?}", snapshot.symbol, snapshot.current_price);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Provider failures are structured and symbol-scoped:
//!
//! ```rust
//! use tickersnap_core::{ProviderError, ProviderErrorKind};
//!
//! fn handle_error(error: ProviderError) {
//!     match error.kind() {
//!         ProviderErrorKind::RateLimited => {
//!             // upstream throttling; the symbol is simply omitted
//!         }
//!         ProviderErrorKind::InvalidSymbol => {
//!             // unknown ticker; omitted as well
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod adapters;
pub mod circuit_breaker;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod provider;

// Re-export commonly used types at crate root for convenience

pub use adapters::{YahooAdapter, YahooAuthManager};

pub use circuit_breaker::{BreakerConfig, BreakerState, CircuitBreaker};

pub use domain::{PriceField, StockSnapshot, Symbol, SymbolProfile, NOT_AVAILABLE};

pub use error::ValidationError;

pub use fetcher::{SnapshotFetcher, SymbolOutcome};

pub use http_client::{
    GetRequest, HttpClient, HttpResponse, NoopHttpClient, ReqwestHttpClient, TransportError,
};

pub use provider::{HealthState, ProfileSource, ProviderError, ProviderErrorKind, ProviderId};
