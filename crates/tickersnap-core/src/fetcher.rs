//! Batch snapshot fetcher.
//!
//! Iterates a symbol list, queries the injected provider once per symbol,
//! and collects the successes in input order. A failed lookup never aborts
//! the batch: it becomes a per-symbol outcome carrying the structured
//! reason, which is logged and then dropped from the success list.

use std::sync::Arc;

use crate::provider::{ProfileSource, ProviderError};
use crate::{StockSnapshot, Symbol};

/// Outcome of a single symbol lookup within a batch.
#[derive(Debug, Clone)]
pub struct SymbolOutcome {
    pub symbol: Symbol,
    pub result: Result<StockSnapshot, ProviderError>,
}

/// Fetches snapshots for a sequence of symbols from one provider.
///
/// Built once at startup with the provider injected; shared by reference
/// with every request handler.
#[derive(Clone)]
pub struct SnapshotFetcher {
    source: Arc<dyn ProfileSource>,
}

impl SnapshotFetcher {
    pub fn new(source: Arc<dyn ProfileSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<dyn ProfileSource> {
        &self.source
    }

    /// Fetch every symbol sequentially, preserving input order.
    ///
    /// The returned list always has one outcome per input symbol, success
    /// or failure.
    pub async fn fetch_all(&self, symbols: &[Symbol]) -> Vec<SymbolOutcome> {
        let mut outcomes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let result = self
                .source
                .profile(symbol)
                .await
                .map(StockSnapshot::from_profile);
            outcomes.push(SymbolOutcome {
                symbol: symbol.clone(),
                result,
            });
        }
        outcomes
    }

    /// Fetch every symbol and keep the successes, in input order.
    ///
    /// Failed lookups are logged with the symbol and the provider reason,
    /// then omitted from the returned list.
    pub async fn snapshots(&self, symbols: &[Symbol]) -> Vec<StockSnapshot> {
        self.fetch_all(symbols)
            .await
            .into_iter()
            .filter_map(|outcome| match outcome.result {
                Ok(snapshot) => Some(snapshot),
                Err(error) => {
                    log::error!("error fetching {}: {error}", outcome.symbol);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{HealthState, ProviderId};
    use crate::SymbolProfile;
    use std::collections::HashSet;
    use std::future::Future;
    use std::pin::Pin;

    /// Source that fails for a chosen set of symbols and answers the rest
    /// with a minimal profile.
    struct PartialSource {
        failing: HashSet<String>,
    }

    impl PartialSource {
        fn failing(symbols: &[&str]) -> Self {
            Self {
                failing: symbols.iter().map(|s| (*s).to_owned()).collect(),
            }
        }
    }

    impl ProfileSource for PartialSource {
        fn id(&self) -> ProviderId {
            ProviderId::Yahoo
        }

        fn profile<'a>(
            &'a self,
            symbol: &'a Symbol,
        ) -> Pin<Box<dyn Future<Output = Result<SymbolProfile, ProviderError>> + Send + 'a>>
        {
            let outcome = if self.failing.contains(symbol.as_str()) {
                Err(ProviderError::unavailable("upstream timeout"))
            } else {
                Ok(SymbolProfile {
                    symbol: symbol.clone(),
                    short_name: None,
                    current_price: Some(100.0),
                    previous_close: None,
                    sector: None,
                })
            };
            Box::pin(async move { outcome })
        }

        fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthState> + Send + 'a>> {
            Box::pin(async move { HealthState::Healthy })
        }
    }

    fn symbols(raw: &[&str]) -> Vec<Symbol> {
        raw.iter()
            .map(|s| Symbol::parse(s).expect("valid symbol"))
            .collect()
    }

    #[tokio::test]
    async fn keeps_successes_in_input_order() {
        let fetcher = SnapshotFetcher::new(Arc::new(PartialSource::failing(&["MSFT"])));
        let result = fetcher
            .snapshots(&symbols(&["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"]))
            .await;

        let order: Vec<&str> = result.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, ["AAPL", "GOOGL", "AMZN", "TSLA"]);
    }

    #[tokio::test]
    async fn outcome_list_always_covers_every_symbol() {
        let fetcher = SnapshotFetcher::new(Arc::new(PartialSource::failing(&["AMZN", "TSLA"])));
        let outcomes = fetcher
            .fetch_all(&symbols(&["AMZN", "AAPL", "TSLA"]))
            .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.is_ok());
        assert!(outcomes[2].result.is_err());
    }

    #[tokio::test]
    async fn empty_input_yields_empty_batch() {
        let fetcher = SnapshotFetcher::new(Arc::new(PartialSource::failing(&[])));
        assert!(fetcher.snapshots(&[]).await.is_empty());
    }
}
