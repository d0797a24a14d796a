use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::Deserialize;

use crate::circuit_breaker::{BreakerState, CircuitBreaker};
use crate::http_client::{GetRequest, HttpClient, NoopHttpClient};
use crate::provider::{HealthState, ProfileSource, ProviderError, ProviderId};
use crate::{Symbol, SymbolProfile};

const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const QUOTE_SUMMARY_MODULES: &str = "price,summaryDetail,financialData,assetProfile";
const SESSION_URL: &str = "https://fc.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_ENDPOINTS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];

// ============================================================================
// Session auth - cookie/crumb handshake
// ============================================================================

/// Yahoo session state.
///
/// The unofficial API wants a session cookie from fc.yahoo.com (held in the
/// transport's cookie jar) plus a crumb token passed in the query string.
#[derive(Debug)]
pub struct YahooAuthManager {
    crumb: Mutex<Option<String>>,
    last_refresh: Mutex<Option<Instant>>,
    refreshing: AtomicBool,
    crumb_ttl_secs: u64,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: Mutex::new(None),
            last_refresh: Mutex::new(None),
            refreshing: AtomicBool::new(false),
            crumb_ttl_secs: 3600,
        }
    }
}

impl YahooAuthManager {
    fn crumb_valid(&self) -> bool {
        let crumb = self.crumb.lock().expect("crumb lock is not poisoned");
        let last_refresh = self
            .last_refresh
            .lock()
            .expect("refresh lock is not poisoned");

        if crumb.is_none() {
            return false;
        }

        match *last_refresh {
            Some(last) => last.elapsed().as_secs() < self.crumb_ttl_secs,
            None => false,
        }
    }

    /// Current crumb for query parameters, refreshing the session if needed.
    pub async fn crumb(
        &self,
        transport: &Arc<dyn HttpClient>,
    ) -> Result<String, ProviderError> {
        if self.crumb_valid() {
            let cached = self.crumb.lock().expect("crumb lock is not poisoned").clone();
            if let Some(crumb) = cached {
                return Ok(crumb);
            }
        }

        self.refresh(transport).await?;

        let crumb = self.crumb.lock().expect("crumb lock is not poisoned").clone();
        crumb.ok_or_else(|| ProviderError::unavailable("failed to obtain yahoo crumb"))
    }

    /// Invalidate cached auth; the next lookup refreshes the session.
    pub fn invalidate(&self) {
        *self.crumb.lock().expect("crumb lock is not poisoned") = None;
        *self
            .last_refresh
            .lock()
            .expect("refresh lock is not poisoned") = None;
    }

    async fn refresh(&self, transport: &Arc<dyn HttpClient>) -> Result<(), ProviderError> {
        // Another task may already be refreshing; wait briefly and re-check.
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            if self.crumb_valid() {
                return Ok(());
            }
        }

        let result = self.do_refresh(transport).await;
        self.refreshing.store(false, Ordering::SeqCst);
        result
    }

    async fn do_refresh(&self, transport: &Arc<dyn HttpClient>) -> Result<(), ProviderError> {
        // Step 1: visit fc.yahoo.com so the jar picks up session cookies.
        let session_request = GetRequest::new(SESSION_URL).with_header("referer", REFERER);
        let _ = transport.get(session_request).await.map_err(|error| {
            ProviderError::unavailable(format!("failed to fetch yahoo cookie: {error}"))
        })?;

        // Step 2: fetch the crumb token.
        for endpoint in CRUMB_ENDPOINTS {
            let crumb_request = GetRequest::new(endpoint).with_header("referer", REFERER);

            match transport.get(crumb_request).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    let body = response.body.trim();

                    // HTML here means a consent or error page, not a crumb.
                    if body.contains("<html") || body.contains("<!DOCTYPE") {
                        continue;
                    }

                    if body.to_lowercase().contains("too many requests") {
                        return Err(ProviderError::rate_limited(
                            "yahoo rate limited while fetching crumb",
                        ));
                    }

                    if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                        *self.crumb.lock().expect("crumb lock is not poisoned") =
                            Some(body.to_string());
                        *self
                            .last_refresh
                            .lock()
                            .expect("refresh lock is not poisoned") = Some(Instant::now());
                        return Ok(());
                    }
                }
                _ => continue,
            }
        }

        Err(ProviderError::unavailable(
            "failed to fetch yahoo crumb from all endpoints",
        ))
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Yahoo quoteSummary adapter.
///
/// With a real transport it performs the cookie/crumb handshake and fetches
/// the `price`, `summaryDetail`, `financialData`, and `assetProfile` modules
/// for one symbol per call. With a mock transport it serves deterministic
/// seeded profiles so tests stay offline.
pub struct YahooAdapter {
    transport: Arc<dyn HttpClient>,
    auth: Arc<YahooAuthManager>,
    breaker: Arc<CircuitBreaker>,
    timeout_ms: u64,
    live: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            transport: Arc::new(NoopHttpClient),
            auth: Arc::new(YahooAuthManager::default()),
            breaker: Arc::new(CircuitBreaker::default()),
            timeout_ms: 10_000,
            live: false,
        }
    }
}

impl YahooAdapter {
    pub fn with_transport(transport: Arc<dyn HttpClient>) -> Self {
        let live = !transport.is_mock();
        Self {
            transport,
            live,
            ..Self::default()
        }
    }

    pub fn with_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn summary_url(&self, symbol: &Symbol, crumb: &str) -> String {
        format!(
            "{}/{}?modules={}&crumb={}",
            QUOTE_SUMMARY_URL,
            urlencoding::encode(symbol.as_str()),
            QUOTE_SUMMARY_MODULES,
            urlencoding::encode(crumb)
        )
    }

    async fn fetch_live(&self, symbol: &Symbol) -> Result<SymbolProfile, ProviderError> {
        let crumb = self.auth.crumb(&self.transport).await?;
        let body = self.call_upstream(symbol, &crumb).await?;
        parse_summary(symbol, &body)
    }

    /// One upstream GET, with a single session refresh on 401/429.
    async fn call_upstream(
        &self,
        symbol: &Symbol,
        crumb: &str,
    ) -> Result<String, ProviderError> {
        if !self.breaker.try_acquire() {
            return Err(ProviderError::unavailable(
                "yahoo circuit is open; skipping upstream call",
            ));
        }

        let request = GetRequest::new(self.summary_url(symbol, crumb))
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);

        let response = self.transport.get(request).await.map_err(|error| {
            self.breaker.on_failure();
            if error.retryable() {
                ProviderError::unavailable(format!("yahoo transport error: {error}"))
            } else {
                ProviderError::internal(format!("yahoo transport error: {error}"))
            }
        })?;

        let response = if response.status == 401 || response.status == 429 {
            self.auth.invalidate();
            let crumb = self.auth.crumb(&self.transport).await?;

            let retry_request = GetRequest::new(self.summary_url(symbol, &crumb))
                .with_header("referer", REFERER)
                .with_timeout_ms(self.timeout_ms);

            self.transport.get(retry_request).await.map_err(|error| {
                self.breaker.on_failure();
                ProviderError::unavailable(format!(
                    "yahoo transport error after auth refresh: {error}"
                ))
            })?
        } else {
            response
        };

        if !response.is_success() {
            self.breaker.on_failure();
            return Err(ProviderError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        self.breaker.on_success();
        Ok(response.body)
    }

    /// Offline path: drive the breaker and transport exactly like the live
    /// path, then serve a seeded profile.
    async fn fetch_seeded(&self, symbol: &Symbol) -> Result<SymbolProfile, ProviderError> {
        if !self.breaker.try_acquire() {
            return Err(ProviderError::unavailable(
                "yahoo circuit is open; skipping upstream call",
            ));
        }

        let request = GetRequest::new(QUOTE_SUMMARY_URL).with_timeout_ms(self.timeout_ms);
        let response = self.transport.get(request).await.map_err(|error| {
            self.breaker.on_failure();
            ProviderError::unavailable(format!("yahoo transport error: {error}"))
        })?;

        if !response.is_success() {
            self.breaker.on_failure();
            return Err(ProviderError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        self.breaker.on_success();
        Ok(seeded_profile(symbol))
    }
}

impl ProfileSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn profile<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<SymbolProfile, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            if self.live {
                self.fetch_live(symbol).await
            } else {
                self.fetch_seeded(symbol).await
            }
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthState> + Send + 'a>> {
        Box::pin(async move {
            match self.breaker.state() {
                BreakerState::Closed => HealthState::Healthy,
                BreakerState::HalfOpen => HealthState::Degraded,
                BreakerState::Open => HealthState::Unhealthy,
            }
        })
    }
}

// ============================================================================
// Response parsing
// ============================================================================

fn parse_summary(symbol: &Symbol, body: &str) -> Result<SymbolProfile, ProviderError> {
    let parsed: QuoteSummaryResponse = serde_json::from_str(body).map_err(|error| {
        ProviderError::malformed_response(format!("failed to parse yahoo response: {error}"))
    })?;

    if let Some(api_error) = parsed.quote_summary.error {
        let detail = api_error
            .description
            .or(api_error.code)
            .unwrap_or_else(|| String::from("unspecified error"));
        return Err(ProviderError::invalid_symbol(format!(
            "yahoo has no data for '{symbol}': {detail}"
        )));
    }

    let result = parsed
        .quote_summary
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .ok_or_else(|| ProviderError::malformed_response("yahoo response contained no result"))?;

    let short_name = result
        .price
        .as_ref()
        .and_then(|price| price.short_name.clone())
        .filter(|name| !name.trim().is_empty());

    let current_price = result
        .financial_data
        .as_ref()
        .and_then(|data| data.current_price.as_ref().and_then(RawValue::to_option))
        .or_else(|| {
            result
                .price
                .as_ref()
                .and_then(|price| price.regular_market_price.as_ref())
                .and_then(RawValue::to_option)
        });

    let previous_close = result
        .summary_detail
        .as_ref()
        .and_then(|detail| detail.previous_close.as_ref().and_then(RawValue::to_option))
        .or_else(|| {
            result
                .price
                .as_ref()
                .and_then(|price| price.regular_market_previous_close.as_ref())
                .and_then(RawValue::to_option)
        });

    let sector = result
        .asset_profile
        .and_then(|profile| profile.sector)
        .filter(|sector| !sector.trim().is_empty());

    SymbolProfile::new(symbol.clone(), short_name, current_price, previous_close, sector)
        .map_err(|error| ProviderError::malformed_response(error.to_string()))
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<RawValue>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    regular_market_previous_close: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetailModule {
    #[serde(rename = "previousClose", default)]
    previous_close: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "currentPrice", default)]
    current_price: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct AssetProfileModule {
    #[serde(default)]
    sector: Option<String>,
}

/// Yahoo wraps numbers as `{"raw": 123.4, "fmt": "123.40"}`.
#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl RawValue {
    fn to_option(&self) -> Option<f64> {
        self.raw.filter(|value| value.is_finite())
    }
}

// ============================================================================
// Seeded offline data
// ============================================================================

fn seeded_profile(symbol: &Symbol) -> SymbolProfile {
    let seed = symbol_seed(symbol);
    let price = 90.0 + (seed % 600) as f64 / 10.0;
    let (name, sector) = catalog_entry(symbol);

    SymbolProfile {
        symbol: symbol.clone(),
        short_name: name.map(str::to_owned),
        current_price: Some(price),
        previous_close: Some(price - 0.4 - (seed % 30) as f64 / 100.0),
        sector: sector.map(str::to_owned),
    }
}

fn catalog_entry(symbol: &Symbol) -> (Option<&'static str>, Option<&'static str>) {
    match symbol.as_str() {
        "AAPL" => (Some("Apple Inc."), Some("Technology")),
        "GOOGL" => (Some("Alphabet Inc."), Some("Communication Services")),
        "MSFT" => (Some("Microsoft Corporation"), Some("Technology")),
        "AMZN" => (Some("Amazon.com, Inc."), Some("Consumer Cyclical")),
        "TSLA" => (Some("Tesla, Inc."), Some("Consumer Cyclical")),
        _ => (None, None),
    }
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}
