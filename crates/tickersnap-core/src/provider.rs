//! Provider adapter contract and structured provider errors.
//!
//! A [`ProfileSource`] answers one question: given a ticker symbol, return
//! the typed metadata record ([`SymbolProfile`]) the upstream service holds
//! for it. Each lookup is independent; a failure is scoped to that single
//! symbol and carries a structured reason the caller can log.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{Symbol, SymbolProfile};

/// Canonical provider identifiers used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse adapter health, reported at startup and by probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Unavailable,
    RateLimited,
    InvalidSymbol,
    MalformedResponse,
    Internal,
}

/// Structured error attached to a single symbol lookup.
///
/// Never surfaces in a response payload; the batch fetcher converts it into
/// omission of the symbol plus a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_symbol(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidSymbol,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::MalformedResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::InvalidSymbol => "provider.invalid_symbol",
            ProviderErrorKind::MalformedResponse => "provider.malformed_response",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync` as they are shared across request
/// handlers behind an `Arc`.
pub trait ProfileSource: Send + Sync {
    /// Returns the unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches the metadata record for one symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the upstream call fails, the symbol is
    /// unknown, or the response cannot be parsed. The error is scoped to
    /// this symbol only.
    fn profile<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<SymbolProfile, ProviderError>> + Send + 'a>>;

    /// Returns the current coarse health of this source.
    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthState> + Send + 'a>>;
}
