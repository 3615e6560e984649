//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur while fetching market data.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited { provider: String },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout { provider: String },

    /// The provider answered with a non-success status or the request failed.
    #[error("Provider error: {provider} - {message}")]
    ProviderError { provider: String, message: String },

    /// The provider answered 2xx but the body was not the expected shape.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("Client setup failed: {0}")]
    ClientSetup(String),
}

impl MarketDataError {
    /// Whether the next poll is likely to succeed without intervention.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::ProviderError { .. }
        )
    }
}
