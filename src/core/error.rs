//! Typed failures at the exchange-rate boundary.
//!
//! None of these reach callers of [`RateProvider::get_rates`]; they exist so
//! the fallback chain can log precisely why live rates were not used.
//!
//! [`RateProvider::get_rates`]: crate::core::currency::RateProvider::get_rates

use crate::core::currency::Currency;
use thiserror::Error;

/// Why a live rate fetch did not produce a usable table.
#[derive(Error, Debug)]
pub enum RateFetchError {
    /// Connection, DNS or body read failure
    #[error("Request error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    Status(u16),

    /// The body was not the expected JSON shape or held unusable quotes
    #[error("Malformed rate response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RateFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RateFetchError::Malformed(err.to_string())
        } else {
            RateFetchError::Network(err.to_string())
        }
    }
}

/// A rate table that violates the "base per unit" invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateTableError {
    #[error("missing rate for {0}")]
    Missing(Currency),

    #[error("rate for {0} must be positive and finite, got {1}")]
    NotPositive(Currency, f64),

    #[error("rate for the base currency must be exactly 1, got {0}")]
    BaseNotOne(f64),
}

/// Cached rate data that could not be read back.
#[derive(Error, Debug)]
pub enum InvalidCacheData {
    #[error("cached rate table is corrupt: {0}")]
    Table(#[from] serde_json::Error),

    #[error("cached rate timestamp is not a number: {0:?}")]
    Timestamp(String),
}
