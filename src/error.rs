//! Unified error types for canopy with fail-open search semantics.
//!
//! A search is never fatal to the process: rejected queries and degraded
//! store lookups produce empty result shapes, not errors. The only hard
//! failure is [`CanopyError::StoreUnavailable`], raised when every lookup
//! of a single search failed, which is distinct from "legitimately no
//! matches."

use thiserror::Error;

/// The main error type for canopy operations.
#[derive(Error, Debug)]
pub enum CanopyError {
    /// A single store lookup failed (callers fail open on these).
    #[error("store error: {message}")]
    Store { message: String },

    /// A store lookup exceeded its deadline (callers fail open on these).
    #[error("store timeout: {message}")]
    Timeout { message: String },

    /// Every store lookup in one search failed: the store is unreachable.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Dataset parsing or serialization errors.
    #[error("dataset error: {message}")]
    Dataset { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for canopy operations.
pub type Result<T> = std::result::Result<T, CanopyError>;

impl CanopyError {
    /// Create a store lookup error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a store timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a dataset error.
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error should trigger fail-open behavior.
    ///
    /// Single-lookup failures and timeouts degrade to empty sub-results.
    /// A fully unreachable store does not: it surfaces as one aggregate
    /// failure for the whole search.
    pub fn is_fail_open(&self) -> bool {
        !matches!(self, Self::StoreUnavailable { .. })
    }
}

impl From<serde_json::Error> for CanopyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Dataset {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Degraded sub-searches log a warning and substitute an empty default
/// rather than propagating a fault to the end user.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}
