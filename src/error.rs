//! Error types for the audit pipeline.
//!
//! This module provides structured error handling with:
//! - `AppError`: domain-specific errors for pipeline operations
//! - `FetchError`: typed HTTP fetch failures (see `service::http`)
//! - `Result<T>`: type alias for Results using AppError

use thiserror::Error;

pub use crate::service::http::FetchError;

/// Domain-specific errors for pipeline operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or malformed input (URL, options)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP fetch failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Headless renderer failed
    #[error("Render error: {0}")]
    Render(String),

    /// Blob storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Repository operation failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// External provider error (keywords, pagespeed, LLM)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// Run was cancelled
    #[error("Run cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a repository error
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create a provider error
    pub fn provider(provider: &'static str, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: msg.into(),
        }
    }

    /// True for failures that a job dispatcher may sensibly retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Fetch(FetchError::Timeout) | Self::Fetch(FetchError::ConnectFailed(_))
        )
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
