//! Error types for the admission service.
//!
//! Validation failures are not errors; they are reported as
//! [`ErrorList`](crate::validation::ErrorList) values. These types cover
//! operational failures: configuration, TLS, serving, and the Kubernetes API.

use thiserror::Error;

/// Error type for service operations
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;
