//! Error types for location coordination.
//!
//! Connection problems are reported to the caller through the connection
//! callbacks. The errors defined here cover host refusals and misuse of a
//! coordinator after it has been disconnected.

use thiserror::Error;

/// Errors reported by a [`LocationHost`](super::LocationHost) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The application lacks the permission needed for this provider.
    #[error("Permission denied for provider {0}")]
    PermissionDenied(String),

    /// The host does not know the requested provider.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The location service is not available on this device.
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur during coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The coordinator was disconnected and released its host handle.
    #[error("Location coordinator is disconnected")]
    Disconnected,

    /// The host refused an operation.
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// A callback panicked while the coordinator state was locked.
    #[error("Coordinator state poisoned: {0}")]
    StatePoisoned(String),
}

/// Result type for coordinator operations.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
