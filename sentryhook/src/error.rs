//! Errors surfaced by the hook, its transports and formatters.
//!
//! Only construction reports errors to the application. Errors raised while
//! handling an individual log entry are logged internally and dropped.
use std::sync::PoisonError;
use thiserror::Error;

/// Result of building or configuring a hook.
pub type HookResult<T> = Result<T, HookError>;

/// Result of a transport operation.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors returned when a hook cannot be built.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HookError {
    /// A configuration value is out of range.
    #[error("invalid hook configuration: {0}")]
    InvalidConfig(String),

    /// The transport could not be set up.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors returned by a [`Transport`](crate::transport::Transport).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// The transport has been shut down and no longer accepts events.
    #[error("transport already shut down")]
    AlreadyShutdown,

    /// The event could not be delivered.
    #[error("failed to send event: {0}")]
    SendFailed(String),

    /// The transport's own state is unusable, e.g. a poisoned lock.
    #[error("transport internal failure: {0}")]
    InternalFailure(String),

    /// The event could not be encoded.
    #[error(transparent)]
    Encode(#[from] serde_json::Error),

    /// Writing to the underlying sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<T> From<PoisonError<T>> for TransportError {
    fn from(err: PoisonError<T>) -> Self {
        TransportError::InternalFailure(format!("mutex poisoned: {}", err))
    }
}

/// Errors returned by a [`Formatter`](crate::format::Formatter).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FormatError {
    /// Structured output could not be encoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Writing the formatted text failed.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),

    /// Any other formatter-specific failure.
    #[error("{0}")]
    Other(String),
}
