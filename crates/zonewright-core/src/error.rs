//! Error types for zonewright
//!
//! This module defines the error taxonomy used throughout the crate and the
//! classifiers that map provider errors onto reconciliation outcomes.

use thiserror::Error;

/// Route 53 error code for a hosted zone id that does not exist
pub const ERR_CODE_NO_SUCH_HOSTED_ZONE: &str = "NoSuchHostedZone";

/// Provider code for a rejected change batch
pub const ERR_CODE_INVALID_CHANGE_BATCH: &str = "InvalidChangeBatch";

/// Code carried by [`Error::RecordSetNotFound`]
///
/// Route 53 has no point lookup for record sets, so this is never returned by
/// the provider itself; the lookup resolver synthesizes it.
pub const RRSET_NOT_FOUND: &str = "InvalidRRSetName.NotFound";

/// Result type alias for zonewright operations
pub type Result<T> = std::result::Result<T, Error>;

/// The provider write (or read) an [`Error::Operation`] wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Observe,
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Observe => "observe",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Core error type for zonewright
#[derive(Error, Debug)]
pub enum Error {
    /// The record set does not exist in the zone
    #[error("InvalidRRSetName.NotFound: {name} ({record_type}) in zone {zone_id}")]
    RecordSetNotFound {
        name: String,
        record_type: String,
        zone_id: String,
    },

    /// Typed error returned by the provider API
    #[error("provider error {code}: {message}")]
    Api {
        /// Provider error code, e.g. `NoSuchHostedZone`
        code: String,
        /// Human readable message from the provider
        message: String,
    },

    /// The patch between observed and desired state could not be computed
    #[error("cannot compute patch: {0}")]
    Diff(String),

    /// A provider call failed; `operation` names which one
    #[error("cannot {operation} {kind}: {source}")]
    Operation {
        operation: Operation,
        /// Kind of managed resource, e.g. "zone" or "record set"
        kind: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a typed provider API error
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a diff error
    pub fn diff(msg: impl Into<String>) -> Self {
        Self::Diff(msg.into())
    }

    /// Wrap `source` with the operation that produced it
    pub fn operation(operation: Operation, kind: &'static str, source: Error) -> Self {
        Self::Operation {
            operation,
            kind,
            source: Box::new(source),
        }
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// The innermost error, looking through [`Error::Operation`] wrappers
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Operation { source, .. } = err {
            err = source;
        }
        err
    }

    /// Provider error code, if this is a typed provider error
    pub fn code(&self) -> Option<&str> {
        match self.root() {
            Error::Api { code, .. } => Some(code),
            Error::RecordSetNotFound { .. } => Some(RRSET_NOT_FOUND),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Returns true if the error says the requested hosted zone does not exist
///
/// Only the `NoSuchHostedZone` code counts. Look-alikes such as
/// `HostedZoneNotFound` and untyped errors are not classified.
pub fn is_not_found_zone(err: &Error) -> bool {
    matches!(err.root(), Error::Api { code, .. } if code == ERR_CODE_NO_SUCH_HOSTED_ZONE)
}

/// Returns true if the error is the lookup resolver's not-found sentinel
pub fn is_not_found_record_set(err: &Error) -> bool {
    matches!(err.root(), Error::RecordSetNotFound { .. })
}

/// Returns true if a DELETE change was rejected because the record set is gone
///
/// Route 53 reports this as an `InvalidChangeBatch` whose message ends in
/// "but it was not found".
pub fn is_deleted_record_set(err: &Error) -> bool {
    matches!(
        err.root(),
        Error::Api { code, message } if code == ERR_CODE_INVALID_CHANGE_BATCH && message.contains("but it was not found")
    )
}
