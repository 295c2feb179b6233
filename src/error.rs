//! Three-tier error taxonomy: data link -> repository -> service.
//!
//! Each tier wraps the one below as its `source`, with a contextual message.
//! Only the service tier's `Display` output is shown to end users; the chained
//! causes are for diagnostics.

use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Data-link tier. `Connection` is reserved for connection establishment
/// (pool construction, pragmas); everything that fails during a procedure
/// call is an `Operation` error, so callers never see rusqlite or r2d2 types.
#[derive(Debug, Error)]
pub enum DataLinkError {
    #[error("failed to open database connection: {source}")]
    Connection { source: BoxedCause },

    #[error("error executing procedure '{procedure}': {source}")]
    Operation { procedure: String, source: BoxedCause },

    #[error("unknown procedure '{0}'")]
    UnknownProcedure(String),
}

impl DataLinkError {
    pub fn connection(source: impl Into<BoxedCause>) -> Self {
        Self::Connection {
            source: source.into(),
        }
    }

    pub fn operation(procedure: &str, source: impl Into<BoxedCause>) -> Self {
        Self::Operation {
            procedure: procedure.to_string(),
            source: source.into(),
        }
    }
}

/// Repository tier: an operation-specific human-readable message plus the
/// underlying cause. Validation failures raised inside a repository (e.g.
/// "Friendship already exists.") carry no source and are re-raised verbatim
/// rather than re-wrapped.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RepositoryError {
    message: String,
    #[source]
    source: Option<DataLinkError>,
}

impl RepositoryError {
    /// A repository-level validation failure with no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a data-link failure with an operation-specific message.
    pub fn wrap(message: impl Into<String>, source: DataLinkError) -> Self {
        Self {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Service tier. `Display` is the user-visible failure text.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("An account with the email '{0}' already exists.")]
    EmailAlreadyExists(String),

    #[error("The username '{0}' is already taken.")]
    UsernameAlreadyTaken(String),

    #[error("{0}")]
    Validation(String),

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("No active user session.")]
    NoSession,

    #[error("Failed to process password hash.")]
    PasswordHash(#[source] bcrypt::BcryptError),

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: RepositoryError,
    },
}

impl ServiceError {
    pub fn internal(message: impl Into<String>, source: RepositoryError) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }
}
