//! Error types for authorization checkpoints and policy storage
//!
//! The policy engine itself only answers yes or no. These errors are what
//! the surrounding checkpoint raises from that answer, plus failures of the
//! policy store collaborator.

use platform_policy::PolicyError;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by an authorization checkpoint.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No principal was supplied with the request
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The principal's policies do not permit the operation.
    ///
    /// Carries only the query, never the policy that denied it.
    #[error("Forbidden: cannot {verb} {subject_type}")]
    Forbidden {
        /// Verb that was attempted.
        verb: String,
        /// Subject type it was attempted on.
        subject_type: String,
    },

    /// Policies could not be loaded
    #[error("Internal error: {0}")]
    Internal(#[from] StoreError),
}

/// Result type for authorization checks.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Build a [`AccessError::Forbidden`] for a query.
    pub fn forbidden(verb: impl Into<String>, subject_type: impl Into<String>) -> Self {
        AccessError::Forbidden {
            verb: verb.into(),
            subject_type: subject_type.into(),
        }
    }

    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AccessError::Internal(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Unauthenticated => 401,
            AccessError::Forbidden { .. } => 403,
            AccessError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::Unauthenticated => "UNAUTHENTICATED",
            AccessError::Forbidden { .. } => "FORBIDDEN",
            AccessError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Errors raised by a policy store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Policy does not exist for this principal
    #[error("Policy not found: {0}")]
    NotFound(Uuid),

    /// Another policy of the same principal already uses this name
    #[error("Policy name already in use: {0}")]
    DuplicateName(String),

    /// Policy document failed validation
    #[error("Invalid policy: {0}")]
    InvalidPolicy(#[from] PolicyError),

    /// Principal already holds the maximum number of policies
    #[error("Policy limit of {0} reached")]
    LimitExceeded(usize),

    /// Backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for policy store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 404,
            StoreError::DuplicateName(_) => 409,
            StoreError::InvalidPolicy(_) => 400,
            StoreError::LimitExceeded(_) => 422,
            StoreError::Backend(_) => 500,
        }
    }
}
