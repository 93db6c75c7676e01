//! Error types for policy parsing and compilation
//!
//! None of these errors escape the compiler or the evaluator. A failed
//! action token or resource identifier drops exactly one candidate rule
//! and is logged; validation errors surface only where policies are written.

use thiserror::Error;

/// Failure to parse a raw action token such as `"Invoice:Create"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    /// Token is not `*` and does not contain exactly one `:` separator,
    /// or one of its halves is empty.
    #[error("Malformed action `{0}`: expected `*` or `<Subject>:<Verb>`")]
    Malformed(String),

    /// Token spells out a reserved keyword (`all` subject or `manage` verb).
    #[error("Reserved keyword `{keyword}` used in action `{token}`")]
    ReservedKeyword {
        /// The offending token.
        token: String,
        /// The reserved word that was written literally.
        keyword: &'static str,
    },
}

/// Failure to parse a resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid resource identifier `{0}`: expected 24 hex characters or 12 bytes")]
pub struct IdentityParseError(pub String);

/// Structural problems with a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Policy name is empty.
    #[error("Policy name must not be empty")]
    EmptyName,

    /// Policy has no actions.
    #[error("Policy `{0}` must declare at least one action")]
    EmptyActions(String),

    /// Policy has no resources.
    #[error("Policy `{0}` must declare at least one resource")]
    EmptyResources(String),

    /// A condition operand does not have the JSON type its operator expects.
    #[error("Condition `{operator}` on field `{field}` expects a {expected} operand")]
    InvalidConditionOperand {
        /// Operator name, e.g. `NumberGreaterThan`.
        operator: &'static str,
        /// Field the operand is attached to.
        field: String,
        /// Expected JSON type.
        expected: &'static str,
    },
}

/// Result type for policy validation.
pub type PolicyResult<T> = Result<T, PolicyError>;
