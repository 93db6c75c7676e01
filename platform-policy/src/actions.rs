//! # Actions
//!
//! Parses raw action tokens written by policy authors into a
//! (subject type, verb) pair.
//!
//! ## Grammar
//!
//! ```text
//! "*"                 -> (all, manage)      universal rule
//! "Invoice:Create"    -> (Invoice, Create)
//! "Invoice:*"         -> (Invoice, manage)  any verb on Invoice
//! "*:Create"          -> (all, Create)      Create on any subject
//! ```
//!
//! The words `all` (subject) and `manage` (verb) are reserved. They only
//! ever appear as the result of wildcard expansion; writing them literally
//! is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ActionParseError;

/// The universal wildcard token.
pub const WILDCARD: &str = "*";

/// Reserved subject name produced by a `*` subject.
pub const ALL_SUBJECTS: &str = "all";

/// Reserved verb name produced by a `*` verb.
pub const MANAGE: &str = "manage";

const SEPARATOR: char = ':';

/// Subject type a rule applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    /// Every subject type (written as `*`).
    All,
    /// A specific subject type, e.g. `Invoice`.
    Named(String),
}

impl SubjectType {
    /// Get the string representation (`"all"` for the wildcard).
    pub fn as_str(&self) -> &str {
        match self {
            SubjectType::All => ALL_SUBJECTS,
            SubjectType::Named(name) => name,
        }
    }

    /// Check whether this subject type covers the queried one.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_policy::actions::SubjectType;
    ///
    /// assert!(SubjectType::All.covers("Invoice"));
    /// assert!(SubjectType::Named("Invoice".into()).covers("Invoice"));
    /// assert!(!SubjectType::Named("Invoice".into()).covers("Order"));
    /// ```
    pub fn covers(&self, subject_type: &str) -> bool {
        match self {
            SubjectType::All => true,
            SubjectType::Named(name) => name == subject_type,
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb a rule applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    /// Every verb (written as `*`).
    Manage,
    /// A specific verb, e.g. `Create`.
    Named(String),
}

impl Verb {
    /// Get the string representation (`"manage"` for the wildcard).
    pub fn as_str(&self) -> &str {
        match self {
            Verb::Manage => MANAGE,
            Verb::Named(name) => name,
        }
    }

    /// Check whether this verb covers the queried one.
    ///
    /// `Manage` covers every verb; a named verb covers only itself.
    pub fn covers(&self, verb: &str) -> bool {
        match self {
            Verb::Manage => true,
            Verb::Named(name) => name == verb,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully parsed action token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ParsedAction {
    /// Subject type the action targets.
    pub subject_type: SubjectType,
    /// Verb the action grants or denies.
    pub verb: Verb,
}

impl ParsedAction {
    /// Parse a raw action token.
    ///
    /// # Arguments
    ///
    /// * `token` - The token as written in a policy's `actions` list
    ///
    /// # Returns
    ///
    /// The parsed action, or an [`ActionParseError`] for malformed tokens
    /// and literal use of the reserved `all` / `manage` words.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_policy::actions::{ParsedAction, SubjectType, Verb};
    ///
    /// let action = ParsedAction::parse("Invoice:*").unwrap();
    /// assert_eq!(action.subject_type, SubjectType::Named("Invoice".into()));
    /// assert_eq!(action.verb, Verb::Manage);
    ///
    /// assert!(ParsedAction::parse("Invoice:manage").is_err());
    /// assert!(ParsedAction::parse("InvoiceCreate").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self, ActionParseError> {
        if token == WILDCARD {
            return Ok(Self::universal());
        }

        let mut parts = token.split(SEPARATOR);
        let (raw_subject, raw_verb) = match (parts.next(), parts.next(), parts.next()) {
            (Some(subject), Some(verb), None) => (subject, verb),
            _ => return Err(ActionParseError::Malformed(token.to_string())),
        };

        if raw_subject.is_empty() || raw_verb.is_empty() {
            return Err(ActionParseError::Malformed(token.to_string()));
        }
        if raw_subject == ALL_SUBJECTS {
            return Err(ActionParseError::ReservedKeyword {
                token: token.to_string(),
                keyword: ALL_SUBJECTS,
            });
        }
        if raw_verb == MANAGE {
            return Err(ActionParseError::ReservedKeyword {
                token: token.to_string(),
                keyword: MANAGE,
            });
        }

        let subject_type = if raw_subject == WILDCARD {
            SubjectType::All
        } else {
            SubjectType::Named(raw_subject.to_string())
        };
        let verb = if raw_verb == WILDCARD {
            Verb::Manage
        } else {
            Verb::Named(raw_verb.to_string())
        };

        Ok(Self { subject_type, verb })
    }

    /// The action produced by the `*` token.
    pub fn universal() -> Self {
        Self {
            subject_type: SubjectType::All,
            verb: Verb::Manage,
        }
    }

    /// Check whether this action covers a `(verb, subject_type)` query.
    pub fn covers(&self, verb: &str, subject_type: &str) -> bool {
        self.subject_type.covers(subject_type) && self.verb.covers(verb)
    }
}

impl fmt::Display for ParsedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.subject_type, SEPARATOR, self.verb)
    }
}
