//! # Policies
//!
//! A policy is a named access-control statement owned by a principal.
//! Persisted policies use these field names verbatim:
//!
//! ```json
//! {
//!   "name": "EditOwnDrafts",
//!   "effect": "Allow",
//!   "actions": ["Invoice:Update", "Invoice:Read"],
//!   "resources": ["*"],
//!   "condition": { "StringEquals": { "status": "draft" } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actions::WILDCARD;
use crate::condition::Condition;
use crate::error::{PolicyError, PolicyResult};

/// Outcome a policy asserts for matching requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Permit the request.
    Allow,
    /// Refuse the request.
    Deny,
}

impl Effect {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }

    /// Check if this is [`Effect::Allow`].
    pub fn is_allow(&self) -> bool {
        matches!(self, Effect::Allow)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative access-control statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Identifier, unique within the owning principal.
    pub name: String,

    /// Allow or Deny.
    pub effect: Effect,

    /// Raw action tokens, in declaration order. Duplicates are allowed.
    pub actions: Vec<String>,

    /// Resource identifiers, or `["*"]` for every resource.
    pub resources: Vec<String>,

    /// Optional attribute condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Policy {
    /// Create a policy that applies to every resource.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_policy::{Effect, Policy};
    ///
    /// let policy = Policy::new("ReadDocs", Effect::Allow, ["Doc:Read"]);
    /// assert_eq!(policy.resources, vec!["*".to_string()]);
    /// assert!(policy.validate().is_ok());
    /// ```
    pub fn new<I, S>(name: impl Into<String>, effect: Effect, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            effect,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: vec![WILDCARD.to_string()],
            condition: None,
        }
    }

    /// Shorthand for an Allow policy.
    pub fn allow<I, S>(name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, Effect::Allow, actions)
    }

    /// Shorthand for a Deny policy.
    pub fn deny<I, S>(name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, Effect::Deny, actions)
    }

    /// Restrict the policy to the given resource identifiers.
    pub fn on_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Attach an attribute condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Check whether the policy applies to every resource.
    pub fn is_unrestricted(&self) -> bool {
        self.resources.iter().any(|r| r == WILDCARD)
    }

    /// Check structural validity.
    ///
    /// Action tokens and resource identifiers are not parsed here; the
    /// compiler drops the individual rules they would produce.
    pub fn validate(&self) -> PolicyResult<()> {
        if self.name.trim().is_empty() {
            return Err(PolicyError::EmptyName);
        }
        if self.actions.is_empty() {
            return Err(PolicyError::EmptyActions(self.name.clone()));
        }
        if self.resources.is_empty() {
            return Err(PolicyError::EmptyResources(self.name.clone()));
        }
        if let Some(condition) = &self.condition {
            condition.validate()?;
        }
        Ok(())
    }
}
