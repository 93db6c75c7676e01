//! # Platform Policy (Attribute-Based Access Control)
//!
//! This crate provides the policy language and evaluator used to authorize
//! actions against Relay platform resources.
//!
//! ## Overview
//!
//! The platform-policy crate handles:
//! - **Actions**: Parsing `"<Subject>:<Verb>"` tokens with `*` wildcards
//! - **Conditions**: Typed attribute predicates (`StringEquals`, `NumberLessThan`, ...)
//! - **Compilation**: Expanding policies into one rule per action
//! - **Evaluation**: Last-declared-match-wins decisions with default deny
//!
//! ## Architecture
//!
//! ```text
//! Policy[] ──compile──> Rule[] ──> Ability::can(verb, subject_type, resource) ──> bool
//!
//! Policy   = name + effect + actions + resources + condition?
//! Rule     = effect + subject_type + verb + resource constraint + condition?
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use platform_policy::{Ability, Policy};
//! use platform_policy::condition::{Condition, ConditionOperator};
//! use platform_policy::resource::FieldMap;
//!
//! let ability = Ability::from_policies(&[
//!     Policy::allow("ManageInvoices", ["Invoice:*"]),
//!     Policy::deny("NoPaidEdits", ["Invoice:Update"])
//!         .with_condition(Condition::new().with(ConditionOperator::StringEquals, "status", "paid")),
//! ]);
//!
//! let draft = FieldMap::new().with_id("65a1b2c3d4e5f60718293a4b").with("status", "draft");
//! let paid = FieldMap::new().with_id("65a1b2c3d4e5f60718293a4c").with("status", "paid");
//!
//! assert!(ability.can("Update", "Invoice", &draft));
//! assert!(!ability.can("Update", "Invoice", &paid));
//! assert!(ability.can("Read", "Invoice", &paid));
//! ```
//!
//! ## Error Handling
//!
//! Compilation never fails as a whole. An unparseable action token or
//! resource identifier is logged through `tracing` and drops only the rule
//! it would have produced. Evaluation returns a plain `bool`; turning a
//! denial into an error is the job of the calling checkpoint
//! (see `platform-authz`).

pub mod ability;
pub mod actions;
pub mod compiler;
pub mod condition;
pub mod error;
pub mod identity;
pub mod policy;
pub mod resource;

// Re-export main types for convenience
pub use ability::Ability;
pub use actions::{ParsedAction, SubjectType, Verb};
pub use compiler::{compile, Rule};
pub use condition::{Condition, ConditionOperator};
pub use error::{ActionParseError, IdentityParseError, PolicyError, PolicyResult};
pub use identity::{ResourceConstraint, ResourceId};
pub use policy::{Effect, Policy};
pub use resource::FieldMap;
