//! Policy compilation.
//!
//! Each `(policy, action token)` pair becomes one [`Rule`], in policy order
//! and then action order. Tokens that fail to parse, and policies whose
//! resource list contains an unparseable identifier, drop only the rules
//! they would have produced.

use tracing::{debug, warn};

use crate::actions::{ParsedAction, SubjectType, Verb};
use crate::condition::{self, Condition};
use crate::identity::{ResourceConstraint, ResourceId};
use crate::policy::{Effect, Policy};
use crate::resource::FieldMap;

/// One compiled rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Allow or Deny.
    pub effect: Effect,
    /// Subject type matched (`All` for the wildcard).
    pub subject_type: SubjectType,
    /// Verb matched (`Manage` for the wildcard).
    pub verb: Verb,
    /// Resource identities matched.
    pub resources: ResourceConstraint,
    /// Attribute condition, if any.
    pub condition: Option<Condition>,
    /// Name of the policy the rule came from.
    pub policy: String,
}

impl Rule {
    /// Check whether the rule's subject type and verb cover the query.
    pub fn covers(&self, verb: &str, subject_type: &str) -> bool {
        self.subject_type.covers(subject_type) && self.verb.covers(verb)
    }

    /// Check whether the rule matches a concrete resource.
    ///
    /// `id` is the resource's parsed identity, passed in so that callers
    /// scanning many rules parse it once.
    pub fn matches(
        &self,
        verb: &str,
        subject_type: &str,
        id: Option<&ResourceId>,
        resource: &FieldMap,
    ) -> bool {
        self.covers(verb, subject_type)
            && self.resources.admits(id)
            && condition::satisfies(self.condition.as_ref(), resource)
    }

    /// Check whether the rule applies to every instance of its subject
    /// type, i.e. it has neither an identity set nor a condition.
    pub fn is_unrestricted(&self) -> bool {
        self.resources.is_unconstrained() && self.condition.is_none()
    }
}

/// Compile policies into an ordered rule list.
///
/// Never fails: problems are logged and the affected rule is omitted.
///
/// # Example
///
/// ```
/// use platform_policy::{compile, Policy};
///
/// let rules = compile(&[
///     Policy::allow("Docs", ["Doc:Read", "Doc:Update", "DocDelete"]),
/// ]);
/// assert_eq!(rules.len(), 2);
/// ```
pub fn compile(policies: &[Policy]) -> Vec<Rule> {
    let mut rules = Vec::new();

    for policy in policies {
        let constraint = ResourceConstraint::from_resources(&policy.resources);

        for token in &policy.actions {
            let action = match ParsedAction::parse(token) {
                Ok(action) => action,
                Err(e) => {
                    warn!(policy = %policy.name, action = %token, error = %e, "Skipping unparseable action");
                    continue;
                }
            };

            let resources = match &constraint {
                Ok(resources) => resources.clone(),
                Err(e) => {
                    warn!(policy = %policy.name, action = %token, error = %e, "Skipping action with invalid resource identifier");
                    continue;
                }
            };

            rules.push(Rule {
                effect: policy.effect,
                subject_type: action.subject_type,
                verb: action.verb,
                resources,
                condition: policy.condition.clone(),
                policy: policy.name.clone(),
            });
        }
    }

    debug!(policies = policies.len(), rules = rules.len(), "Compiled policies");
    rules
}
