//! # Ability
//!
//! The queryable permission set for one evaluation context, typically one
//! authenticated request.
//!
//! ## Decision algorithm
//!
//! Rules are scanned from the last declared to the first. The first rule
//! that matches decides: Allow yields `true`, Deny yields `false`. When no
//! rule matches the answer is `false`.
//!
//! Declaration order, not effect, breaks ties between matching rules, so a
//! narrower policy declared later overrides a broader earlier one in
//! either direction.
//!
//! ```text
//! [Allow(*, any resource), Deny(*, resource X)]
//!   resource X  -> Deny matches first  -> false
//!   resource Y  -> Allow matches       -> true
//! ```
//!
//! An `Ability` is immutable once built and can be shared across threads.

use tracing::debug;

use crate::compiler::{compile, Rule};
use crate::policy::Policy;
use crate::resource::FieldMap;

/// Compiled evaluator state.
///
/// # Example
///
/// ```
/// use platform_policy::{Ability, Policy};
/// use platform_policy::resource::FieldMap;
///
/// let ability = Ability::from_policies(&[Policy::allow("ReadDocs", ["Doc:Read"])]);
/// let doc = FieldMap::new().with("id", "42");
///
/// assert!(ability.can("Read", "Doc", &doc));
/// assert!(ability.cannot("Write", "Doc", &doc));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    /// Build from already compiled rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile policies and build an ability from the result.
    pub fn from_policies(policies: &[Policy]) -> Self {
        Self::new(compile(policies))
    }

    /// Decide whether `verb` may be performed on `resource` of `subject_type`.
    pub fn can(&self, verb: &str, subject_type: &str, resource: &FieldMap) -> bool {
        let id = resource.identity();

        match self
            .rules
            .iter()
            .rev()
            .find(|rule| rule.matches(verb, subject_type, id.as_ref(), resource))
        {
            Some(rule) => {
                debug!(
                    verb,
                    subject_type,
                    policy = %rule.policy,
                    effect = %rule.effect,
                    "Rule matched"
                );
                rule.effect.is_allow()
            }
            None => {
                debug!(verb, subject_type, "No rule matched, denying");
                false
            }
        }
    }

    /// Negation of [`Ability::can`].
    pub fn cannot(&self, verb: &str, subject_type: &str, resource: &FieldMap) -> bool {
        !self.can(verb, subject_type, resource)
    }

    /// Decide whether `verb` may be performed on *some* `subject_type`
    /// without a concrete resource, e.g. before a create.
    ///
    /// Allow rules match on subject type and verb alone. A Deny rule only
    /// counts when it covers every instance (no identity set, no
    /// condition); a restricted Deny cannot rule out every resource.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_policy::{Ability, Policy};
    ///
    /// let ability = Ability::from_policies(&[
    ///     Policy::allow("Create", ["Invoice:Create"]),
    ///     Policy::deny("NotThatOne", ["Invoice:Create"]).on_resources(["000000000001"]),
    /// ]);
    /// assert!(ability.can_on_type("Create", "Invoice"));
    /// ```
    pub fn can_on_type(&self, verb: &str, subject_type: &str) -> bool {
        self.rules
            .iter()
            .rev()
            .filter(|rule| rule.covers(verb, subject_type))
            .find(|rule| rule.effect.is_allow() || rule.is_unrestricted())
            .is_some_and(|rule| rule.effect.is_allow())
    }

    /// Rules whose subject type and verb cover the query, in declaration
    /// order.
    pub fn rules_for<'a>(
        &'a self,
        verb: &'a str,
        subject_type: &'a str,
    ) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.covers(verb, subject_type))
    }

    /// All compiled rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Check if there are no rules (everything is denied).
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<Rule>> for Ability {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<Rule> for Ability {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Condition, ConditionOperator};

    const X: &str = "000000000001";
    const Y: &str = "000000000002";

    fn doc(id: &str) -> FieldMap {
        FieldMap::new().with_id(id)
    }

    #[test]
    fn test_empty_denies() {
        let ability = Ability::default();
        assert!(ability.is_empty());
        assert!(!ability.can("Read", "Doc", &doc(X)));
        assert!(!ability.can_on_type("Read", "Doc"));
    }

    #[test]
    fn test_later_deny_overrides_broad_allow() {
        let ability = Ability::from_policies(&[
            Policy::allow("Everything", ["*"]),
            Policy::deny("NotX", ["*"]).on_resources([X]),
        ]);
        assert!(!ability.can("Read", "Doc", &doc(X)));
        assert!(ability.can("Read", "Doc", &doc(Y)));
    }

    #[test]
    fn test_later_allow_overrides_earlier_deny() {
        let ability = Ability::from_policies(&[
            Policy::deny("NotX", ["*"]).on_resources([X]),
            Policy::allow("Everything", ["*"]),
        ]);
        assert!(ability.can("Read", "Doc", &doc(X)));
        assert!(ability.can("Read", "Doc", &doc(Y)));
    }

    #[test]
    fn test_non_matching_later_rule_is_skipped() {
        let ability = Ability::from_policies(&[
            Policy::allow("Docs", ["Doc:Read"]),
            Policy::deny("Sheets", ["Sheet:Read"]),
        ]);
        assert!(ability.can("Read", "Doc", &doc(X)));
        assert!(!ability.can("Read", "Sheet", &doc(X)));
    }

    #[test]
    fn test_condition_gates_match() {
        let ability = Ability::from_policies(&[
            Policy::allow("Docs", ["Doc:*"]),
            Policy::deny("Locked", ["Doc:Update"])
                .with_condition(Condition::new().with(ConditionOperator::Bool, "locked", true)),
        ]);

        assert!(!ability.can("Update", "Doc", &doc(X).with("locked", true)));
        assert!(ability.can("Update", "Doc", &doc(X).with("locked", false)));
        assert!(ability.can("Update", "Doc", &doc(X)));
    }

    #[test]
    fn test_can_on_type() {
        let ability = Ability::from_policies(&[
            Policy::allow("Docs", ["Doc:*"]),
            Policy::deny("Locked", ["Doc:Delete"])
                .with_condition(Condition::new().with(ConditionOperator::Bool, "locked", true)),
            Policy::deny("NoSheets", ["Sheet:*"]),
            Policy::allow("OneSheet", ["Sheet:Read"]).on_resources([X]),
        ]);

        assert!(ability.can_on_type("Delete", "Doc"));
        assert!(ability.can_on_type("Read", "Sheet"));
        assert!(!ability.can_on_type("Update", "Sheet"));
        assert!(!ability.can_on_type("Read", "Invoice"));

        let blanket = Ability::from_policies(&[
            Policy::allow("Docs", ["Doc:*"]),
            Policy::deny("NoDelete", ["Doc:Delete"]),
        ]);
        assert!(!blanket.can_on_type("Delete", "Doc"));
    }

    #[test]
    fn test_rules_for() {
        let ability = Ability::from_policies(&[
            Policy::allow("A", ["Doc:Read"]),
            Policy::allow("B", ["Sheet:Read"]),
            Policy::deny("C", ["*"]),
        ]);
        let names: Vec<_> = ability.rules_for("Read", "Doc").map(|r| r.policy.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(ability.rules().len(), 3);
    }

    #[test]
    fn test_ability_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ability>();
    }

    #[test]
    fn test_shared_across_threads() {
        let ability = std::sync::Arc::new(Ability::from_policies(&[Policy::allow("Docs", ["Doc:Read"])]));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ability = ability.clone();
                std::thread::spawn(move || ability.can("Read", "Doc", &doc(X)))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
