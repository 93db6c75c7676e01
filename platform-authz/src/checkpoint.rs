//! Authorization checkpoints.
//!
//! A use-case handler calls a checkpoint before doing any work. The
//! checkpoint loads the principal's current policies, builds a fresh
//! [`Ability`] for this request, and turns a `false` decision into
//! [`AccessError::Forbidden`].
//!
//! # Example
//!
//! ```rust,no_run
//! use platform_authz::{Authorizer, AuthzConfig, InMemoryPolicyStore};
//! use platform_policy::FieldMap;
//! use uuid::Uuid;
//!
//! async fn update_invoice(principal: Option<Uuid>, invoice: FieldMap) {
//!     let store = InMemoryPolicyStore::new();
//!     let authorizer = Authorizer::new(store, AuthzConfig::default());
//!
//!     match authorizer.authorize(principal, "Update", "Invoice", &invoice).await {
//!         Ok(()) => { /* perform the update */ }
//!         Err(e) => eprintln!("{} ({})", e, e.status_code()),
//!     }
//! }
//! ```

use platform_policy::{Ability, FieldMap};
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::AuthzConfig;
use crate::error::{AccessError, AccessResult};
use crate::store::PolicyStore;

/// Check a decision on an ability the caller already holds.
///
/// # Returns
///
/// `Ok(())` when permitted, [`AccessError::Forbidden`] otherwise.
pub fn ensure(
    ability: &Ability,
    verb: &str,
    subject_type: &str,
    resource: &FieldMap,
) -> AccessResult<()> {
    if ability.can(verb, subject_type, resource) {
        Ok(())
    } else {
        Err(AccessError::forbidden(verb, subject_type))
    }
}

/// Check a type-level decision (no concrete resource) on an ability the
/// caller already holds.
pub fn ensure_type(ability: &Ability, verb: &str, subject_type: &str) -> AccessResult<()> {
    if ability.can_on_type(verb, subject_type) {
        Ok(())
    } else {
        Err(AccessError::forbidden(verb, subject_type))
    }
}

/// Per-request authorization against a policy store.
#[derive(Debug, Clone)]
pub struct Authorizer<S> {
    store: S,
    config: AuthzConfig,
}

impl<S: PolicyStore> Authorizer<S> {
    /// Create an authorizer over a policy store.
    pub fn new(store: S, config: AuthzConfig) -> Self {
        Self { store, config }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    /// Build an ability from the principal's current policies.
    ///
    /// # Errors
    ///
    /// - [`AccessError::Unauthenticated`] when there is no principal
    /// - [`AccessError::Internal`] when the store fails
    pub async fn ability_for(&self, principal_id: Option<Uuid>) -> AccessResult<Ability> {
        let principal_id = principal_id.ok_or(AccessError::Unauthenticated)?;

        let policies = self
            .store
            .load_policies(principal_id)
            .await
            .map_err(|e| {
                error!(principal = %principal_id, error = %e, "Failed to load policies");
                AccessError::from(e)
            })?;

        Ok(Ability::from_policies(&policies))
    }

    /// Authorize `verb` on a concrete resource.
    pub async fn authorize(
        &self,
        principal_id: Option<Uuid>,
        verb: &str,
        subject_type: &str,
        resource: &FieldMap,
    ) -> AccessResult<()> {
        let ability = self.ability_for(principal_id).await?;
        let result = ensure(&ability, verb, subject_type, resource);
        self.log_denial(principal_id, verb, subject_type, &result);
        result
    }

    /// Authorize `verb` on a subject type without a concrete resource,
    /// e.g. before creating one.
    pub async fn authorize_type(
        &self,
        principal_id: Option<Uuid>,
        verb: &str,
        subject_type: &str,
    ) -> AccessResult<()> {
        let ability = self.ability_for(principal_id).await?;
        let result = ensure_type(&ability, verb, subject_type);
        self.log_denial(principal_id, verb, subject_type, &result);
        result
    }

    fn log_denial(
        &self,
        principal_id: Option<Uuid>,
        verb: &str,
        subject_type: &str,
        result: &AccessResult<()>,
    ) {
        if self.config.log_denials && result.is_err() {
            warn!(principal = ?principal_id, verb, subject_type, "Access denied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::store::{InMemoryPolicyStore, StoredPolicy};
    use async_trait::async_trait;
    use platform_policy::condition::{Condition, ConditionOperator};
    use platform_policy::Policy;

    const X: &str = "000000000001";

    async fn authorizer_with(policies: Vec<Policy>) -> (Authorizer<InMemoryPolicyStore>, Uuid) {
        let store = InMemoryPolicyStore::new();
        let principal = Uuid::now_v7();
        for policy in policies {
            store.create_policy(principal, policy).await.unwrap();
        }
        (Authorizer::new(store, AuthzConfig::default()), principal)
    }

    #[test]
    fn test_ensure() {
        let ability = Ability::from_policies(&[Policy::allow("Docs", ["Doc:Read"])]);
        let doc = FieldMap::new().with_id(X);

        assert!(ensure(&ability, "Read", "Doc", &doc).is_ok());
        match ensure(&ability, "Write", "Doc", &doc) {
            Err(AccessError::Forbidden { verb, subject_type }) => {
                assert_eq!(verb, "Write");
                assert_eq!(subject_type, "Doc");
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_principal_is_unauthenticated() {
        let (authorizer, _) = authorizer_with(vec![Policy::allow("All", ["*"])]).await;
        let result = authorizer
            .authorize(None, "Read", "Doc", &FieldMap::new())
            .await;
        assert!(matches!(result, Err(AccessError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_unknown_principal_is_forbidden() {
        let (authorizer, _) = authorizer_with(vec![Policy::allow("All", ["*"])]).await;
        let result = authorizer
            .authorize(Some(Uuid::now_v7()), "Read", "Doc", &FieldMap::new())
            .await;
        assert_eq!(result.unwrap_err().status_code(), 403);
    }

    #[tokio::test]
    async fn test_authorize_uses_current_policies() {
        let (authorizer, principal) = authorizer_with(vec![
            Policy::allow("Invoices", ["Invoice:*"]),
            Policy::deny("NoPaidEdits", ["Invoice:Update"]).with_condition(
                Condition::new().with(ConditionOperator::StringEquals, "status", "paid"),
            ),
        ])
        .await;

        let draft = FieldMap::new().with_id(X).with("status", "draft");
        let paid = FieldMap::new().with_id(X).with("status", "paid");

        assert!(authorizer
            .authorize(Some(principal), "Update", "Invoice", &draft)
            .await
            .is_ok());
        assert!(authorizer
            .authorize(Some(principal), "Update", "Invoice", &paid)
            .await
            .is_err());

        // Later declarations win, so a new policy takes effect immediately
        authorizer
            .store()
            .create_policy(principal, Policy::allow("Override", ["Invoice:Update"]))
            .await
            .unwrap();
        assert!(authorizer
            .authorize(Some(principal), "Update", "Invoice", &paid)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_authorize_type() {
        let (authorizer, principal) = authorizer_with(vec![
            Policy::allow("CreateInvoices", ["Invoice:Create"]),
        ])
        .await;

        assert!(authorizer
            .authorize_type(Some(principal), "Create", "Invoice")
            .await
            .is_ok());
        assert!(authorizer
            .authorize_type(Some(principal), "Create", "Order")
            .await
            .is_err());
    }

    struct FailingStore;

    #[async_trait]
    impl PolicyStore for FailingStore {
        async fn load_policies(&self, _principal_id: Uuid) -> StoreResult<Vec<Policy>> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn create_policy(&self, _: Uuid, _: Policy) -> StoreResult<StoredPolicy> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn update_policy(&self, _: Uuid, id: Uuid, _: Policy) -> StoreResult<StoredPolicy> {
            Err(StoreError::NotFound(id))
        }

        async fn delete_policy(&self, _: Uuid, id: Uuid) -> StoreResult<()> {
            Err(StoreError::NotFound(id))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let authorizer = Authorizer::new(FailingStore, AuthzConfig::default());
        let result = authorizer
            .authorize(Some(Uuid::now_v7()), "Read", "Doc", &FieldMap::new())
            .await;
        let err = result.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.status_code(), 500);
    }
}
