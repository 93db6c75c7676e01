//! Policy persistence boundary.
//!
//! Declaration order is significant to the evaluator, so every store must
//! return a principal's policies in insertion order, and updates must keep
//! a policy in its original position.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use platform_policy::Policy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::config::{AuthzConfig, ConfigError};
use crate::error::{StoreError, StoreResult};

/// A policy as persisted for one principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPolicy {
    /// Storage identifier.
    pub id: Uuid,

    /// Owning principal.
    pub principal_id: Uuid,

    /// The policy document.
    #[serde(flatten)]
    pub policy: Policy,

    /// When the policy was created.
    pub created_at: DateTime<Utc>,

    /// When the policy was last updated.
    pub updated_at: DateTime<Utc>,
}

impl StoredPolicy {
    /// Wrap a policy for a principal with a fresh id.
    pub fn new(principal_id: Uuid, policy: Policy) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            principal_id,
            policy,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage for principals' policies.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Load a principal's policies in insertion order.
    ///
    /// An unknown principal has no policies.
    async fn load_policies(&self, principal_id: Uuid) -> StoreResult<Vec<Policy>>;

    /// Append a policy to a principal's list.
    async fn create_policy(&self, principal_id: Uuid, policy: Policy) -> StoreResult<StoredPolicy>;

    /// Replace a policy in place.
    async fn update_policy(
        &self,
        principal_id: Uuid,
        policy_id: Uuid,
        policy: Policy,
    ) -> StoreResult<StoredPolicy>;

    /// Remove a policy.
    async fn delete_policy(&self, principal_id: Uuid, policy_id: Uuid) -> StoreResult<()>;
}

/// In-memory policy store.
///
/// This is suitable for single-process applications and testing.
#[derive(Debug, Clone)]
pub struct InMemoryPolicyStore {
    /// Policies per principal, in insertion order
    policies: Arc<RwLock<HashMap<Uuid, Vec<StoredPolicy>>>>,
    /// Maximum policies per principal
    max_policies: usize,
}

impl InMemoryPolicyStore {
    /// Create a store with the default policy limit.
    pub fn new() -> Self {
        Self::with_limit(AuthzConfig::default().max_policies_per_principal)
    }

    /// Create a store using the configured policy limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn from_config(config: &AuthzConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_limit(config.max_policies_per_principal))
    }

    fn with_limit(max_policies: usize) -> Self {
        Self {
            policies: Arc::new(RwLock::new(HashMap::new())),
            max_policies,
        }
    }

    /// Get the stored records for a principal, ids and timestamps included.
    pub async fn list(&self, principal_id: Uuid) -> Vec<StoredPolicy> {
        self.policies
            .read()
            .await
            .get(&principal_id)
            .cloned()
            .unwrap_or_default()
    }

    fn ensure_unique_name(
        existing: &[StoredPolicy],
        name: &str,
        except: Option<Uuid>,
    ) -> StoreResult<()> {
        let taken = existing
            .iter()
            .any(|p| p.policy.name == name && Some(p.id) != except);
        if taken {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn load_policies(&self, principal_id: Uuid) -> StoreResult<Vec<Policy>> {
        let policies = self.policies.read().await;
        Ok(policies
            .get(&principal_id)
            .map(|stored| stored.iter().map(|p| p.policy.clone()).collect())
            .unwrap_or_default())
    }

    async fn create_policy(&self, principal_id: Uuid, policy: Policy) -> StoreResult<StoredPolicy> {
        policy.validate()?;

        let mut policies = self.policies.write().await;
        let existing = policies.entry(principal_id).or_default();

        if existing.len() >= self.max_policies {
            return Err(StoreError::LimitExceeded(self.max_policies));
        }
        Self::ensure_unique_name(existing, &policy.name, None)?;

        let stored = StoredPolicy::new(principal_id, policy);
        existing.push(stored.clone());

        debug!(principal = %principal_id, policy = %stored.policy.name, id = %stored.id, "Created policy");
        Ok(stored)
    }

    async fn update_policy(
        &self,
        principal_id: Uuid,
        policy_id: Uuid,
        policy: Policy,
    ) -> StoreResult<StoredPolicy> {
        policy.validate()?;

        let mut policies = self.policies.write().await;
        let existing = policies
            .get_mut(&principal_id)
            .ok_or(StoreError::NotFound(policy_id))?;

        Self::ensure_unique_name(existing, &policy.name, Some(policy_id))?;

        let stored = existing
            .iter_mut()
            .find(|p| p.id == policy_id)
            .ok_or(StoreError::NotFound(policy_id))?;
        stored.policy = policy;
        stored.updated_at = Utc::now();

        debug!(principal = %principal_id, id = %policy_id, "Updated policy");
        Ok(stored.clone())
    }

    async fn delete_policy(&self, principal_id: Uuid, policy_id: Uuid) -> StoreResult<()> {
        let mut policies = self.policies.write().await;
        let existing = policies
            .get_mut(&principal_id)
            .ok_or(StoreError::NotFound(policy_id))?;

        let before = existing.len();
        existing.retain(|p| p.id != policy_id);
        if existing.len() == before {
            return Err(StoreError::NotFound(policy_id));
        }

        debug!(principal = %principal_id, id = %policy_id, "Deleted policy");
        Ok(())
    }
}
