//! # Platform Authorization
//!
//! This crate provides the authorization checkpoint that sits in front of
//! every Relay platform use-case handler, and the policy store boundary it
//! reads from.
//!
//! ## Overview
//!
//! The platform-authz crate handles:
//! - **Checkpoints**: `Authorizer::authorize` and the synchronous `ensure`
//! - **Policy Storage**: The `PolicyStore` trait and an in-memory implementation
//! - **Errors**: `Unauthenticated` (401) and `Forbidden` (403) signals
//! - **Configuration**: Denial logging and per-principal policy limits
//!
//! ## Request Flow
//!
//! ```text
//! principal ──> PolicyStore::load_policies ──> Ability::from_policies
//!                                                   │
//!            handler <── Ok(()) / Forbidden <── Ability::can(verb, subject_type, resource)
//! ```
//!
//! A fresh `Ability` is built for every check, so policy changes take
//! effect on the next request and nothing is shared between requests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use platform_authz::{Authorizer, AuthzConfig, InMemoryPolicyStore, PolicyStore};
//! use platform_policy::{FieldMap, Policy};
//! use uuid::Uuid;
//!
//! async fn example() {
//!     let store = InMemoryPolicyStore::new();
//!     let principal = Uuid::now_v7();
//!     store
//!         .create_policy(principal, Policy::allow("ReadDocs", ["Doc:Read"]))
//!         .await
//!         .unwrap();
//!
//!     let authorizer = Authorizer::new(store, AuthzConfig::from_env());
//!     let doc = FieldMap::new().with_id("65a1b2c3d4e5f60718293a4b");
//!
//!     assert!(authorizer.authorize(Some(principal), "Read", "Doc", &doc).await.is_ok());
//!     assert!(authorizer.authorize(Some(principal), "Delete", "Doc", &doc).await.is_err());
//! }
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod store;

// Re-export main types
pub use checkpoint::{ensure, ensure_type, Authorizer};
pub use config::{AuthzConfig, ConfigError};
pub use error::{AccessError, AccessResult, StoreError, StoreResult};
pub use store::{InMemoryPolicyStore, PolicyStore, StoredPolicy};
