//! Request workflows: one method per externally visible operation.
//!
//! Each workflow takes the already resolved [`Principal`] (when the operation
//! is protected), applies the capability gate, then runs domain rules and a
//! single atomic store call.
//!
//! [`Principal`]: dealership_auth::Principal

mod accounts;
mod cars;
mod deals;
mod favorites;
mod queries;
mod questions;
mod stores;

use std::sync::Arc;

use dealership_auth::{Hs256Jwt, PasswordError, PasswordHasher};
use dealership_core::Clock;
use dealership_sales::TransitionPolicy;

use crate::error::ServiceResult;
use crate::store::MarketplaceStore;

pub use accounts::{LoginOutcome, Profile};
pub use cars::CarDetails;
pub use queries::{LOW_MILEAGE_CEILING, ListedCar, MarketAnalysis};

/// Shared, immutable handle to every workflow.
#[derive(Clone)]
pub struct Marketplace {
    store: Arc<dyn MarketplaceStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<Hs256Jwt>,
    clock: Arc<dyn Clock>,
    policy: TransitionPolicy,
}

impl Marketplace {
    pub fn new(
        store: Arc<dyn MarketplaceStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<Hs256Jwt>,
        clock: Arc<dyn Clock>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            clock,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn MarketplaceStore> {
        &self.store
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// bcrypt is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, secret: String) -> ServiceResult<String> {
        let hasher = self.hasher.clone();
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| PasswordError::Hash(format!("hashing task failed: {e}")))??;
        Ok(digest)
    }

    async fn verify_password(&self, secret: String, digest: String) -> bool {
        let hasher = self.hasher.clone();
        match tokio::task::spawn_blocking(move || hasher.verify(&secret, &digest)).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(error = %e, "password verification task failed");
                false
            }
        }
    }
}
