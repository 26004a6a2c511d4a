//! Principal lookups for the auth resolver, backed by the account tables.

use std::sync::Arc;

use async_trait::async_trait;

use dealership_auth::{BuyerIdentity, DirectoryError, PrincipalDirectory, Role, SellerIdentity};

use crate::store::MarketplaceStore;

/// Adapts a [`MarketplaceStore`] to [`PrincipalDirectory`].
#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn MarketplaceStore>,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PrincipalDirectory for AccountDirectory {
    async fn buyer_by_email(&self, email: &str) -> Result<Option<BuyerIdentity>, DirectoryError> {
        let buyer = self
            .store
            .buyer_by_email(email)
            .await
            .map_err(|e| DirectoryError(e.to_string()))?;
        Ok(buyer.map(|b| BuyerIdentity {
            id: b.id,
            email: b.email,
            full_name: b.full_name,
        }))
    }

    async fn seller_by_email(&self, email: &str) -> Result<Option<SellerIdentity>, DirectoryError> {
        let seller = self
            .store
            .seller_by_email(email)
            .await
            .map_err(|e| DirectoryError(e.to_string()))?;
        Ok(seller.map(|s| SellerIdentity {
            id: s.id,
            email: s.email,
            full_name: s.full_name,
            role: Role::Seller,
        }))
    }
}
