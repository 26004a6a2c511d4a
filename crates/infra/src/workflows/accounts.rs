use chrono::{DateTime, Utc};
use tracing::instrument;

use dealership_auth::{Principal, Role};
use dealership_core::{BuyerId, SellerId};
use dealership_parties::{Buyer, BuyerRegistration, Seller, SellerRegistration, normalize_email};

use crate::error::{ServiceError, ServiceResult};

use super::Marketplace;

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// The caller's own account, as shown on their profile.
#[derive(Debug, Clone)]
pub enum Profile {
    Buyer(Buyer),
    Seller {
        seller: Seller,
        /// `Seller` or `Admin`, as carried by the token.
        role: Role,
        cars_count: i64,
    },
}

impl Marketplace {
    #[instrument(skip_all, err)]
    pub async fn register_buyer(&self, registration: BuyerRegistration) -> ServiceResult<BuyerId> {
        normalize_email(&registration.email)?;
        let digest = self.hash_password(registration.password.clone()).await?;
        let buyer = registration.into_buyer(BuyerId::new(), digest, self.clock.now())?;

        self.store.insert_buyer(&buyer).await?;
        tracing::info!(buyer_id = %buyer.id, email = %buyer.email, "buyer registered");
        Ok(buyer.id)
    }

    #[instrument(skip_all, err)]
    pub async fn register_seller(&self, registration: SellerRegistration) -> ServiceResult<SellerId> {
        normalize_email(&registration.email)?;
        let digest = self.hash_password(registration.password.clone()).await?;
        let seller = registration.into_seller(SellerId::new(), digest, self.clock.now())?;

        self.store.insert_seller(&seller).await?;
        tracing::info!(seller_id = %seller.id, email = %seller.email, "seller registered");
        Ok(seller.id)
    }

    /// Buyers are checked first, then sellers. Unknown identity and wrong
    /// password fail the same way.
    #[instrument(skip_all, err)]
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let Ok(email) = normalize_email(username) else {
            tracing::warn!("login failed: malformed username");
            return Err(ServiceError::unauthenticated());
        };

        let account = match self.store.buyer_by_email(&email).await? {
            Some(buyer) => Some((buyer.password_hash, Role::Buyer)),
            None => self
                .store
                .seller_by_email(&email)
                .await?
                .map(|seller| (seller.password_hash, Role::Seller)),
        };

        let Some((digest, role)) = account else {
            tracing::warn!(%email, "login failed: unknown identity");
            return Err(ServiceError::unauthenticated());
        };

        if !self.verify_password(password.to_string(), digest).await {
            tracing::warn!(%email, "login failed: wrong password");
            return Err(ServiceError::unauthenticated());
        }

        let issued = self.tokens.issue(&email, role, None, self.clock.now())?;
        let expires_at = DateTime::from_timestamp(issued.claims.exp, 0).unwrap_or_else(|| self.clock.now());
        tracing::info!(%email, %role, "login succeeded");

        Ok(LoginOutcome {
            access_token: issued.token,
            role,
            expires_at,
        })
    }

    /// A principal whose row has since been deleted is unauthenticated.
    pub async fn profile(&self, principal: &Principal) -> ServiceResult<Profile> {
        match principal {
            Principal::Buyer(b) => {
                let buyer = self
                    .store
                    .buyer(b.id)
                    .await?
                    .ok_or_else(ServiceError::unauthenticated)?;
                Ok(Profile::Buyer(buyer))
            }
            Principal::Seller(s) => {
                let seller = self
                    .store
                    .seller(s.id)
                    .await?
                    .ok_or_else(ServiceError::unauthenticated)?;
                let cars_count = self.store.count_cars_by_seller(s.id).await?;
                Ok(Profile::Seller {
                    seller,
                    role: s.role,
                    cars_count,
                })
            }
        }
    }
}
