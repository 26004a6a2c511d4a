//! Token → [`Principal`] resolution.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use dealership_core::Clock;

use crate::{BuyerIdentity, JwtValidator, Principal, Role, SellerIdentity, TokenValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("principal lookup failed: {0}")]
pub struct DirectoryError(pub String);

/// Read access to the two principal tables.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    async fn buyer_by_email(&self, email: &str) -> Result<Option<BuyerIdentity>, DirectoryError>;

    /// Returned identities carry `Role::Seller`; the resolver overwrites it
    /// with the token's claim.
    async fn seller_by_email(&self, email: &str) -> Result<Option<SellerIdentity>, DirectoryError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unauthenticated: {0}")]
    InvalidToken(#[from] TokenValidationError),

    #[error("unauthenticated: unrecognised role claim '{0}'")]
    UnknownRole(String),

    #[error("unauthenticated: no {role} registered for token subject")]
    UnknownPrincipal { role: Role },

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl ResolveError {
    /// Everything except a storage failure is an authentication failure.
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, ResolveError::Directory(_))
    }
}

/// Verifies a bearer token and loads the concrete principal row it names.
pub struct RoleResolver<D> {
    validator: Arc<dyn JwtValidator>,
    directory: D,
    clock: Arc<dyn Clock>,
}

impl<D: PrincipalDirectory> RoleResolver<D> {
    pub fn new(validator: Arc<dyn JwtValidator>, directory: D, clock: Arc<dyn Clock>) -> Self {
        Self {
            validator,
            directory,
            clock,
        }
    }

    /// The role claim picks the table; a missing row fails the same way a bad
    /// token does.
    pub async fn resolve(&self, token: &str) -> Result<Principal, ResolveError> {
        let claims = self.validator.validate(token, self.clock.now())?;

        let role: Role = claims
            .role
            .parse()
            .map_err(|_| ResolveError::UnknownRole(claims.role.clone()))?;

        let principal = if role.is_seller_scoped() {
            self.directory
                .seller_by_email(&claims.sub)
                .await?
                .map(|mut seller| {
                    seller.role = role;
                    Principal::Seller(seller)
                })
        } else {
            self.directory
                .buyer_by_email(&claims.sub)
                .await?
                .map(Principal::Buyer)
        };

        principal.ok_or(ResolveError::UnknownPrincipal { role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hs256Jwt, TokenConfig};
    use chrono::{Duration, Utc};
    use dealership_core::{BuyerId, FixedClock, SellerId};

    struct FakeDirectory {
        buyers: Vec<BuyerIdentity>,
        sellers: Vec<SellerIdentity>,
    }

    #[async_trait]
    impl PrincipalDirectory for FakeDirectory {
        async fn buyer_by_email(&self, email: &str) -> Result<Option<BuyerIdentity>, DirectoryError> {
            Ok(self.buyers.iter().find(|b| b.email == email).cloned())
        }

        async fn seller_by_email(&self, email: &str) -> Result<Option<SellerIdentity>, DirectoryError> {
            Ok(self.sellers.iter().find(|s| s.email == email).cloned())
        }
    }

    struct Fixture {
        jwt: Arc<Hs256Jwt>,
        clock: Arc<FixedClock>,
        resolver: RoleResolver<FakeDirectory>,
    }

    fn fixture() -> Fixture {
        let jwt = Arc::new(Hs256Jwt::new(&TokenConfig::new("test-secret", Duration::minutes(30))));
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let directory = FakeDirectory {
            buyers: vec![BuyerIdentity {
                id: BuyerId::new(),
                email: "b@x.com".to_string(),
                full_name: "Bea Buyer".to_string(),
            }],
            sellers: vec![SellerIdentity {
                id: SellerId::new(),
                email: "s@x.com".to_string(),
                full_name: "Sam Seller".to_string(),
                role: Role::Seller,
            }],
        };
        let resolver = RoleResolver::new(jwt.clone(), directory, clock.clone());
        Fixture { jwt, clock, resolver }
    }

    fn token(f: &Fixture, email: &str, role: Role) -> String {
        f.jwt.issue(email, role, None, f.clock.now()).unwrap().token
    }

    #[tokio::test]
    async fn buyer_claim_resolves_buyer_row() {
        let f = fixture();
        let p = f.resolver.resolve(&token(&f, "b@x.com", Role::Buyer)).await.unwrap();
        assert!(matches!(p, Principal::Buyer(ref b) if b.email == "b@x.com"));
    }

    #[tokio::test]
    async fn admin_claim_resolves_seller_row_and_keeps_admin_role() {
        let f = fixture();
        let p = f.resolver.resolve(&token(&f, "s@x.com", Role::Admin)).await.unwrap();
        assert_eq!(p.role(), Role::Admin);
        assert!(matches!(p, Principal::Seller(_)));
    }

    #[tokio::test]
    async fn role_claim_selects_the_table() {
        let f = fixture();
        // A buyer's email under a seller claim is not found in the sellers table.
        let err = f
            .resolver
            .resolve(&token(&f, "b@x.com", Role::Seller))
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownPrincipal { role: Role::Seller });
        assert!(err.is_unauthenticated());
    }

    #[tokio::test]
    async fn unknown_role_claim_is_unauthenticated() {
        let f = fixture();
        let claims = crate::JwtClaims {
            sub: "b@x.com".to_string(),
            role: "superuser".to_string(),
            iat: f.clock.now().timestamp(),
            exp: f.clock.now().timestamp() + 60,
        };
        let raw = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = f.resolver.resolve(&raw).await.unwrap_err();
        assert_eq!(err, ResolveError::UnknownRole("superuser".to_string()));
        assert!(err.is_unauthenticated());
    }

    #[tokio::test]
    async fn expired_token_is_unauthenticated() {
        let f = fixture();
        let t = token(&f, "b@x.com", Role::Buyer);
        f.clock.advance(Duration::minutes(31));

        let err = f.resolver.resolve(&t).await.unwrap_err();
        assert_eq!(err, ResolveError::InvalidToken(TokenValidationError::Expired));
    }
}
