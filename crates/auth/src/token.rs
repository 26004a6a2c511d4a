//! Bearer token issuing and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::{JwtClaims, Role, TokenValidationError, validate_claims};

/// Signing configuration, built once at startup and shared read-only.
#[derive(Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    default_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<Vec<u8>>, default_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl core::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("token ttl must be positive and keep expiry representable")]
    InvalidTtl,

    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: JwtClaims,
}

/// HS256 issuer/verifier over a shared secret.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl Hs256Jwt {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            default_ttl: config.default_ttl,
        }
    }

    /// Sign a token for `email` acting as `role`, valid for `ttl` (or the
    /// configured default) starting at `now`.
    pub fn issue(
        &self,
        email: &str,
        role: Role,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenIssueError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl.num_seconds() <= 0 {
            return Err(TokenIssueError::InvalidTtl);
        }

        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenIssueError::InvalidTtl)?;

        let claims = JwtClaims {
            sub: email.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(IssuedToken { token, claims })
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenValidationError::BadSignature,
                other => TokenValidationError::Malformed(format!("{other:?}")),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn jwt(secret: &str) -> Hs256Jwt {
        Hs256Jwt::new(&TokenConfig::new(secret, Duration::minutes(30)))
    }

    #[test]
    fn issue_then_validate_returns_identity_and_role() {
        let jwt = jwt("test-secret");
        let now = Utc::now();
        let issued = jwt.issue("b@x.com", Role::Buyer, None, now).unwrap();

        let claims = jwt.validate(&issued.token, now).unwrap();
        assert_eq!(claims.sub, "b@x.com");
        assert_eq!(claims.role, "buyer");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn explicit_ttl_overrides_default() {
        let jwt = jwt("test-secret");
        let now = Utc::now();
        let issued = jwt
            .issue("s@x.com", Role::Seller, Some(Duration::minutes(2)), now)
            .unwrap();
        assert_eq!(issued.claims.exp - issued.claims.iat, 120);
    }

    #[test]
    fn token_fails_once_ttl_has_elapsed() {
        let jwt = jwt("test-secret");
        let now = Utc::now();
        let issued = jwt
            .issue("b@x.com", Role::Buyer, Some(Duration::minutes(1)), now)
            .unwrap();

        assert!(jwt.validate(&issued.token, now + Duration::seconds(59)).is_ok());
        assert_eq!(
            jwt.validate(&issued.token, now + Duration::seconds(60)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn wrong_secret_is_bad_signature() {
        let now = Utc::now();
        let issued = jwt("secret-a").issue("b@x.com", Role::Buyer, None, now).unwrap();
        assert_eq!(
            jwt("secret-b").validate(&issued.token, now),
            Err(TokenValidationError::BadSignature)
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let jwt = jwt("test-secret");
        let now = Utc::now();
        let buyer = jwt.issue("b@x.com", Role::Buyer, None, now).unwrap();
        let admin = jwt.issue("b@x.com", Role::Admin, None, now).unwrap();

        // Graft the admin payload onto the buyer signature.
        let b: Vec<&str> = buyer.token.split('.').collect();
        let a: Vec<&str> = admin.token.split('.').collect();
        let forged = format!("{}.{}.{}", b[0], a[1], b[2]);

        assert_eq!(
            jwt.validate(&forged, now),
            Err(TokenValidationError::BadSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let jwt = jwt("test-secret");
        assert!(matches!(
            jwt.validate("not-a-token", Utc::now()),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn token_without_role_claim_is_malformed() {
        #[derive(serde::Serialize)]
        struct NoRole<'a> {
            sub: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &NoRole {
                sub: "b@x.com",
                iat: now.timestamp(),
                exp: now.timestamp() + 60,
            },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            jwt("test-secret").validate(&token, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn non_positive_ttl_is_refused() {
        let err = jwt("test-secret")
            .issue("b@x.com", Role::Buyer, Some(Duration::zero()), Utc::now())
            .unwrap_err();
        assert!(matches!(err, TokenIssueError::InvalidTtl));
    }

    #[test]
    fn ttl_past_representable_time_is_refused() {
        let err = jwt("test-secret")
            .issue(
                "b@x.com",
                Role::Buyer,
                Some(Duration::minutes(1_000_000_000_000)),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, TokenIssueError::InvalidTtl));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: any issued token verifies to the same identity and role
        /// strictly before its ttl elapses, and fails at or after it.
        #[test]
        fn round_trip_holds_until_expiry(
            local in "[a-z]{1,12}",
            role_idx in 0usize..3,
            ttl_secs in 1i64..86_400,
        ) {
            let jwt = jwt("prop-secret");
            let role = [Role::Buyer, Role::Seller, Role::Admin][role_idx];
            let email = format!("{local}@x.com");
            let now = Utc::now();

            let issued = jwt.issue(&email, role, Some(Duration::seconds(ttl_secs)), now).unwrap();

            let claims = jwt.validate(&issued.token, now + Duration::seconds(ttl_secs - 1)).unwrap();
            prop_assert_eq!(claims.sub, email);
            prop_assert_eq!(claims.role, role.as_str());

            prop_assert_eq!(
                jwt.validate(&issued.token, now + Duration::seconds(ttl_secs)),
                Err(TokenValidationError::Expired)
            );
        }
    }
}
