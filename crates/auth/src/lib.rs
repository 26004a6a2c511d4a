//! `dealership-auth`: authentication/authorization boundary.
//!
//! Token handling, password hashing and role resolution live here. This crate
//! is decoupled from HTTP; storage is reached only through [`PrincipalDirectory`].

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod token;

pub use authorize::{AuthzError, require_buyer, require_seller};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::{BcryptHasher, PasswordError, PasswordHasher};
pub use principal::{BuyerIdentity, Principal, SellerIdentity};
pub use resolver::{DirectoryError, PrincipalDirectory, ResolveError, RoleResolver};
pub use roles::Role;
pub use token::{Hs256Jwt, IssuedToken, JwtValidator, TokenConfig, TokenIssueError};
