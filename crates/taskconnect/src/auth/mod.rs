//! Credential collaborator: password hashing and signed bearer tokens.
//!
//! Decoupled from HTTP and storage; the marketplace service trusts a verified [`Principal`]
//! completely.

pub mod password;
pub mod principal;
pub mod token;

pub use password::{hash_password, verify_password};
pub use principal::{Principal, PrincipalId, Role};
pub use token::{CredentialAuthority, CredentialError, IssuedToken, TokenClaims};
