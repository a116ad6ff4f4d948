use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::{Principal, Role};
use crate::config::AuthConfig;

/// Issuer embedded in every token this service signs.
pub const TOKEN_ISSUER: &str = "taskconnect";

/// Claims carried by a signed bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account identity.
    pub sub: Uuid,
    pub role: Role,
    pub iss: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Token returned to a client after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("credential is missing")]
    Missing,
    #[error("credential has expired")]
    Expired,
    #[error("credential is not valid")]
    Invalid,
    #[error("invalid email or password")]
    InvalidLogin,
    #[error("unable to sign credential: {0}")]
    Signing(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Signs and verifies HS256 bearer tokens and owns the password hashing cost.
#[derive(Clone)]
pub struct CredentialAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    password_cost: u32,
}

impl CredentialAuthority {
    pub fn new(secret: &str, ttl: Duration, password_cost: u32) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            password_cost,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::minutes(config.token_ttl_minutes),
            config.password_cost,
        )
    }

    pub fn password_cost(&self) -> u32 {
        self.password_cost
    }

    pub fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<IssuedToken, CredentialError> {
        let expires_at = now + self.ttl;
        let claims = TokenClaims {
            sub: principal.id.0,
            role: principal.role,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| CredentialError::Signing(err.to_string()))?;

        Ok(IssuedToken {
            token,
            role: principal.role,
            expires_at,
        })
    }

    /// Verifies signature, issuer, and expiry, yielding the caller's identity and role.
    pub fn verify(&self, token: &str) -> Result<Principal, CredentialError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialError::Missing);
        }

        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Invalid,
            },
        )?;

        Ok(Principal::new(data.claims.sub, data.claims.role))
    }
}
