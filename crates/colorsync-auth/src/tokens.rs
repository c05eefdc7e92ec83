//! Token claims, issuance, and verification.
//!
//! Two entirely separate credential families, signed with distinct secrets:
//!
//! - **User tokens** bind a request to a player identity. They are minted by
//!   the identity service at login and presented by clients as
//!   `Authorization: Bearer <token>`. Lifetime: 24 hours.
//! - **Service tokens** prove that a request came from a trusted peer
//!   service, not from a client. The matchmaker attaches one (as
//!   `X-Service-Token`) when it announces a freshly paired room to the game
//!   runtime, so clients cannot fabricate games. Lifetime: 1 hour.
//!
//! Keeping the secrets distinct means a leaked user token can never be
//! replayed as a service credential.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::AuthError;

const USER_TOKEN_LIFETIME_HOURS: i64 = 24;
const SERVICE_TOKEN_LIFETIME_HOURS: i64 = 1;

// Development fallbacks only; deployments set the environment variables.
const DEFAULT_USER_SECRET: &str = "user-jwt-secret-key-change-in-production";
const DEFAULT_SERVICE_SECRET: &str = "service-to-service-secret-key-change-in-production";

/// HMAC key material for user tokens.
#[derive(Clone)]
pub struct UserSecret(pub String);

impl UserSecret {
    /// Reads `USER_JWT_SECRET`, falling back to the development key.
    pub fn from_env() -> Self {
        Self(std::env::var("USER_JWT_SECRET").unwrap_or_else(|_| DEFAULT_USER_SECRET.to_owned()))
    }
}

/// HMAC key material for service-to-service tokens.
#[derive(Clone)]
pub struct ServiceSecret(pub String);

impl ServiceSecret {
    /// Reads `SERVICE_JWT_SECRET`, falling back to the development key.
    pub fn from_env() -> Self {
        Self(
            std::env::var("SERVICE_JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_SERVICE_SECRET.to_owned()),
        )
    }
}

/// Claims carried by a user token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims carried by a service token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceClaims {
    pub service_name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signs a user token for the given identity.
///
/// Token issuance belongs to the identity service; this lives here so that
/// service tests can mint valid credentials against the shared secret.
pub fn issue_user_token(
    user_id: &str,
    username: &str,
    secret: &UserSecret,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = UserClaims {
        user_id: user_id.to_owned(),
        username: username.to_owned(),
        exp: (now + Duration::hours(USER_TOKEN_LIFETIME_HOURS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.0.as_ref()),
    )
}

/// Verifies a user token and returns its claims.
pub fn verify_user_token(token: &str, secret: &UserSecret) -> Result<UserClaims, AuthError> {
    decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.0.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Signs a service token naming the calling service.
pub fn issue_service_token(
    service_name: &str,
    secret: &ServiceSecret,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = ServiceClaims {
        service_name: service_name.to_owned(),
        exp: (now + Duration::hours(SERVICE_TOKEN_LIFETIME_HOURS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.0.as_ref()),
    )
}

/// Verifies a service token and returns its claims.
pub fn verify_service_token(
    token: &str,
    secret: &ServiceSecret,
) -> Result<ServiceClaims, AuthError> {
    decode::<ServiceClaims>(
        token,
        &DecodingKey::from_secret(secret.0.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidServiceToken)
}

// =========================================================================
// Tests
// =========================================================================
