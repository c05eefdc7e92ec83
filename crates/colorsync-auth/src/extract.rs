//! Axum extractors for the two credential families.
//!
//! Handlers that need an authenticated caller simply take `claims:
//! UserClaims` (or `ServiceClaims`) as an argument; the extractor pulls the
//! token from the request, verifies it against the secret held in app state,
//! and rejects with a 401 JSON body before the handler runs.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    tokens::{verify_service_token, verify_user_token},
    AuthError, ServiceClaims, ServiceSecret, UserClaims, UserSecret,
};

/// Header carrying the service credential on inter-service requests.
pub const SERVICE_TOKEN_HEADER: &str = "X-Service-Token";

#[async_trait]
impl<S> FromRequestParts<S> for UserClaims
where
    UserSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secret = UserSecret::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthFormat)?;

        verify_user_token(token, &secret)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ServiceClaims
where
    ServiceSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secret = ServiceSecret::from_ref(state);

        let token = parts
            .headers
            .get(SERVICE_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingServiceToken)?;

        verify_service_token(token, &secret)
    }
}
