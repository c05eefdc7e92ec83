//! Shared authentication for the ColorSync services.
//!
//! Covers the two credential families of the system — user tokens presented
//! by clients, and service tokens exchanged between the matchmaker and the
//! game runtime — plus the axum extractors that gate protected routes.
//!
//! User *login* is owned by the external identity service; the services here
//! only ever verify.

mod error;
mod extract;
mod tokens;

pub use error::AuthError;
pub use extract::SERVICE_TOKEN_HEADER;
pub use tokens::{
    issue_service_token, issue_user_token, verify_service_token, verify_user_token, ServiceClaims,
    ServiceSecret, UserClaims, UserSecret,
};
