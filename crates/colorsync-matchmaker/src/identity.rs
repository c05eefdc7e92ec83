//! Player-existence verification against the external identity service.
//!
//! The matchmaker never mints identities; before queueing a player it only
//! asks the identity service whether the id exists. The check is a trait so
//! tests can substitute a stub — production uses the HTTP implementation.

use std::time::Duration;

use colorsync_protocol::PlayerId;

/// Answers "does this player exist?".
///
/// Verification fails *closed*: any transport problem, timeout, or non-2xx
/// answer counts as "no". A queue that admits unverifiable players is worse
/// than one that makes a player retry.
pub trait IdentityVerifier: Send + Sync + 'static {
    fn verify(
        &self,
        player: &PlayerId,
    ) -> impl std::future::Future<Output = bool> + Send;
}

/// [`IdentityVerifier`] backed by `GET {base_url}/users/{id}`.
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityVerifier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, player: &PlayerId) -> bool {
        let url = format!("{}/users/{}", self.base_url, player);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(%player, "identity verified");
                true
            }
            Ok(resp) => {
                tracing::warn!(%player, status = %resp.status(), "identity lookup rejected player");
                false
            }
            Err(error) => {
                tracing::warn!(%player, %error, "identity service unreachable, failing closed");
                false
            }
        }
    }
}
