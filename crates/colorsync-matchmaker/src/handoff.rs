//! Announcing a filled room to the game runtime.
//!
//! A one-way call: `POST {runtime}/game/start` carrying the room id, the two
//! players, and a service token in the `X-Service-Token` header. The runtime
//! refuses announcements without a valid token, which is what stops clients
//! from conjuring games for themselves.
//!
//! The announcement is fired from a detached task after the join response is
//! already on its way back to the player. A failure here is logged and *not*
//! rolled back — clients poll the runtime's status probe before connecting
//! and simply observe game-not-found.

use colorsync_auth::{issue_service_token, ServiceSecret, SERVICE_TOKEN_HEADER};
use colorsync_protocol::{PlayerId, RoomId};
use serde::Serialize;

/// Name under which the matchmaker identifies itself in service tokens.
const SERVICE_NAME: &str = "matchmaker";

/// How an announcement can fail. Only ever logged; the pairing stands.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("failed to sign service token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("game runtime unreachable: {0}")]
    Request(#[from] reqwest::Error),

    #[error("game runtime returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Tells the game runtime about a freshly paired room.
pub trait RuntimeNotifier: Send + Sync + 'static {
    fn announce(
        &self,
        room_id: &RoomId,
        players: &[PlayerId],
    ) -> impl std::future::Future<Output = Result<(), HandoffError>> + Send;
}

#[derive(Serialize)]
struct GameStartRequest<'a> {
    room_id: &'a RoomId,
    players: &'a [PlayerId],
}

/// [`RuntimeNotifier`] backed by the runtime's HTTP surface.
///
/// Holds the service key material and signs a fresh short-lived token per
/// announcement, so a long-running matchmaker never presents an expired
/// credential.
pub struct HttpRuntimeNotifier {
    client: reqwest::Client,
    base_url: String,
    secret: ServiceSecret,
}

impl HttpRuntimeNotifier {
    pub fn new(
        base_url: impl Into<String>,
        secret: ServiceSecret,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            secret,
        })
    }
}

impl RuntimeNotifier for HttpRuntimeNotifier {
    async fn announce(
        &self,
        room_id: &RoomId,
        players: &[PlayerId],
    ) -> Result<(), HandoffError> {
        let token = issue_service_token(SERVICE_NAME, &self.secret)?;
        let url = format!("{}/game/start", self.base_url);

        let resp = self
            .client
            .post(&url)
            .header(SERVICE_TOKEN_HEADER, token)
            .json(&GameStartRequest { room_id, players })
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(HandoffError::Status(resp.status()))
        }
    }
}
