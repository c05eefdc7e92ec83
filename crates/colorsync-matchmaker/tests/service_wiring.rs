//! Wiring tests: the matchmaker binary path (`run`) against live stub
//! peers, over real sockets.
//!
//! Where `matchmaking.rs` exercises the router with in-process stubs, these
//! tests run the production `HttpIdentityVerifier` and `HttpRuntimeNotifier`
//! against small axum servers standing in for the identity service and the
//! game runtime — so URL formats, headers, and the service token are checked
//! end to end.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use colorsync_auth::{
    issue_user_token, verify_service_token, ServiceSecret, UserSecret, SERVICE_TOKEN_HEADER,
};
use colorsync_matchmaker::{run, MatchmakerConfig};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const USER_SECRET: &str = "wiring-user-secret";
const SERVICE_SECRET: &str = "wiring-service-secret";

/// Stub identity service: `GET /users/:id` answers 200 for a fixed roster.
async fn spawn_identity_stub(known: &'static [&'static str]) -> SocketAddr {
    async fn get_user(
        State(known): State<&'static [&'static str]>,
        Path(id): Path<String>,
    ) -> StatusCode {
        if known.contains(&id.as_str()) {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        }
    }

    let app = Router::new()
        .route("/users/:id", get(get_user))
        .with_state(known);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Stub game runtime: records each `/game/start` body after checking the
/// service token the way the real runtime would.
async fn spawn_runtime_stub(
    announcements: mpsc::UnboundedSender<serde_json::Value>,
) -> SocketAddr {
    async fn start_game(
        State(tx): State<mpsc::UnboundedSender<serde_json::Value>>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let token = headers
            .get(SERVICE_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let secret = ServiceSecret(SERVICE_SECRET.into());
        match verify_service_token(token, &secret) {
            Ok(claims) if claims.service_name == "matchmaker" => {
                let _ = tx.send(body);
                StatusCode::OK
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    let app = Router::new()
        .route("/game/start", post(start_game))
        .with_state(announcements);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_matchmaker(identity: SocketAddr, runtime: SocketAddr) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = MatchmakerConfig {
        identity_url: format!("http://{identity}"),
        runtime_url: format!("http://{runtime}"),
        identity_timeout: Duration::from_secs(2),
        announce_timeout: Duration::from_secs(2),
        user_secret: UserSecret(USER_SECRET.into()),
        service_secret: ServiceSecret(SERVICE_SECRET.into()),
    };
    tokio::spawn(async move {
        run(listener, config).await.unwrap();
    });
    addr
}

fn bearer(user_id: &str) -> String {
    let token = issue_user_token(user_id, user_id, &UserSecret(USER_SECRET.into())).unwrap();
    format!("Bearer {token}")
}

async fn join(addr: SocketAddr, user: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/join"))
        .header("Authorization", bearer(user))
        .json(&json!({ "user_id": user }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_pairing_announces_to_runtime_with_valid_service_token() {
    let identity = spawn_identity_stub(&["alice", "bob"]).await;
    let (tx, mut announcements) = mpsc::unbounded_channel();
    let runtime = spawn_runtime_stub(tx).await;
    let addr = spawn_matchmaker(identity, runtime).await;

    let first = join(addr, "alice").await;
    assert_eq!(first.status().as_u16(), 200);
    let first: serde_json::Value = first.json().await.unwrap();
    assert_eq!(first["status"], "waiting");

    let second = join(addr, "bob").await;
    assert_eq!(second.status().as_u16(), 200);
    let second: serde_json::Value = second.json().await.unwrap();
    assert_eq!(second["status"], "full");

    // The stub only records bodies whose service token verified, so
    // receiving the announcement proves the credential path end to end.
    let body = tokio::time::timeout(Duration::from_secs(5), announcements.recv())
        .await
        .expect("announcement should arrive")
        .expect("stub channel open");
    assert_eq!(body["room_id"], second["room_id"]);
    assert_eq!(body["players"], json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_identity_rejection_travels_back_as_not_found() {
    let identity = spawn_identity_stub(&["alice"]).await;
    let (tx, _announcements) = mpsc::unbounded_channel();
    let runtime = spawn_runtime_stub(tx).await;
    let addr = spawn_matchmaker(identity, runtime).await;

    let resp = join(addr, "ghost").await;

    assert_eq!(resp.status().as_u16(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_unreachable_identity_service_fails_closed() {
    // Bind-then-drop gives an address nothing is listening on.
    let dead = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let (tx, _announcements) = mpsc::unbounded_channel();
    let runtime = spawn_runtime_stub(tx).await;
    let addr = spawn_matchmaker(dead, runtime).await;

    let resp = join(addr, "alice").await;

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn test_failed_announcement_does_not_undo_the_pairing() {
    let identity = spawn_identity_stub(&["alice", "bob"]).await;
    // Runtime address with no listener: the announcement will fail.
    let dead = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let addr = spawn_matchmaker(identity, dead).await;

    join(addr, "alice").await;
    let second = join(addr, "bob").await;
    assert_eq!(second.status().as_u16(), 200);
    let second: serde_json::Value = second.json().await.unwrap();
    assert_eq!(second["status"], "full");
    let room_id = second["room_id"].as_str().unwrap();

    // The room is still full and queryable; clients would retry against
    // the runtime's status probe on their own.
    let room: serde_json::Value = reqwest::Client::new()
        .get(format!("http://{addr}/rooms/{room_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(room["status"], "full");
    assert_eq!(room["players"], json!(["alice", "bob"]));
}
