//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use crossroads_content::expedition::ExpeditionPack;
use crossroads_content::pack::DomainPack;
use crossroads_core::client::{DomainClient, HubClient};
use crossroads_core::error::DomainError;
use crossroads_core::ids::UserId;
use crossroads_core::item::LocationTag;
use crossroads_core::protocol::{
    ArriveRequest, ArriveResponse, DepartRequest, DroppedRequest, LoginResponse, RegisterRequest,
    RegisterResponse, TransferRequest,
};
use crossroads_core::rng::DeterministicRng;
use crossroads_hub::domain::aggregates::HubAuthority;
use crossroads_remote::ClientError;
use crossroads_test_support::MockRng;
use crossroads_world::domain::aggregates::WorldServer;
use http_body_util::BodyExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use crossroads_api::app;
use crossroads_api::state::{HubState, WorldState};

pub const HUB_URL: &str = "http://hub.test";
pub const WORLD_URL: &str = "http://world.test";

/// A `HubClient` and `DomainClient` that dispatches straight into an
/// in-process router instead of going over the network. The router is
/// attached after construction so the hub and the world can point at each
/// other.
#[derive(Default)]
pub struct Loopback {
    router: OnceLock<Router>,
}

impl Loopback {
    pub fn attach(&self, router: Router) {
        assert!(self.router.set(router).is_ok(), "loopback attached twice");
    }

    async fn call(&self, path: &str, content_type: &str, body: Vec<u8>) -> Result<Bytes, DomainError> {
        let router = self
            .router
            .get()
            .ok_or_else(|| DomainError::Remote("loopback not attached".to_owned()))?
            .clone();
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", content_type)
            .body(Body::from(body))
            .map_err(|e| DomainError::Remote(e.to_string()))?;
        let response = router
            .oneshot(request)
            .await
            .map_err(|e| DomainError::Remote(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| DomainError::Remote(e.to_string()))?
            .to_bytes();
        if status.is_success() {
            Ok(bytes)
        } else {
            let text = String::from_utf8_lossy(&bytes);
            Err(ClientError::from_body(status, &text).into())
        }
    }

    async fn call_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DomainError> {
        let body = serde_json::to_vec(body).map_err(|e| DomainError::Remote(e.to_string()))?;
        let bytes = self.call(path, "application/json", body).await?;
        serde_json::from_slice(&bytes).map_err(|e| DomainError::Remote(e.to_string()))
    }
}

#[async_trait]
impl HubClient for Loopback {
    async fn register(
        &self,
        _hub_url: &str,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, DomainError> {
        self.call_json("/register", request).await
    }

    async fn transfer(&self, _hub_url: &str, request: &TransferRequest) -> Result<(), DomainError> {
        let _: serde_json::Value = self.call_json("/transfer", request).await?;
        Ok(())
    }
}

#[async_trait]
impl DomainClient for Loopback {
    async fn connect_hub(&self, _domain_url: &str, hub_url: &str) -> Result<String, DomainError> {
        let bytes = self
            .call("/newhub", "text/plain", hub_url.as_bytes().to_vec())
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn arrive(
        &self,
        _domain_url: &str,
        request: &ArriveRequest,
    ) -> Result<ArriveResponse, DomainError> {
        self.call_json("/arrive", request).await
    }

    async fn depart(&self, _domain_url: &str, request: &DepartRequest) -> Result<(), DomainError> {
        let _: serde_json::Value = self.call_json("/depart", request).await?;
        Ok(())
    }

    async fn dropped(
        &self,
        _domain_url: &str,
        request: &DroppedRequest,
    ) -> Result<LocationTag, DomainError> {
        self.call_json("/dropped", request).await
    }
}

/// A hub and one domain server wired to each other in-process.
pub struct Crossroads {
    pub hub: Router,
    pub world: Router,
    pub hub_state: Arc<Mutex<HubAuthority>>,
    pub world_state: Arc<Mutex<WorldServer>>,
}

/// Build both routers with the built-in packs and a deterministic RNG.
pub fn build() -> Crossroads {
    let to_world = Arc::new(Loopback::default());
    let to_hub = Arc::new(Loopback::default());

    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
    let hub_state = HubState::new(
        HubAuthority::new(ExpeditionPack::builtin().unwrap()),
        rng,
        to_world.clone(),
        HUB_URL,
    );
    let world_state = WorldState::new(
        WorldServer::new(DomainPack::builtin().unwrap()),
        to_hub.clone(),
        WORLD_URL,
    );
    let hub_handle = hub_state.hub.clone();
    let world_handle = world_state.world.clone();

    let hub = app::hub_router(hub_state);
    let world = app::world_router(world_state);
    to_world.attach(world.clone());
    to_hub.attach(hub.clone());

    Crossroads {
        hub,
        world,
        hub_state: hub_handle,
        world_state: world_handle,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes)
}

/// Send a POST request with a plain-text body and return the text reply.
pub async fn post_text(app: &Router, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/plain")
        .body(Body::from(body.to_owned()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Send a POST request with a JSON body and return the raw reply text.
pub async fn post_json(app: &Router, uri: &str, body: &serde_json::Value) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Send a GET request and return the raw reply text.
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Register the world with the hub, enter play mode and log one user in.
pub async fn start_game(crossroads: &Crossroads) -> LoginResponse {
    let (status, text) = post_text(&crossroads.hub, "/domain", WORLD_URL).await;
    assert_eq!(status, StatusCode::OK, "{text}");
    let (status, text) = post_text(&crossroads.hub, "/mode", "play").await;
    assert_eq!(status, StatusCode::OK, "{text}");
    let (status, body) = get(&crossroads.hub, "/login").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    serde_json::from_str(&body).unwrap()
}

/// Run a player command on the world server.
pub async fn world_command(crossroads: &Crossroads, user: UserId, words: &[&str]) -> String {
    let (status, text) = post_json(
        &crossroads.world,
        "/command",
        &serde_json::json!({ "user": user, "command": words }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{text}");
    text
}

/// Run a hub-level command for a logged-in user.
pub async fn hub_command(crossroads: &Crossroads, login: &LoginResponse, words: &[&str]) -> String {
    let (status, text) = post_json(
        &crossroads.hub,
        "/command",
        &serde_json::json!({ "user": login.id, "secret": login.secret, "command": words }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{text}");
    text
}
