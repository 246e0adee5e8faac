//! Routes for a domain server.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use crossroads_core::command::Command;
use crossroads_core::item::LocationTag;
use crossroads_core::protocol::{
    ArriveRequest, ArriveResponse, DepartRequest, DomainCommandRequest, DroppedRequest,
    OkResponse,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crossroads_world::application::command_handlers;
use crossroads_world::domain::commands;

use super::hub::text_body;
use crate::error::{ApiError, JsonBody};
use crate::state::WorldState;

/// POST /newhub
#[instrument(skip(state, body))]
async fn connect_hub(State(state): State<WorldState>, body: String) -> Result<String, ApiError> {
    let command = commands::ConnectHub {
        correlation_id: Uuid::new_v4(),
        hub_url: text_body(&body).to_owned(),
        public_url: state.public_url.to_string(),
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), hub_url = %command.hub_url, "handling command");

    Ok(command_handlers::handle_connect_hub(&command, &state.world, &*state.hub).await?)
}

/// POST /arrive
#[instrument(skip(state, request), fields(user = %request.user))]
async fn arrive(
    State(state): State<WorldState>,
    JsonBody(request): JsonBody<ArriveRequest>,
) -> Result<Json<ArriveResponse>, ApiError> {
    let command = commands::ArriveUser {
        correlation_id: Uuid::new_v4(),
        request,
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), "handling command");

    Ok(Json(command_handlers::handle_arrive(&command, &state.world)?))
}

/// POST /depart
#[instrument(skip(state, request), fields(user = %request.user))]
async fn depart(
    State(state): State<WorldState>,
    JsonBody(request): JsonBody<DepartRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let command = commands::DepartUser {
        correlation_id: Uuid::new_v4(),
        request,
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), "handling command");

    command_handlers::handle_depart(&command, &state.world)?;
    Ok(Json(OkResponse::new("User departed")))
}

/// POST /dropped
#[instrument(skip(state, request), fields(user = %request.user, item = %request.item.id))]
async fn dropped(
    State(state): State<WorldState>,
    JsonBody(request): JsonBody<DroppedRequest>,
) -> Result<Json<LocationTag>, ApiError> {
    let command = commands::DropItem {
        correlation_id: Uuid::new_v4(),
        request,
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), "handling command");

    Ok(Json(command_handlers::handle_dropped(&command, &state.world)?))
}

/// POST /command
#[instrument(skip(state, request), fields(user = %request.user))]
async fn run_command(
    State(state): State<WorldState>,
    JsonBody(request): JsonBody<DomainCommandRequest>,
) -> Result<String, ApiError> {
    let command = commands::RunCommand {
        correlation_id: Uuid::new_v4(),
        request,
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), "handling command");

    Ok(command_handlers::handle_command(&command, &state.world, &*state.hub).await?)
}

/// Returns the router for a domain server.
pub fn router() -> Router<WorldState> {
    Router::new()
        .route("/newhub", post(connect_hub))
        .route("/arrive", post(arrive))
        .route("/depart", post(depart))
        .route("/dropped", post(dropped))
        .route("/command", post(run_command))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use crossroads_content::pack::DomainPack;
    use crossroads_core::ids::{DomainId, ItemId};
    use crossroads_core::protocol::RegisterResponse;
    use crossroads_core::secret::Secret;
    use crossroads_test_support::{FailingHubClient, RecordingHubClient};
    use crossroads_world::domain::aggregates::WorldServer;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn hub() -> Arc<RecordingHubClient> {
        Arc::new(RecordingHubClient::new(RegisterResponse {
            id: DomainId(1),
            items: vec![ItemId(20), ItemId(21)],
            secret: Secret::new("world-secret"),
        }))
    }

    fn app(hub: Arc<dyn crossroads_core::client::HubClient>) -> Router {
        let world = WorldServer::new(DomainPack::builtin().unwrap());
        router().with_state(WorldState::new(world, hub, "http://world.test"))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, String) {
        send(app, "POST", uri, Body::from(body.to_string())).await
    }

    fn arrival() -> Value {
        json!({
            "secret": "world-secret", "user": 0,
            "owned": [], "carried": [], "dropped": [], "prize": []
        })
    }

    #[tokio::test]
    async fn test_newhub_registers_and_answers_text() {
        // Arrange
        let hub = hub();
        let app = app(hub.clone());

        // Act
        let (status, body) = send(&app, "POST", "/newhub", Body::from("http://hub.test/")).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Domain registered successfully");
        let registrations = hub.registrations();
        assert_eq!(registrations[0].0, "http://hub.test");
        assert_eq!(registrations[0].1.url, "http://world.test");
    }

    #[tokio::test]
    async fn test_newhub_failure_is_reported() {
        let app = app(Arc::new(FailingHubClient));

        let (status, body) = send(&app, "POST", "/newhub", Body::from("http://hub.test")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "remote_call_failed");
    }

    #[tokio::test]
    async fn test_arrive_before_registration_is_forbidden() {
        let app = app(hub());

        let (status, _) = post_json(&app, "/arrive", &arrival()).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_arrive_then_command() {
        // Arrange
        let app = app(hub());
        send(&app, "POST", "/newhub", Body::from("http://hub.test")).await;

        // Act
        let (arrive_status, arrive_body) = post_json(&app, "/arrive", &arrival()).await;
        let (status, text) =
            post_json(&app, "/command", &json!({ "user": 0, "command": ["look"] })).await;

        // Assert
        assert_eq!(arrive_status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&arrive_body).unwrap(),
            json!({ "unused_items_depth": [] })
        );
        assert_eq!(status, StatusCode::OK);
        assert!(text.ends_with("There is a paper <sub>20</sub> here."));
    }

    #[tokio::test]
    async fn test_command_for_unknown_user_is_a_text_reply() {
        let app = app(hub());

        let (status, text) =
            post_json(&app, "/command", &json!({ "user": 5, "command": ["look"] })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            text,
            "You have to journey to this domain before you can send it commands."
        );
    }

    #[tokio::test]
    async fn test_depart_unknown_user_is_not_found() {
        let app = app(hub());

        let (status, _) = post_json(&app, "/depart", &json!({ "user": 5 })).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dropped_returns_room_tag() {
        // Arrange
        let app = app(hub());
        send(&app, "POST", "/newhub", Body::from("http://hub.test")).await;
        let mut arrival = arrival();
        arrival["carried"] = json!([{ "id": 900, "name": "axe", "description": "An axe.", "verb": {} }]);
        post_json(&app, "/arrive", &arrival).await;

        // Act
        let (status, body) = post_json(
            &app,
            "/dropped",
            &json!({
                "secret": "world-secret", "user": 0,
                "item": { "id": 900, "name": "axe", "description": "An axe.", "verb": {} }
            }),
        )
        .await;
        let (_, look) =
            post_json(&app, "/command", &json!({ "user": 0, "command": ["look"] })).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!("foyer"));
        assert!(look.contains("There is a axe <sub>900</sub> here."));
    }
}
