//! Routes for the Hub Authority.

use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use crossroads_core::command::Command;
use crossroads_core::error::DomainError;
use crossroads_core::ids::ItemId;
use crossroads_core::protocol::{
    HubCommandRequest, LoginResponse, OkResponse, QueryRequest, RegisterRequest,
    RegisterResponse, TransferRequest,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crossroads_hub::application::{command_handlers, query_handlers};
use crossroads_hub::domain::commands;

use crate::error::{ApiError, JsonBody};
use crate::state::HubState;

/// Plain-text bodies may arrive bare or as a JSON string.
pub(crate) fn text_body(body: &str) -> &str {
    body.trim().trim_matches('"').trim()
}

/// POST /register
#[instrument(skip(state, request), fields(url = %request.url))]
async fn register(
    State(state): State<HubState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let command = commands::RegisterDomain {
        correlation_id: Uuid::new_v4(),
        request,
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), "handling command");

    let response = command_handlers::handle_register_domain(&command, &state.hub, &*state.rng)?;
    Ok(Json(response))
}

/// GET /login
#[instrument(skip(state))]
async fn login(State(state): State<HubState>) -> Result<Json<LoginResponse>, ApiError> {
    let command = commands::LoginUser {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), "handling command");

    let response =
        command_handlers::handle_login(&command, &state.hub, &*state.rng, &*state.domains).await?;
    Ok(Json(response))
}

/// GET /mode
#[instrument(skip(state))]
async fn get_mode(State(state): State<HubState>) -> Result<String, ApiError> {
    Ok(query_handlers::current_mode(&state.hub)?.as_str().to_owned())
}

/// POST /mode
#[instrument(skip(state, body))]
async fn change_mode(State(state): State<HubState>, body: String) -> Result<String, ApiError> {
    let command = commands::ChangeMode {
        correlation_id: Uuid::new_v4(),
        requested: text_body(&body).to_owned(),
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), requested = %command.requested, "handling command");

    Ok(command_handlers::handle_change_mode(
        &command,
        &state.hub,
        &*state.rng,
    )?)
}

/// POST /command
#[instrument(skip(state, request), fields(user = %request.user))]
async fn user_command(
    State(state): State<HubState>,
    JsonBody(request): JsonBody<HubCommandRequest>,
) -> Result<String, ApiError> {
    let command = commands::RunUserCommand {
        correlation_id: Uuid::new_v4(),
        request,
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), "handling command");

    Ok(command_handlers::handle_user_command(&command, &state.hub, &*state.domains).await?)
}

/// POST /transfer
#[instrument(skip(state, request), fields(domain = %request.domain, item = %request.item))]
async fn transfer(
    State(state): State<HubState>,
    JsonBody(request): JsonBody<TransferRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let command = commands::TransferItem {
        correlation_id: Uuid::new_v4(),
        request,
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), "handling command");

    command_handlers::handle_transfer(&command, &state.hub)?;
    Ok(Json(OkResponse::new("Item transferred")))
}

/// POST /query
#[instrument(skip(state, request), fields(domain = %request.domain))]
async fn query(
    State(state): State<HubState>,
    JsonBody(request): JsonBody<QueryRequest>,
) -> Result<Json<Vec<ItemId>>, ApiError> {
    let query = commands::QueryItems {
        correlation_id: Uuid::new_v4(),
        request,
    };

    info!(correlation_id = %query.correlation_id(), command_type = query.command_type(), "handling query");

    Ok(Json(query_handlers::handle_query_items(&query, &state.hub)?))
}

/// POST /domain
#[instrument(skip(state, body))]
async fn connect_domain(State(state): State<HubState>, body: String) -> Result<String, ApiError> {
    let domain_url = text_body(&body).trim_end_matches('/');
    if domain_url.is_empty() {
        return Err(DomainError::Validation("domain URL is required".to_owned()).into());
    }
    let command = commands::ConnectDomain {
        correlation_id: Uuid::new_v4(),
        domain_url: domain_url.to_owned(),
        hub_url: state.public_url.to_string(),
    };

    info!(correlation_id = %command.correlation_id(), command_type = command.command_type(), domain_url = %command.domain_url, "handling command");

    Ok(command_handlers::handle_connect_domain(&command, &state.hub, &*state.domains).await?)
}

/// POST /newhub, which only makes sense on a domain server.
async fn misdirected_newhub() -> ApiError {
    ApiError(DomainError::Validation(
        "This is the hub; send /newhub to a domain server instead".to_owned(),
    ))
}

/// Returns the router for the hub.
pub fn router() -> Router<HubState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", get(login))
        .route("/mode", get(get_mode).post(change_mode))
        .route("/command", post(user_command))
        .route("/transfer", post(transfer))
        .route("/query", post(query))
        .route("/domain", post(connect_domain))
        .route("/newhub", post(misdirected_newhub))
}
