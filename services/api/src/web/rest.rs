//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use booking_core::GatewayError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        chat_handler,
        list_services_handler,
        list_countries_handler,
    ),
    components(
        schemas(ChatRequest, ChatResponse, ServicePayload, CountryPayload)
    ),
    tags(
        (name = "Booking Gateway API", description = "REST endpoints backing the studio's booking form and chat widget.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// One visitor message for the floating chat widget.
#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

/// The chat backend's reply.
#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
}

/// One bookable service with its ordered package list.
#[derive(Serialize, ToSchema)]
pub struct ServicePayload {
    pub name: String,
    pub packages: Vec<String>,
}

/// One entry of the phone-country list.
#[derive(Serialize, ToSchema)]
pub struct CountryPayload {
    pub name: String,
    pub iso: String,
    pub calling_code: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Forward one chat message to the chat backend and return its reply.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply from the chat backend", body = ChatResponse),
        (status = 400, description = "Empty message"),
        (status = 502, description = "Chat backend rejected the message or is unreachable")
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message must not be empty".to_string()));
    }

    match app_state.chat_gateway.send_message(&payload.message).await {
        Ok(reply) => Ok(Json(ChatResponse { reply })),
        Err(GatewayError::Rejected(detail)) => Err((StatusCode::BAD_GATEWAY, detail)),
        Err(e) => {
            error!("Chat backend call failed: {:?}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                "The chat assistant is unavailable right now.".to_string(),
            ))
        }
    }
}

/// List the bookable services and their packages, in display order.
#[utoipa::path(
    get,
    path = "/services",
    responses(
        (status = 200, description = "The service catalog", body = [ServicePayload])
    )
)]
pub async fn list_services_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<ServicePayload>> {
    let services = app_state
        .catalog
        .services()
        .iter()
        .map(|entry| ServicePayload {
            name: entry.name.to_string(),
            packages: entry.packages.iter().map(|p| p.to_string()).collect(),
        })
        .collect();
    Json(services)
}

/// List the phone countries the booking form offers.
#[utoipa::path(
    get,
    path = "/countries",
    responses(
        (status = 200, description = "The phone-country list", body = [CountryPayload])
    )
)]
pub async fn list_countries_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<CountryPayload>> {
    let countries = app_state
        .catalog
        .countries()
        .iter()
        .map(|country| CountryPayload {
            name: country.name.to_string(),
            iso: country.iso.to_string(),
            calling_code: country.calling_code.to_string(),
        })
        .collect();
    Json(countries)
}
