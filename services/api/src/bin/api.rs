//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{HttpBookingGateway, HttpChatGateway},
    config::Config,
    error::ApiError,
    web::{
        chat_handler, list_countries_handler, list_services_handler, rest::ApiDoc,
        state::AppState, ws_handler,
    },
};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use booking_core::ServiceCatalog;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting gateway...");

    // --- 2. Validate the Service Catalog ---
    // An inconsistent catalog is a build defect; refuse to start on one.
    let catalog = Arc::new(ServiceCatalog::load()?);
    info!(
        "Catalog validated: {} services, {} phone countries.",
        catalog.services().len(),
        catalog.countries().len()
    );

    // --- 3. Initialize the Backend Gateways ---
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let booking_gateway = Arc::new(HttpBookingGateway::new(
        http_client.clone(),
        &config.booking_api_base,
        catalog.clone(),
    ));
    let chat_gateway = Arc::new(HttpChatGateway::new(http_client, &config.chat_api_base));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        catalog,
        booking_gateway,
        chat_gateway,
    });

    // --- 5. CORS for the site UI ---
    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    let api_router = Router::new()
        .route("/chat", post(chat_handler))
        .route("/services", get(list_services_handler))
        .route("/countries", get(list_countries_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete
    // application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
