// Client Pulse - Web Server
// REST API with Axum over the flat-file JSON store

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use client_pulse::{
    client_journey, compute_metrics, error_message, validate_client, validate_interaction,
    Client, Interaction, JsonStore, Metrics, NewClient, NewInteraction, DEFAULT_DATA_FILE,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<JsonStore>>,
}

/// Error body matching the original API: {"error": "..."}
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn internal_error(context: &str, e: anyhow::Error) -> axum::response::Response {
    error!("{}: {}", context, e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Internal server error: {}", context),
    )
}

fn bad_json(rejection: JsonRejection) -> axum::response::Response {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}

// ============================================================================
// Client Handlers
// ============================================================================

/// GET /api/clients - All clients as a raw JSON array
async fn get_clients(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().unwrap();
    let clients: Vec<Client> = store.clients().to_vec();
    Json(clients)
}

/// POST /api/clients - Create a client
async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> axum::response::Response {
    let Json(new) = match payload {
        Ok(json) => json,
        Err(rejection) => return bad_json(rejection),
    };

    if let Err(errors) = validate_client(&new) {
        return error_response(StatusCode::BAD_REQUEST, error_message(&errors));
    }

    let mut store = state.store.lock().unwrap();
    match store.add_client(new) {
        Ok(client) => (StatusCode::CREATED, Json(client)).into_response(),
        Err(e) => internal_error("creating client", e),
    }
}

/// PUT /api/clients/:id - Replace a client's fields
async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> axum::response::Response {
    let Json(new) = match payload {
        Ok(json) => json,
        Err(rejection) => return bad_json(rejection),
    };

    if let Err(errors) = validate_client(&new) {
        return error_response(StatusCode::BAD_REQUEST, error_message(&errors));
    }

    let mut store = state.store.lock().unwrap();
    match store.update_client(id, new) {
        Ok(Some(client)) => Json(client).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Client not found"),
        Err(e) => internal_error("updating client", e),
    }
}

/// DELETE /api/clients/:id
async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let mut store = state.store.lock().unwrap();
    match store.delete_client(id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Client not found"),
        Err(e) => internal_error("deleting client", e),
    }
}

/// GET /api/clients/:id/journey - One client's interactions, oldest first
async fn get_client_journey(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let store = state.store.lock().unwrap();
    match store.find_client(id) {
        Some(client) => {
            let journey: Vec<Interaction> = client_journey(client, store.interactions());
            Json(journey).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "Client not found"),
    }
}

// ============================================================================
// Interaction Handlers
// ============================================================================

/// GET /api/interactions - All interactions as a raw JSON array
async fn get_interactions(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().unwrap();
    let interactions: Vec<Interaction> = store.interactions().to_vec();
    Json(interactions)
}

/// POST /api/interactions - Log an interaction
async fn create_interaction(
    State(state): State<AppState>,
    payload: Result<Json<NewInteraction>, JsonRejection>,
) -> axum::response::Response {
    let Json(new) = match payload {
        Ok(json) => json,
        Err(rejection) => return bad_json(rejection),
    };

    if let Err(errors) = validate_interaction(&new) {
        return error_response(StatusCode::BAD_REQUEST, error_message(&errors));
    }

    let mut store = state.store.lock().unwrap();
    match store.add_interaction(new) {
        Ok(interaction) => (StatusCode::CREATED, Json(interaction)).into_response(),
        Err(e) => internal_error("creating interaction", e),
    }
}

/// PUT /api/interactions/:id
async fn update_interaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<NewInteraction>, JsonRejection>,
) -> axum::response::Response {
    let Json(new) = match payload {
        Ok(json) => json,
        Err(rejection) => return bad_json(rejection),
    };

    if let Err(errors) = validate_interaction(&new) {
        return error_response(StatusCode::BAD_REQUEST, error_message(&errors));
    }

    let mut store = state.store.lock().unwrap();
    match store.update_interaction(id, new) {
        Ok(Some(interaction)) => Json(interaction).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Interaction not found"),
        Err(e) => internal_error("updating interaction", e),
    }
}

/// DELETE /api/interactions/:id
async fn delete_interaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let mut store = state.store.lock().unwrap();
    match store.delete_interaction(id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Interaction not found"),
        Err(e) => internal_error("deleting interaction", e),
    }
}

// ============================================================================
// Metrics & Health
// ============================================================================

/// GET /api/metrics - Dashboard metrics computed server-side
async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().unwrap();
    let metrics: Metrics = compute_metrics(store.clients(), store.interactions());
    Json(metrics)
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "version": client_pulse::VERSION }))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let data_path =
        std::env::var("PULSE_DATA_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string());

    let store = JsonStore::open(&data_path).expect("Failed to open data file");
    info!(
        "data file opened: {} ({} clients, {} interactions)",
        data_path,
        store.clients().len(),
        store.interactions().len()
    );

    // Create shared state
    let state = AppState {
        store: Arc::new(Mutex::new(store)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/clients", get(get_clients).post(create_client))
        .route(
            "/clients/:id",
            axum::routing::put(update_client).delete(delete_client),
        )
        .route("/clients/:id/journey", get(get_client_journey))
        .route(
            "/interactions",
            get(get_interactions).post(create_interaction),
        )
        .route(
            "/interactions/:id",
            axum::routing::put(update_interaction).delete(delete_interaction),
        )
        .route("/metrics", get(get_metrics))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3001";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    info!("server running on http://localhost:3001/api");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
