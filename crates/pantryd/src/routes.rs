//! HTTP surface for the pantry daemon
//!
//! A small axum router through which a presentation layer invokes the
//! mutation operations. Handlers translate requests into engine calls and
//! engine errors into status codes; no inventory logic lives here.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use pantry_core::{Error, FrameSource, InventoryItem, MutationOutcome, PantryEngine};

/// Shared handler state
pub struct AppState {
    /// The inventory engine
    pub engine: Arc<PantryEngine>,

    /// Frame source, when photo capture is configured
    pub frames: Option<Arc<dyn FrameSource>>,
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/inventory", get(list_inventory))
        .route("/inventory/refresh", post(refresh_inventory))
        .route("/inventory/items", post(add_item))
        .route("/inventory/items/:name/increment", post(increment_item))
        .route("/inventory/items/:name/decrement", post(decrement_item))
        .route("/inventory/items/:name/photo", post(photo_item))
        .layer(Extension(state))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    /// Case-insensitive substring filter on the item name
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    name: String,
    #[serde(default)]
    image_url: Option<String>,
}

async fn healthz() -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

async fn list_inventory(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> axum::response::Response {
    let items = state.engine.search(&params.q).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "count": items.len(),
            "items": items.iter().map(item_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

async fn refresh_inventory(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Response {
    match state.engine.refresh().await {
        Ok(items) => (
            StatusCode::OK,
            Json(serde_json::json!({ "count": items.len() })),
        )
            .into_response(),
        Err(e) => error_to_response(e),
    }
}

async fn add_item(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<AddItemRequest>,
) -> axum::response::Response {
    match state.engine.add_item(&body.name, body.image_url).await {
        Ok(outcome) => outcome_response(&body.name, outcome),
        Err(e) => error_to_response(e),
    }
}

async fn increment_item(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match state.engine.increment_item(&name).await {
        Ok(outcome) => outcome_response(&name, outcome),
        Err(e) => error_to_response(e),
    }
}

async fn decrement_item(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match state.engine.remove_item(&name).await {
        Ok(outcome) => outcome_response(&name, outcome),
        Err(e) => error_to_response(e),
    }
}

async fn photo_item(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let Some(frames) = state.frames.as_ref() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "capture_disabled",
            "no frame source is configured",
        );
    };

    let frame = match frames.capture_frame().await {
        Ok(frame) => frame,
        Err(e) => return error_to_response(e),
    };

    match state.engine.add_item_with_photo(&name, frame).await {
        Ok(outcome) => outcome_response(&name, outcome),
        Err(e) => error_to_response(e),
    }
}

fn item_to_json(item: &InventoryItem) -> serde_json::Value {
    serde_json::json!({
        "name": item.name,
        "displayName": item.display_name(),
        "quantity": item.quantity,
        "imageUrl": item.image_url,
    })
}

fn outcome_response(name: &str, outcome: MutationOutcome) -> axum::response::Response {
    let (status, label, quantity) = match outcome {
        MutationOutcome::Created => (StatusCode::CREATED, "created", Some(1)),
        MutationOutcome::Incremented { quantity } => {
            (StatusCode::OK, "incremented", Some(quantity))
        }
        MutationOutcome::Decremented { quantity } => {
            (StatusCode::OK, "decremented", Some(quantity))
        }
        MutationOutcome::Deleted => (StatusCode::OK, "deleted", None),
        MutationOutcome::Noop => (StatusCode::OK, "noop", None),
    };

    (
        status,
        Json(serde_json::json!({
            "name": name,
            "outcome": label,
            "quantity": quantity,
        })),
    )
        .into_response()
}

/// Build a uniform JSON error body
fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(serde_json::json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map an engine error to a response
fn error_to_response(error: Error) -> axum::response::Response {
    match error {
        Error::InvalidInput(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_input", error.to_string())
        }
        Error::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", error.to_string()),
        Error::StoreUnavailable(_) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            error.to_string(),
        ),
        Error::UploadFailed(_) => {
            json_error(StatusCode::BAD_GATEWAY, "upload_failed", error.to_string())
        }
        Error::Capture(_) => {
            json_error(StatusCode::BAD_GATEWAY, "capture_failed", error.to_string())
        }
        other => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            other.to_string(),
        ),
    }
}
