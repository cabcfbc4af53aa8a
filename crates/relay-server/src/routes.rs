//! HTTP routes

use crate::service::MoveService;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use relay_core::{Board, Move, RelayError, error_codes};
use relay_engine::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Body of `POST /ai-move`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub board: Board,
}

/// Error body returned with every failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// Failure mapped to an HTTP status and error body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn move_not_found() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: "Engine did not change any cell".to_string(),
                code: error_codes::MOVE_NOT_FOUND.to_string(),
            },
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        let status = match &err {
            RelayError::InvalidBoard(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                code: err.code().to_string(),
            },
        }
    }
}

/// Bodies that fail to deserialize (bad JSON, bad color, negative count,
/// missing `board`) are reported like any other invalid board
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        RelayError::InvalidBoard(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build the router for a move service
pub fn router<E: Engine>(service: MoveService<E>) -> Router {
    Router::new()
        .route("/ai-move", post(ai_move::<E>))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn ai_move<E: Engine>(
    State(service): State<MoveService<E>>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<Move>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected move request body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    match service.compute_move(request.board).await {
        Ok(Some(mv)) => Ok(Json(mv)),
        Ok(None) => {
            error!("Engine finished but no move could be located");
            Err(ApiError::move_not_found())
        }
        Err(e) => {
            error!("Move request failed: {}", e);
            Err(e.into())
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
