//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{error, info};

use crate::engine::EngineError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/departures", get(departures))
        .route("/watch", post(add_watches))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The most recent board. Unavailable until the first broadcast completes.
async fn departures(State(state): State<AppState>) -> Result<Json<BoardResponse>, AppError> {
    let board = state.engine.latest().ok_or(AppError::Loading)?;
    let mode = state.engine.config().time_display;
    Ok(Json(BoardResponse::from_board(&board, mode)))
}

/// Register more watches and broadcast straight away.
async fn add_watches(
    State(state): State<AppState>,
    Json(req): Json<WatchRequest>,
) -> Result<Json<WatchResponse>, AppError> {
    if req.queries.is_empty() {
        return Err(AppError::BadRequest {
            message: "at least one query is required".into(),
        });
    }

    info!(queries = req.queries.len(), "watch request");
    let watches = state.engine.register(req.queries).await?;
    let board = state.engine.broadcast_now().await?;

    Ok(Json(WatchResponse {
        watches,
        departures: board.departures.len(),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Loading,
    Internal { message: String },
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Loading => (
                StatusCode::SERVICE_UNAVAILABLE,
                "loading: no board has been broadcast yet".to_string(),
            ),
            AppError::Internal { message } => {
                error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
