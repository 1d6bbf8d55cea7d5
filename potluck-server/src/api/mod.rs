//! HTTP and WebSocket API.
//!
//! # Endpoints
//!
//! - `POST   /events`                        – create an event
//! - `PATCH  /events/{event_id}`             – edit an event
//! - `DELETE /events/{event_id}?user_id=`    – delete an event
//! - `POST   /events/{event_id}/finish?admin_id=` – close and roll over
//! - `POST   /events/{event_id}/skip?admin_id=`   – postpone in place
//! - `GET    /events/stats/{event_id}`       – hosting statistics
//! - `GET    /events/code/{code}`            – event behind a guest join code
//! - `POST   /events/join-by-code`           – join as a guest
//! - `POST   /swaps`, `PATCH /swaps/{swap_id}`, `GET /swaps?event_id=`
//! - `POST   /dishes`, `GET /dishes?event_id=`
//! - `POST   /dishes/{dish_id}/pledge`, `POST /dishes/{dish_id}/unpledge`
//! - `DELETE /dishes/{dish_id}`
//! - `GET    /ws`                            – notification stream
//!
//! Caller identity travels in query parameters and bodies and is trusted as
//! given.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use potluck_core::error::CoordinationError;
use serde::Deserialize;
use uuid::Uuid;

use crate::state::AppState;

mod dishes;
mod events;
mod swaps;
mod ws;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(events::router())
        .merge(swaps::router())
        .merge(dishes::router())
        .merge(ws::router())
}

/// `?event_id=` on listing endpoints.
#[derive(Debug, Deserialize)]
struct EventQuery {
    event_id: Uuid,
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Controller failure as seen by an HTTP caller.
#[derive(Debug)]
struct ApiError(CoordinationError);

impl From<CoordinationError> for ApiError {
    fn from(e: CoordinationError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            CoordinationError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            CoordinationError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
            }
            CoordinationError::Unauthorized => {
                (StatusCode::FORBIDDEN, "not allowed to act on this event").into_response()
            }
            CoordinationError::EventFinished => {
                (StatusCode::FORBIDDEN, "event has already finished").into_response()
            }
            CoordinationError::Persistence(e) => {
                tracing::error!(error = %e, "API persistence error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            CoordinationError::Encode(e) => {
                tracing::error!(error = %e, "API notification encoding error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
