//! Swap request endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
};
use kanau::processor::Processor;
use potluck_core::controllers::swaps::{CreateSwapRequest, GetSwapRequests, UpdateSwapRequest};
use potluck_sdk::objects::{NewSwapRequest, SwapStatusUpdate};
use uuid::Uuid;

use super::{ApiError, EventQuery};
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/swaps", post(create_swap).get(list_swaps))
        .route("/swaps/{swap_id}", patch(update_swap))
}

/// `POST /swaps` – the request is stored as pending whatever status it
/// carries.
async fn create_swap(
    State(state): State<AppState>,
    Json(request): Json<NewSwapRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let swap = state.swaps.process(CreateSwapRequest { request }).await?;
    Ok((StatusCode::CREATED, Json(swap)))
}

/// `PATCH /swaps/{swap_id}`
async fn update_swap(
    State(state): State<AppState>,
    Path(swap_id): Path<Uuid>,
    Json(update): Json<SwapStatusUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let swap = state
        .swaps
        .process(UpdateSwapRequest { swap_id, update })
        .await?;
    Ok(Json(swap))
}

/// `GET /swaps?event_id=`
async fn list_swaps(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let swaps = state
        .swaps
        .process(GetSwapRequests {
            event_id: query.event_id,
        })
        .await?;
    Ok(Json(swaps))
}
