//! Event lifecycle endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use kanau::processor::Processor;
use potluck_core::controllers::events::{
    CreateEvent, DeleteEvent, FinishEvent, GetEventByCode, GetEventStats, JoinEventByCode,
    SkipEvent, UpdateEvent,
};
use potluck_sdk::objects::{EventUpdate, JoinEvent, NewEvent};
use serde::Deserialize;
use uuid::Uuid;

use super::ApiError;
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event))
        .route(
            "/events/{event_id}",
            patch(update_event).delete(delete_event),
        )
        .route("/events/{event_id}/finish", post(finish_event))
        .route("/events/{event_id}/skip", post(skip_event))
        .route("/events/stats/{event_id}", get(event_stats))
        .route("/events/code/{code}", get(event_by_code))
        .route("/events/join-by-code", post(join_event))
}

#[derive(Debug, Deserialize)]
struct AdminQuery {
    admin_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

/// `POST /events`
async fn create_event(
    State(state): State<AppState>,
    Json(event): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.events.process(CreateEvent { event }).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `PATCH /events/{event_id}`
async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(update): Json<EventUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .events
        .process(UpdateEvent { event_id, update })
        .await?;
    Ok(Json(event))
}

/// `DELETE /events/{event_id}?user_id=`
async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .events
        .process(DeleteEvent {
            event_id,
            requester_id: query.user_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /events/{event_id}/finish?admin_id=` – responds with the next
/// occurrence.
async fn finish_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<AdminQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let next = state
        .events
        .process(FinishEvent {
            event_id,
            requester_id: query.admin_id,
        })
        .await?;
    Ok(Json(next))
}

/// `POST /events/{event_id}/skip?admin_id=`
async fn skip_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<AdminQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .events
        .process(SkipEvent {
            event_id,
            requester_id: query.admin_id,
        })
        .await?;
    Ok(Json(event))
}

/// `GET /events/stats/{event_id}`
async fn event_stats(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.events.process(GetEventStats { event_id }).await?;
    Ok(Json(stats))
}

/// `GET /events/code/{code}`
async fn event_by_code(
    State(state): State<AppState>,
    Path(join_code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invite = state.events.process(GetEventByCode { join_code }).await?;
    Ok(Json(invite))
}

/// `POST /events/join-by-code` – responds with the event including the new
/// guest.
async fn join_event(
    State(state): State<AppState>,
    Json(join): Json<JoinEvent>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .events
        .process(JoinEventByCode {
            join_code: join.join_code,
            member_id: join.member_id,
        })
        .await?;
    Ok(Json(event))
}
