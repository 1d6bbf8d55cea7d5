//! Dish pledge endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
};
use kanau::processor::Processor;
use potluck_core::controllers::dishes::{
    AddDish, DeleteDish, ListDishes, PledgeDish, UnpledgeDish,
};
use potluck_sdk::objects::{NewDish, PledgeDish as PledgeBody};
use uuid::Uuid;

use super::{ApiError, EventQuery};
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/dishes", post(add_dish).get(list_dishes))
        .route("/dishes/{dish_id}", delete(delete_dish))
        .route("/dishes/{dish_id}/pledge", post(pledge_dish))
        .route("/dishes/{dish_id}/unpledge", post(unpledge_dish))
}

/// `POST /dishes`
async fn add_dish(
    State(state): State<AppState>,
    Json(dish): Json<NewDish>,
) -> Result<impl IntoResponse, ApiError> {
    let dish = state.dishes.process(AddDish { dish }).await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

/// `GET /dishes?event_id=`
async fn list_dishes(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let dishes = state
        .dishes
        .process(ListDishes {
            event_id: query.event_id,
        })
        .await?;
    Ok(Json(dishes))
}

/// `POST /dishes/{dish_id}/pledge`
async fn pledge_dish(
    State(state): State<AppState>,
    Path(dish_id): Path<Uuid>,
    Json(body): Json<PledgeBody>,
) -> Result<impl IntoResponse, ApiError> {
    let dish = state
        .dishes
        .process(PledgeDish {
            dish_id,
            member_id: body.member_id,
        })
        .await?;
    Ok(Json(dish))
}

/// `POST /dishes/{dish_id}/unpledge`
async fn unpledge_dish(
    State(state): State<AppState>,
    Path(dish_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let dish = state.dishes.process(UnpledgeDish { dish_id }).await?;
    Ok(Json(dish))
}

/// `DELETE /dishes/{dish_id}`
async fn delete_dish(
    State(state): State<AppState>,
    Path(dish_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.dishes.process(DeleteDish { dish_id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
