//! Persistence Gateway.
//!
//! The controllers never touch a storage driver directly. They receive an
//! `Arc<dyn PersistenceGateway>` at construction time and go through the
//! narrow set of operations below. Partial updates are expressed with the
//! explicit patch structs in this module rather than free-form field maps.
//!
//! No operation here spans more than one record, and callers do not wrap
//! multi-step sequences in transactions.

mod memory;
mod postgres;

pub use memory::{MemoryGateway, Operation};
pub use postgres::PgGateway;

use async_trait::async_trait;
use potluck_sdk::objects::{
    Dish, Event, EventStatus, Group, Household, Member, SwapRequest, SwapStatus,
};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored label could not be mapped back to its enum.
    #[error("corrupt record: {0}")]
    Corrupt(#[from] potluck_sdk::objects::UnknownLabel),

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Fields of an event that may be changed after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub host_id: Option<Uuid>,
    pub date: Option<OffsetDateTime>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<EventStatus>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.host_id.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }

    pub fn apply_to(&self, event: &mut Event) {
        if let Some(host_id) = self.host_id {
            event.host_id = host_id;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }
}

/// Resolution of a swap request. `target_member_id` is only written when
/// present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPatch {
    pub status: SwapStatus,
    pub target_member_id: Option<Uuid>,
}

impl SwapPatch {
    pub fn apply_to(&self, swap: &mut SwapRequest) {
        swap.status = self.status;
        if let Some(target) = self.target_member_id {
            swap.target_member_id = Some(target);
        }
    }
}

/// New bringer of a dish. `None` leaves the dish unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DishPatch {
    pub bringer_id: Option<Uuid>,
}

impl DishPatch {
    pub fn apply_to(&self, dish: &mut Dish) {
        dish.bringer_id = self.bringer_id;
    }
}

/// Storage operations used by the coordination core.
///
/// Lookups return `Ok(None)` for missing records; updates return the record
/// as stored after the update, or `Ok(None)` if it does not exist.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    // -- Events -------------------------------------------------------------

    async fn fetch_event(&self, id: Uuid) -> Result<Option<Event>, GatewayError>;
    async fn create_event(&self, event: &Event) -> Result<(), GatewayError>;
    async fn update_event(&self, id: Uuid, patch: &EventPatch)
    -> Result<Option<Event>, GatewayError>;
    /// Returns `false` if there was nothing to delete.
    async fn delete_event(&self, id: Uuid) -> Result<bool, GatewayError>;
    async fn fetch_completed_events_by_series(
        &self,
        recurrence_id: Uuid,
    ) -> Result<Vec<Event>, GatewayError>;
    /// The most recent event whose guest join code is `code`.
    async fn fetch_event_by_join_code(&self, code: &str) -> Result<Option<Event>, GatewayError>;
    /// Append `guest_id` to the guest list unless it is already on it.
    async fn add_guest(&self, event_id: Uuid, guest_id: Uuid)
    -> Result<Option<Event>, GatewayError>;

    // -- Groups, members, households -----------------------------------------

    async fn fetch_group(&self, id: Uuid) -> Result<Option<Group>, GatewayError>;
    async fn fetch_member(&self, id: Uuid) -> Result<Option<Member>, GatewayError>;
    /// Members of a group ordered by id.
    async fn fetch_members_by_group(&self, group_id: Uuid) -> Result<Vec<Member>, GatewayError>;
    async fn fetch_household(&self, id: Uuid) -> Result<Option<Household>, GatewayError>;

    // -- Swap requests ------------------------------------------------------

    async fn create_swap_request(&self, swap: &SwapRequest) -> Result<(), GatewayError>;
    async fn fetch_swap_request(&self, id: Uuid) -> Result<Option<SwapRequest>, GatewayError>;
    async fn update_swap_request(
        &self,
        id: Uuid,
        patch: &SwapPatch,
    ) -> Result<Option<SwapRequest>, GatewayError>;
    async fn list_swap_requests_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<SwapRequest>, GatewayError>;

    // -- Dishes -------------------------------------------------------------

    async fn create_dish(&self, dish: &Dish) -> Result<(), GatewayError>;
    async fn fetch_dish(&self, id: Uuid) -> Result<Option<Dish>, GatewayError>;
    async fn update_dish(&self, id: Uuid, patch: &DishPatch) -> Result<Option<Dish>, GatewayError>;
    async fn delete_dish(&self, id: Uuid) -> Result<bool, GatewayError>;
    async fn list_dishes_by_event(&self, event_id: Uuid) -> Result<Vec<Dish>, GatewayError>;
}
