//! Event Lifecycle controller: scheduling, recurrence and host rotation.

use std::sync::Arc;

use itertools::Itertools;
use kanau::processor::Processor;
use potluck_sdk::objects::{
    Event, EventInvite, EventRef, EventStats, EventStatus, EventUpdate, HostStat, NewEvent,
    Notification,
};
use time::{Duration, OffsetDateTime};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{household_address, member_name, role_of};
use crate::error::CoordinationError;
use crate::gateway::{EventPatch, PersistenceGateway};
use crate::hub::Hub;
use crate::utils::join_code;
use crate::utils::recurrence::Offset;
use crate::utils::rotation::{carry_over_location, next_host};

const UNKNOWN_HOST_NAME: &str = "Unknown";

/// How long past its date an event still accepts guests.
const JOIN_GRACE: Duration = Duration::days(1);

pub struct EventLifecycle {
    gateway: Arc<dyn PersistenceGateway>,
    hub: Hub,
}

impl EventLifecycle {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, hub: Hub) -> Self {
        Self { gateway, hub }
    }

    async fn fetch_event(&self, event_id: Uuid) -> Result<Event, CoordinationError> {
        self.gateway
            .fetch_event(event_id)
            .await?
            .ok_or(CoordinationError::NotFound("event"))
    }

    /// Load a recurring event the requester may finish or skip.
    async fn fetch_advanceable(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Event, CoordinationError> {
        let event = self.fetch_event(event_id).await?;
        let role = role_of(self.gateway.as_ref(), &event, requester_id).await?;
        if !role.may_advance() {
            return Err(CoordinationError::Unauthorized);
        }
        if !event.is_recurring() {
            return Err(CoordinationError::validation("event is not recurring"));
        }
        if event.status == EventStatus::Completed {
            return Err(CoordinationError::validation("event is already completed"));
        }
        Ok(event)
    }

    /// Load the event a guest join code belongs to, if it still takes
    /// guests.
    async fn fetch_joinable(&self, code: &str) -> Result<Event, CoordinationError> {
        if code.is_empty() {
            return Err(CoordinationError::validation("join code is required"));
        }
        let event = self
            .gateway
            .fetch_event_by_join_code(code)
            .await?
            .ok_or(CoordinationError::NotFound("event"))?;
        if event.status == EventStatus::Completed
            || event.date < OffsetDateTime::now_utc() - JOIN_GRACE
        {
            return Err(CoordinationError::EventFinished);
        }
        Ok(event)
    }
}

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

/// Close the current occurrence of a series and schedule the next one with
/// the next host in rotation. Returns the new occurrence.
#[derive(Debug, Clone, Copy)]
pub struct FinishEvent {
    pub event_id: Uuid,
    pub requester_id: Uuid,
}

impl Processor<FinishEvent> for EventLifecycle {
    type Output = Event;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "FinishEvent", fields(event_id = %cmd.event_id))]
    async fn process(&self, cmd: FinishEvent) -> Result<Event, CoordinationError> {
        let event = self
            .fetch_advanceable(cmd.event_id, cmd.requester_id)
            .await?;

        let date = Offset::finish(&event.recurrence)
            .apply(event.date)
            .ok_or_else(|| CoordinationError::validation("next occurrence is out of range"))?;

        let mut next = Event {
            id: Uuid::new_v4(),
            date,
            guest_ids: Vec::new(),
            guest_join_code: join_code::generate(),
            status: EventStatus::Scheduled,
            ..event.clone()
        };

        let mut members = self.gateway.fetch_members_by_group(event.group_id).await?;
        members.sort_by_key(|m| m.id);
        if let Some(host_id) = next_host(&members, event.host_id) {
            let old_address = household_address(self.gateway.as_ref(), event.host_id).await?;
            let new_address = household_address(self.gateway.as_ref(), host_id).await?;
            next.host_id = host_id;
            if let Some(location) = carry_over_location(&next.location, &old_address, &new_address)
            {
                next.location = location;
            }
        } else {
            warn!(group_id = %event.group_id, "Group has no members, host not rotated");
        }

        self.gateway.create_event(&next).await?;
        info!(
            next_event_id = %next.id,
            host_id = %next.host_id,
            date = %next.date,
            "Scheduled next occurrence"
        );

        let completed = self
            .gateway
            .update_event(
                event.id,
                &EventPatch {
                    status: Some(EventStatus::Completed),
                    ..Default::default()
                },
            )
            .await;
        self.hub.notify(&Notification::EventCreated(next.clone()))?;

        if let Err(e) = completed {
            error!(
                error = %e,
                next_event_id = %next.id,
                "Failed to mark event completed after scheduling the next occurrence"
            );
            return Err(e.into());
        }

        self.hub.notify(&Notification::EventDeleted(EventRef {
            event_id: event.id,
            group_id: event.group_id,
        }))?;
        Ok(next)
    }
}

/// Push a recurring event back by one weekly cadence without rotating the
/// host. Returns the event as it now stands.
#[derive(Debug, Clone, Copy)]
pub struct SkipEvent {
    pub event_id: Uuid,
    pub requester_id: Uuid,
}

impl Processor<SkipEvent> for EventLifecycle {
    type Output = Event;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "SkipEvent", fields(event_id = %cmd.event_id))]
    async fn process(&self, cmd: SkipEvent) -> Result<Event, CoordinationError> {
        let event = self
            .fetch_advanceable(cmd.event_id, cmd.requester_id)
            .await?;

        let offset = Offset::skip(&event.recurrence);
        let event = if offset.is_zero() {
            event
        } else {
            let date = offset
                .apply(event.date)
                .ok_or_else(|| CoordinationError::validation("skipped date is out of range"))?;
            self.gateway
                .update_event(
                    event.id,
                    &EventPatch {
                        date: Some(date),
                        ..Default::default()
                    },
                )
                .await?
                .ok_or(CoordinationError::NotFound("event"))?
        };

        self.hub.notify(&Notification::EventUpdated(event.clone()))?;
        Ok(event)
    }
}

/// Hosting history of the series an event belongs to. One-off events yield
/// empty stats.
#[derive(Debug, Clone, Copy)]
pub struct GetEventStats {
    pub event_id: Uuid,
}

impl Processor<GetEventStats> for EventLifecycle {
    type Output = EventStats;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "GetEventStats")]
    async fn process(&self, query: GetEventStats) -> Result<EventStats, CoordinationError> {
        let event = self.fetch_event(query.event_id).await?;
        let Some(series) = event.recurrence_id else {
            return Ok(EventStats::default());
        };

        let completed = self
            .gateway
            .fetch_completed_events_by_series(series)
            .await?;

        let mut host_counts = Vec::new();
        for (member_id, count) in completed.iter().map(|e| e.host_id).counts() {
            let member_name = member_name(self.gateway.as_ref(), member_id)
                .await?
                .unwrap_or_else(|| UNKNOWN_HOST_NAME.to_string());
            host_counts.push(HostStat {
                member_id,
                member_name,
                count,
            });
        }
        host_counts.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(EventStats {
            total_occurrences: completed.len(),
            host_counts,
        })
    }
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub event: NewEvent,
}

impl Processor<CreateEvent> for EventLifecycle {
    type Output = Event;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "CreateEvent")]
    async fn process(&self, cmd: CreateEvent) -> Result<Event, CoordinationError> {
        let NewEvent {
            group_id,
            name,
            date,
            event_type,
            host_id,
            location,
            description,
            recurrence,
        } = cmd.event;

        let mut event = Event {
            id: Uuid::new_v4(),
            group_id,
            name,
            date,
            event_type,
            host_id,
            location,
            description,
            recurrence_id: (!recurrence.is_empty()).then(Uuid::new_v4),
            recurrence,
            guest_ids: Vec::new(),
            guest_join_code: join_code::generate(),
            status: EventStatus::Scheduled,
        };

        if event.location.is_empty() {
            event.location = household_address(self.gateway.as_ref(), host_id).await?;
        }

        self.gateway.create_event(&event).await?;
        info!(event_id = %event.id, group_id = %event.group_id, "Event created");
        self.hub.notify(&Notification::EventCreated(event.clone()))?;
        Ok(event)
    }
}

/// Host-only edit of date, location and description. Empty values are
/// ignored; nothing is written or broadcast when no field changes.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub event_id: Uuid,
    pub update: EventUpdate,
}

impl Processor<UpdateEvent> for EventLifecycle {
    type Output = Event;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "UpdateEvent", fields(event_id = %cmd.event_id))]
    async fn process(&self, cmd: UpdateEvent) -> Result<Event, CoordinationError> {
        let event = self.fetch_event(cmd.event_id).await?;
        if cmd.update.user_id != event.host_id {
            return Err(CoordinationError::Unauthorized);
        }

        let patch = EventPatch {
            date: cmd.update.date,
            location: cmd.update.location.filter(|s| !s.is_empty()),
            description: cmd.update.description.filter(|s| !s.is_empty()),
            ..Default::default()
        };
        if patch.is_empty() {
            return Ok(event);
        }

        let event = self
            .gateway
            .update_event(event.id, &patch)
            .await?
            .ok_or(CoordinationError::NotFound("event"))?;
        self.hub.notify(&Notification::EventUpdated(event.clone()))?;
        Ok(event)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteEvent {
    pub event_id: Uuid,
    pub requester_id: Uuid,
}

impl Processor<DeleteEvent> for EventLifecycle {
    type Output = ();
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "DeleteEvent", fields(event_id = %cmd.event_id))]
    async fn process(&self, cmd: DeleteEvent) -> Result<(), CoordinationError> {
        let event = self.fetch_event(cmd.event_id).await?;
        let role = role_of(self.gateway.as_ref(), &event, cmd.requester_id).await?;
        if !role.may_delete(&event) {
            return Err(CoordinationError::Unauthorized);
        }

        if !self.gateway.delete_event(event.id).await? {
            return Err(CoordinationError::NotFound("event"));
        }
        info!(event_id = %event.id, "Event deleted");
        self.hub.notify(&Notification::EventDeleted(EventRef {
            event_id: event.id,
            group_id: event.group_id,
        }))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Guests
// ---------------------------------------------------------------------------

/// Look up an event by its guest join code.
#[derive(Debug, Clone)]
pub struct GetEventByCode {
    pub join_code: String,
}

impl Processor<GetEventByCode> for EventLifecycle {
    type Output = EventInvite;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "GetEventByCode")]
    async fn process(&self, query: GetEventByCode) -> Result<EventInvite, CoordinationError> {
        let event = self.fetch_joinable(&query.join_code).await?;

        let host_name = match self.gateway.fetch_member(event.host_id).await? {
            Some(host) => {
                let household = match host.household_id {
                    Some(id) => self.gateway.fetch_household(id).await?,
                    None => None,
                };
                Some(household.map_or(host.name, |h| h.name))
            }
            None => None,
        };
        Ok(EventInvite { event, host_name })
    }
}

/// Add a member to the guest list of the event a join code belongs to.
/// Joining twice leaves the list unchanged.
#[derive(Debug, Clone)]
pub struct JoinEventByCode {
    pub join_code: String,
    pub member_id: Uuid,
}

impl Processor<JoinEventByCode> for EventLifecycle {
    type Output = Event;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "JoinEventByCode", fields(member_id = %cmd.member_id))]
    async fn process(&self, cmd: JoinEventByCode) -> Result<Event, CoordinationError> {
        let event = self.fetch_joinable(&cmd.join_code).await?;
        if event.guest_ids.contains(&cmd.member_id) {
            return Ok(event);
        }

        let event = self
            .gateway
            .add_guest(event.id, cmd.member_id)
            .await?
            .ok_or(CoordinationError::NotFound("event"))?;
        info!(event_id = %event.id, guests = event.guest_ids.len(), "Guest joined");
        Ok(event)
    }
}
