//! Coordination controllers.
//!
//! Each controller owns an injected [`PersistenceGateway`] and a [`Hub`]
//! handle, and exposes its operations as request structs handled through
//! [`kanau::processor::Processor`]. Reads and checks come first; writes are
//! issued one record at a time and each successful write is announced on the
//! hub.
//!
//! [`Hub`]: crate::hub::Hub

pub mod dishes;
pub mod events;
pub mod swaps;

pub use dishes::DishPledges;
pub use events::EventLifecycle;
pub use swaps::SwapApproval;

use potluck_sdk::objects::Event;
use uuid::Uuid;

use crate::error::CoordinationError;
use crate::gateway::PersistenceGateway;

/// How a requester relates to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    GroupAdmin,
    Host,
    /// Shares a household with the host and may act on the host's behalf.
    HostHousehold,
    Outsider,
}

impl Role {
    /// Finishing and skipping occurrences.
    pub fn may_advance(&self) -> bool {
        !matches!(self, Role::Outsider)
    }

    /// Deleting. Hosts cannot delete a recurring series, only its admin can.
    pub fn may_delete(&self, event: &Event) -> bool {
        match self {
            Role::GroupAdmin => true,
            Role::Host | Role::HostHousehold => !event.is_recurring(),
            Role::Outsider => false,
        }
    }
}

pub(crate) async fn role_of(
    gateway: &dyn PersistenceGateway,
    event: &Event,
    requester: Uuid,
) -> Result<Role, CoordinationError> {
    let group = gateway
        .fetch_group(event.group_id)
        .await?
        .ok_or(CoordinationError::NotFound("group"))?;

    if group.admin_id == requester {
        return Ok(Role::GroupAdmin);
    }
    if event.host_id == requester {
        return Ok(Role::Host);
    }

    let requester = gateway.fetch_member(requester).await?;
    let host = gateway.fetch_member(event.host_id).await?;
    let same_household = match (requester, host) {
        (Some(r), Some(h)) => matches!(
            (r.household_id, h.household_id),
            (Some(a), Some(b)) if a == b
        ),
        _ => false,
    };
    Ok(if same_household {
        Role::HostHousehold
    } else {
        Role::Outsider
    })
}

/// Address of the household `member_id` lives in, or an empty string.
pub(crate) async fn household_address(
    gateway: &dyn PersistenceGateway,
    member_id: Uuid,
) -> Result<String, CoordinationError> {
    let Some(household_id) = gateway
        .fetch_member(member_id)
        .await?
        .and_then(|m| m.household_id)
    else {
        return Ok(String::new());
    };
    Ok(gateway
        .fetch_household(household_id)
        .await?
        .map(|h| h.address)
        .unwrap_or_default())
}

pub(crate) async fn member_name(
    gateway: &dyn PersistenceGateway,
    member_id: Uuid,
) -> Result<Option<String>, CoordinationError> {
    Ok(gateway.fetch_member(member_id).await?.map(|m| m.name))
}
