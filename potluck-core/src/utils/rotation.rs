//! Host rotation within a group.

use potluck_sdk::objects::Member;
use uuid::Uuid;

/// Pick the host that follows `current` in id order.
///
/// `members` must already be sorted by id. Wraps from the last member back
/// to the first. When `current` is not a member any more the first member is
/// chosen. Returns `None` only for an empty group.
pub fn next_host(members: &[Member], current: Uuid) -> Option<Uuid> {
    let first = members.first()?;
    let next = match members.iter().position(|m| m.id == current) {
        Some(idx) => &members[(idx + 1) % members.len()],
        None => {
            tracing::warn!(host_id = %current, "Current host is not a group member, rotating to first member");
            first
        }
    };
    Some(next.id)
}

/// Location to use after hosting moves from one household to another.
///
/// The incoming household address replaces the location only if the location
/// was blank or still pointed at the outgoing household. Returns `None` when
/// the location should stay as is.
pub fn carry_over_location(current: &str, old_address: &str, new_address: &str) -> Option<String> {
    if new_address.is_empty() {
        return None;
    }
    if current.is_empty() || current == old_address {
        Some(new_address.to_string())
    } else {
        None
    }
}
