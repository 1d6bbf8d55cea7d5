pub mod dish;
pub mod event;
pub mod member;
pub mod notification;
pub mod stats;
pub mod swap;

pub use dish::{Dish, DishPledged, DishRef, DishUnpledged, DishView, NewDish, PledgeDish};
pub use event::{Event, EventInvite, EventRef, EventStatus, EventUpdate, JoinEvent, NewEvent};
pub use member::{Group, Household, Member};
pub use notification::Notification;
pub use stats::{EventStats, HostStat};
pub use swap::{
    HostSwapEventUpdates, NewSwapRequest, SwapRequest, SwapRequestView, SwapStatus,
    SwapStatusUpdate, SwapType,
};

/// Error returned when a stored status or type label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} label: {label}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}
