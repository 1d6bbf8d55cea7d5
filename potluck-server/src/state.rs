//! Application state shared across all request handlers.

use potluck_core::controllers::{DishPledges, EventLifecycle, SwapApproval};
use potluck_core::gateway::PersistenceGateway;
use potluck_core::hub::Hub;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventLifecycle>,
    pub swaps: Arc<SwapApproval>,
    pub dishes: Arc<DishPledges>,
    /// Handle to the connection registry for WebSocket subscribers.
    pub hub: Hub,
}

impl AppState {
    /// Wire every controller to the same gateway and hub.
    pub fn new(gateway: Arc<dyn PersistenceGateway>, hub: Hub) -> Self {
        Self {
            events: Arc::new(EventLifecycle::new(gateway.clone(), hub.clone())),
            swaps: Arc::new(SwapApproval::new(gateway.clone(), hub.clone())),
            dishes: Arc::new(DishPledges::new(gateway, hub.clone())),
            hub,
        }
    }
}
