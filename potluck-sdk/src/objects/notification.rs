//! Broadcast envelope pushed to every connected client over `GET /ws`.
//!
//! # Protocol
//!
//! The server only ever sends; clients do not speak after the upgrade.
//! Each text frame is one JSON object with a `type` discriminator and a
//! `data` payload:
//!
//! ```json
//! {"type":"event_created","data":{"id":"…","group_id":"…", …}}
//! {"type":"event_deleted","data":{"event_id":"…","group_id":"…"}}
//! ```
//!
//! `*_created` / `*_updated` carry the full entity; `*_deleted` carry only
//! identifiers.

use serde::{Deserialize, Serialize};

use super::dish::{Dish, DishPledged, DishRef, DishUnpledged};
use super::event::{Event, EventRef};
use super::swap::SwapRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notification {
    EventCreated(Event),
    EventUpdated(Event),
    EventDeleted(EventRef),
    DishPledged(DishPledged),
    DishUnpledged(DishUnpledged),
    DishAdded(Dish),
    DishDeleted(DishRef),
    /// Produced by the RSVP collaborator; relayed untouched.
    RsvpUpdated(serde_json::Value),
    SwapCreated(SwapRequest),
    SwapUpdated(SwapRequest),
    /// Produced by the chat collaborator; relayed untouched.
    NewChatMessage(serde_json::Value),
}

impl Notification {
    /// The wire value of the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::EventCreated(_) => "event_created",
            Notification::EventUpdated(_) => "event_updated",
            Notification::EventDeleted(_) => "event_deleted",
            Notification::DishPledged(_) => "dish_pledged",
            Notification::DishUnpledged(_) => "dish_unpledged",
            Notification::DishAdded(_) => "dish_added",
            Notification::DishDeleted(_) => "dish_deleted",
            Notification::RsvpUpdated(_) => "rsvp_updated",
            Notification::SwapCreated(_) => "swap_created",
            Notification::SwapUpdated(_) => "swap_updated",
            Notification::NewChatMessage(_) => "new_chat_message",
        }
    }

    /// Serialize into the JSON text sent on the socket.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
