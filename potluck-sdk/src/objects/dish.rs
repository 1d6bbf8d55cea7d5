use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dish somebody brings to an event. `bringer_id` is `None` while nobody
/// has pledged it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    pub bringer_id: Option<Uuid>,
    #[serde(default)]
    pub is_host_dish: bool,
    #[serde(default)]
    pub is_requested: bool,
    #[serde(default)]
    pub is_suggested: bool,
}

/// Body of `POST /dishes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDish {
    pub event_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default)]
    pub bringer_id: Option<Uuid>,
    #[serde(default)]
    pub is_host_dish: bool,
    #[serde(default)]
    pub is_requested: bool,
    #[serde(default)]
    pub is_suggested: bool,
}

/// A dish together with the display name of its bringer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishView {
    #[serde(flatten)]
    pub dish: Dish,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bringer_name: Option<String>,
}

/// Body of `POST /dishes/{id}/pledge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeDish {
    pub member_id: Uuid,
}

/// Payload of `dish_pledged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishPledged {
    pub dish_id: Uuid,
    pub event_id: Uuid,
    pub bringer_id: Uuid,
    pub bringer_name: String,
    pub dish_name: String,
}

/// Payload of `dish_unpledged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishUnpledged {
    pub dish_id: Uuid,
    pub event_id: Uuid,
    pub dish_name: String,
}

/// Payload of `dish_deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishRef {
    pub dish_id: Uuid,
    pub event_id: Uuid,
}
