use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

use super::UnknownLabel;

/// What a swap request proposes to hand over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapType {
    /// Hosting duty for the event.
    Host,
    /// The pledge to bring a dish.
    Dish,
}

impl SwapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapType::Host => "host",
            SwapType::Dish => "dish",
        }
    }
}

impl FromStr for SwapType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(SwapType::Host),
            "dish" => Ok(SwapType::Dish),
            other => Err(UnknownLabel {
                kind: "swap type",
                label: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Approved,
    Rejected,
}

impl SwapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Approved => "approved",
            SwapStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for SwapStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SwapStatus::Pending),
            "approved" => Ok(SwapStatus::Approved),
            "rejected" => Ok(SwapStatus::Rejected),
            other => Err(UnknownLabel {
                kind: "swap status",
                label: other.to_string(),
            }),
        }
    }
}

/// A proposal to move hosting duty or a dish pledge between members.
///
/// Created `pending`; moves once to `approved` or `rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub swap_type: SwapType,
    pub requesting_member_id: Uuid,
    pub target_member_id: Option<Uuid>,
    pub status: SwapStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Body of `POST /swaps`.
///
/// A `status` sent by the caller is accepted but ignored: new requests are
/// always pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSwapRequest {
    pub event_id: Uuid,
    #[serde(default)]
    pub dish_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub swap_type: SwapType,
    pub requesting_member_id: Uuid,
    #[serde(default)]
    pub target_member_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<SwapStatus>,
}

/// Body of `PATCH /swaps/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStatusUpdate {
    pub status: SwapStatus,
    #[serde(default)]
    pub target_member_id: Option<Uuid>,
    /// Only read when a host swap is approved.
    #[serde(default)]
    pub event_updates: Option<HostSwapEventUpdates>,
}

/// Event changes that ride along with an approved host swap.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostSwapEventUpdates {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A swap request with member names resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequestView {
    #[serde(flatten)]
    pub request: SwapRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requesting_member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_member_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_parsing() {
        let update: SwapStatusUpdate = serde_json::from_str(
            r#"{
                "status": "approved",
                "target_member_id": "00000000-0000-0000-0000-000000000002",
                "event_updates": {"location": "12 Elm Street"}
            }"#,
        )
        .unwrap();
        assert_eq!(update.status, SwapStatus::Approved);
        assert!(update.target_member_id.is_some());
        let updates = update.event_updates.unwrap();
        assert_eq!(updates.location.as_deref(), Some("12 Elm Street"));
        assert!(updates.date.is_none());
    }

    #[test]
    fn test_unknown_swap_type_rejected() {
        let body = r#"{
            "event_id": "00000000-0000-0000-0000-000000000001",
            "type": "chair",
            "requesting_member_id": "00000000-0000-0000-0000-000000000002"
        }"#;
        assert!(serde_json::from_str::<NewSwapRequest>(body).is_err());
    }
}
