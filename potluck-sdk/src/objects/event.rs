use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

use super::UnknownLabel;

/// One occurrence of a shared meal.
///
/// Events that share a `recurrence_id` are successive occurrences of the same
/// commitment. At most one of them is `scheduled` at a time; the rest are
/// `completed` and kept for statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub group_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Free-form label such as "Dinner" or "Coffee".
    #[serde(rename = "type", default)]
    pub event_type: String,
    pub host_id: Uuid,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    /// Recurrence label. Empty means a one-off event.
    #[serde(default)]
    pub recurrence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<Uuid>,
    #[serde(default)]
    pub guest_ids: Vec<Uuid>,
    #[serde(default)]
    pub guest_join_code: String,
    pub status: EventStatus,
}

impl Event {
    pub fn is_recurring(&self) -> bool {
        !self.recurrence.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Scheduled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Completed => "completed",
        }
    }
}

impl FromStr for EventStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(EventStatus::Scheduled),
            "completed" => Ok(EventStatus::Completed),
            other => Err(UnknownLabel {
                kind: "event status",
                label: other.to_string(),
            }),
        }
    }
}

/// Body of `POST /events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub group_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(rename = "type", default)]
    pub event_type: String,
    pub host_id: Uuid,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recurrence: String,
}

/// Body of `PATCH /events/{id}`. Only the host may edit; absent or empty
/// fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUpdate {
    pub user_id: Uuid,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /events/join-by-code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEvent {
    pub member_id: Uuid,
    pub join_code: String,
}

/// An event looked up by its guest join code, with the name a guest knows
/// the host by: the host's household if there is one, otherwise the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInvite {
    #[serde(flatten)]
    pub event: Event,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

/// Payload of `event_deleted`: just enough for views to drop the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    pub event_id: Uuid,
    pub group_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_event_json_shape() {
        let event = Event {
            id: Uuid::nil(),
            group_id: Uuid::nil(),
            name: "Sunday roast".to_string(),
            date: datetime!(2025-03-02 18:00 UTC),
            event_type: "Dinner".to_string(),
            host_id: Uuid::nil(),
            location: String::new(),
            description: String::new(),
            recurrence: "Weekly".to_string(),
            recurrence_id: None,
            guest_ids: vec![],
            guest_join_code: "ABC123".to_string(),
            status: EventStatus::Scheduled,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "Dinner");
        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["date"], "2025-03-02T18:00:00Z");
        assert!(value.get("recurrence_id").is_none());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!("completed".parse::<EventStatus>(), Ok(EventStatus::Completed));
        assert!("cancelled".parse::<EventStatus>().is_err());
    }
}
