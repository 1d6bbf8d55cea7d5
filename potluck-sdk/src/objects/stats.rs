use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hosting history of a recurrence series, as returned by
/// `GET /events/stats/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventStats {
    pub total_occurrences: usize,
    /// Sorted by descending `count`. The order between equal counts is not
    /// specified.
    pub host_counts: Vec<HostStat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStat {
    pub member_id: Uuid,
    pub member_name: String,
    pub count: usize,
}
