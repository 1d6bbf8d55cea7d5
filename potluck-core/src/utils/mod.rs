pub mod join_code;
pub mod recurrence;
pub mod rotation;
