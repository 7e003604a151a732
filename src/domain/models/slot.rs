use serde::Serialize;
use chrono::{DateTime, Utc};

/// A contiguous availability interval produced by the recurrence expander,
/// before quantization. One capacity pool per session type: intervals for
/// different session types may overlap and are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInterval {
    pub session_type_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A concrete bookable occurrence. Derived on demand, never persisted.
#[derive(Debug, Serialize, Clone)]
pub struct SlotInstance {
    pub teacher_id: String,
    pub session_type_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub capacity_remaining: i32,
    pub price: i64,
}
