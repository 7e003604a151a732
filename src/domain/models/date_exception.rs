use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A date-scoped override of the weekly pattern. `kind` is "BLOCKED" or
/// "ADDED". A BLOCKED exception with no time range removes the whole day;
/// with a range it removes only that interval. An ADDED exception injects a
/// one-off interval and must carry times plus the session type it offers.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct DateException {
    pub id: String,
    pub teacher_id: String,
    pub date: NaiveDate,
    pub kind: String,
    pub session_type_id: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewExceptionParams {
    pub teacher_id: String,
    pub date: NaiveDate,
    pub kind: String,
    pub session_type_id: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

impl DateException {
    pub fn new(params: NewExceptionParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            teacher_id: params.teacher_id,
            date: params.date,
            kind: params.kind,
            session_type_id: params.session_type_id,
            start_time: params.start_time,
            end_time: params.end_time,
            reason: params.reason,
            created_at: Utc::now(),
        }
    }

    pub fn blocks_whole_day(&self) -> bool {
        self.kind == "BLOCKED" && self.start_time.is_none()
    }
}
