use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A weekly recurring availability window. `weekday` is 0 = Monday .. 6 =
/// Sunday; times are local wall-clock in the teacher's timezone.
/// Rules are deactivated, never deleted, so past bookings stay explainable.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityRule {
    pub id: String,
    pub teacher_id: String,
    pub session_type_id: String,
    pub weekday: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: Option<NaiveDate>,
    pub effective_until: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewRuleParams {
    pub teacher_id: String,
    pub session_type_id: String,
    pub weekday: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: Option<NaiveDate>,
    pub effective_until: Option<NaiveDate>,
}

impl AvailabilityRule {
    pub fn new(params: NewRuleParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            teacher_id: params.teacher_id,
            session_type_id: params.session_type_id,
            weekday: params.weekday,
            start_time: params.start_time,
            end_time: params.end_time,
            effective_from: params.effective_from,
            effective_until: params.effective_until,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Inclusive effective-range check for a concrete date.
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.effective_from
            && date < from {
            return false;
        }
        if let Some(until) = self.effective_until
            && date > until {
            return false;
        }
        true
    }
}
