use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateTeacherRequest {
    pub display_name: String,
    pub timezone: String,
}

#[derive(Deserialize)]
pub struct CreateSessionTypeRequest {
    pub name: String,
    pub duration_min: i32,
    pub price: i64,
    pub capacity: i32,
}

#[derive(Deserialize)]
pub struct UpdateSessionTypeRequest {
    pub name: Option<String>,
    pub duration_min: Option<i32>,
    pub price: Option<i64>,
    pub capacity: Option<i32>,
}

#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub session_type_id: String,
    pub weekday: i32,
    pub start_time: String,
    pub end_time: String,
    pub effective_from: Option<NaiveDate>,
    pub effective_until: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct CreateExceptionRequest {
    pub date: NaiveDate,
    pub kind: String,
    pub session_type_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub teacher_id: String,
    pub student_id: String,
    pub session_type_id: String,
    pub start: DateTime<Utc>,
    pub idempotency_key: String,
}

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub actor_id: String,
}
