use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// The durable ledger row. Never deleted; cancellation is a status
/// transition so capacity accounting stays consistent under replays.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub teacher_id: String,
    pub student_id: String,
    pub session_type_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub price_at_booking: i64,
    pub idempotency_key: String,
    pub payment_ref: Option<String>,
    pub cancelled_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub teacher_id: String,
    pub student_id: String,
    pub session_type_id: String,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    pub price: i64,
    pub idempotency_key: String,
    pub payment_ref: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let end_time = params.start + chrono::Duration::minutes(params.duration_min as i64);

        Self {
            id: Uuid::new_v4().to_string(),
            teacher_id: params.teacher_id,
            student_id: params.student_id,
            session_type_id: params.session_type_id,
            start_time: params.start,
            end_time,
            status: "CONFIRMED".to_string(),
            price_at_booking: params.price,
            idempotency_key: params.idempotency_key,
            payment_ref: params.payment_ref,
            cancelled_by: None,
            created_at: Utc::now(),
        }
    }
}
