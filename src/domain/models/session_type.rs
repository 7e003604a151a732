use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A bookable offering: 1:1 lessons have capacity 1, group sessions more.
/// `price` is in minor currency units. Bookings snapshot the price at
/// creation time, so `name` and `price` stay editable; `duration_min` and
/// `capacity` are frozen once any booking references the type.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SessionType {
    pub id: String,
    pub teacher_id: String,
    pub name: String,
    pub duration_min: i32,
    pub price: i64,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl SessionType {
    pub fn new(teacher_id: String, name: String, duration_min: i32, price: i64, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            teacher_id,
            name,
            duration_min,
            price,
            capacity,
            created_at: Utc::now(),
        }
    }
}
