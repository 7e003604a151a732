use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Teacher {
    pub id: String,
    pub display_name: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl Teacher {
    pub fn new(display_name: String, timezone: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name,
            timezone,
            created_at: Utc::now(),
        }
    }
}
