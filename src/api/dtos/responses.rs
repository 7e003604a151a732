use serde::Serialize;
use chrono::NaiveDate;

use crate::domain::models::slot::SlotInstance;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub slots: Vec<SlotInstance>,
}
