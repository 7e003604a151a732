use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::responses::AvailabilityResponse;
use crate::api::extractors::teacher::TeacherId;
use crate::error::AppError;
use std::sync::Arc;
use std::collections::HashMap;
use chrono::NaiveDate;

/// Public availability query: `from` and `to` are inclusive local dates in
/// the teacher's timezone.
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let from_str = params.get("from").ok_or(AppError::Validation("from required".into()))?;
    let to_str = params.get("to").ok_or(AppError::Validation("to required".into()))?;

    let from = NaiveDate::parse_from_str(from_str, "%Y-%m-%d").map_err(|_| AppError::Validation("Invalid from".into()))?;
    let to = NaiveDate::parse_from_str(to_str, "%Y-%m-%d").map_err(|_| AppError::Validation("Invalid to".into()))?;
    if from > to {
        return Err(AppError::Validation("from must not be after to".into()));
    }

    let slots = state.booking_service.get_availability(&teacher_id, from, to).await?;
    Ok(Json(AvailabilityResponse { from, to, slots }))
}
