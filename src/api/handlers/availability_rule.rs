use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateRuleRequest;
use crate::api::extractors::teacher::TeacherId;
use crate::domain::models::availability_rule::{AvailabilityRule, NewRuleParams};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use tracing::info;

fn parse_time(value: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected HH:MM)", field)))
}

fn ranges_intersect(
    a_from: Option<NaiveDate>, a_until: Option<NaiveDate>,
    b_from: Option<NaiveDate>, b_until: Option<NaiveDate>,
) -> bool {
    let starts_before_b_ends = match (a_from, b_until) {
        (Some(a), Some(b)) => a <= b,
        _ => true,
    };
    let b_starts_before_a_ends = match (b_from, a_until) {
        (Some(b), Some(a)) => b <= a,
        _ => true,
    };
    starts_before_b_ends && b_starts_before_a_ends
}

pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
    Json(payload): Json<CreateRuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !(0..=6).contains(&payload.weekday) {
        return Err(AppError::Validation("weekday must be between 0 (Monday) and 6 (Sunday)".into()));
    }

    let start_time = parse_time(&payload.start_time, "start_time")?;
    let end_time = parse_time(&payload.end_time, "end_time")?;
    if start_time >= end_time {
        return Err(AppError::Validation("start_time must be before end_time".into()));
    }
    if let (Some(from), Some(until)) = (payload.effective_from, payload.effective_until)
        && from > until {
        return Err(AppError::Validation("effective_from must not be after effective_until".into()));
    }

    let session_type = state.session_type_repo.find_by_id(&teacher_id, &payload.session_type_id).await?
        .ok_or(AppError::Validation("session_type_id does not reference one of this teacher's session types".into()))?;

    // Overlap is allowed only across different session types: each type is
    // an independent capacity pool in the same wall-clock span.
    let existing = state.rule_repo.list_active(&teacher_id).await?;
    let clashes = existing.iter().any(|r| {
        r.session_type_id == session_type.id
            && r.weekday == payload.weekday
            && r.start_time < end_time
            && r.end_time > start_time
            && ranges_intersect(r.effective_from, r.effective_until, payload.effective_from, payload.effective_until)
    });
    if clashes {
        return Err(AppError::Validation("rule overlaps an existing active rule for the same session type".into()));
    }

    let rule = AvailabilityRule::new(NewRuleParams {
        teacher_id,
        session_type_id: payload.session_type_id,
        weekday: payload.weekday,
        start_time,
        end_time,
        effective_from: payload.effective_from,
        effective_until: payload.effective_until,
    });
    let created = state.rule_repo.create(&rule).await?;
    info!("Availability rule created: {} (weekday {})", created.id, created.weekday);
    Ok(Json(created))
}

pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
) -> Result<impl IntoResponse, AppError> {
    let rules = state.rule_repo.list(&teacher_id).await?;
    Ok(Json(rules))
}

/// Rules are deactivated rather than deleted so slots already booked from
/// them remain explainable.
pub async fn deactivate_rule(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
    Path((_, rule_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.rule_repo.deactivate(&teacher_id, &rule_id).await?;
    info!("Availability rule deactivated: {}", rule_id);
    Ok(Json(serde_json::json!({"status": "deactivated"})))
}
