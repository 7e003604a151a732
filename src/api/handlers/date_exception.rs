use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateExceptionRequest;
use crate::api::extractors::teacher::TeacherId;
use crate::domain::models::date_exception::{DateException, NewExceptionParams};
use crate::error::AppError;
use std::sync::Arc;
use std::collections::HashMap;
use chrono::{NaiveDate, NaiveTime};
use tracing::info;

fn parse_time(value: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected HH:MM)", field)))
}

pub async fn create_exception(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
    Json(payload): Json<CreateExceptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    match payload.kind.as_str() {
        "BLOCKED" | "ADDED" => {},
        _ => return Err(AppError::Validation("kind must be BLOCKED or ADDED".into())),
    }

    let times = match (&payload.start_time, &payload.end_time) {
        (Some(start), Some(end)) => {
            let start = parse_time(start, "start_time")?;
            let end = parse_time(end, "end_time")?;
            if start >= end {
                return Err(AppError::Validation("start_time must be before end_time".into()));
            }
            Some((start, end))
        }
        (None, None) => None,
        _ => return Err(AppError::Validation("start_time and end_time must be given together".into())),
    };

    let session_type_id = if payload.kind == "ADDED" {
        if times.is_none() {
            return Err(AppError::Validation("An ADDED exception requires a time range".into()));
        }
        let id = payload.session_type_id.as_ref()
            .ok_or(AppError::Validation("An ADDED exception requires a session_type_id".into()))?;
        state.session_type_repo.find_by_id(&teacher_id, id).await?
            .ok_or(AppError::Validation("session_type_id does not reference one of this teacher's session types".into()))?;
        Some(id.clone())
    } else {
        None
    };

    // A date cannot be both fully blocked and carry an added slot; reject
    // here so the expander never has to arbitrate.
    let same_day = state.exception_repo.list_by_date(&teacher_id, payload.date).await?;
    if payload.kind == "ADDED" && same_day.iter().any(|e| e.blocks_whole_day()) {
        return Err(AppError::Validation("Date is fully blocked; remove the block before adding a slot".into()));
    }
    if payload.kind == "BLOCKED" && times.is_none() && same_day.iter().any(|e| e.kind == "ADDED") {
        return Err(AppError::Validation("Date has added slots; remove them before blocking the whole day".into()));
    }

    let exception = DateException::new(NewExceptionParams {
        teacher_id,
        date: payload.date,
        kind: payload.kind,
        session_type_id,
        start_time: times.map(|(s, _)| s),
        end_time: times.map(|(_, e)| e),
        reason: payload.reason,
    });
    let created = state.exception_repo.create(&exception).await?;
    info!("Date exception created: {} ({} on {})", created.id, created.kind, created.date);
    Ok(Json(created))
}

pub async fn list_exceptions(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let from_str = params.get("from").ok_or(AppError::Validation("from required".into()))?;
    let to_str = params.get("to").ok_or(AppError::Validation("to required".into()))?;

    let from = NaiveDate::parse_from_str(from_str, "%Y-%m-%d").map_err(|_| AppError::Validation("Invalid from".into()))?;
    let to = NaiveDate::parse_from_str(to_str, "%Y-%m-%d").map_err(|_| AppError::Validation("Invalid to".into()))?;

    let exceptions = state.exception_repo.list_by_range(&teacher_id, from, to).await?;
    Ok(Json(exceptions))
}

pub async fn delete_exception(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
    Path((_, exception_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.exception_repo.delete(&teacher_id, &exception_id).await?;
    info!("Date exception deleted: {}", exception_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
