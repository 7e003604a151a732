use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateTeacherRequest;
use crate::api::extractors::teacher::TeacherId;
use crate::domain::models::teacher::Teacher;
use crate::error::AppError;
use std::sync::Arc;
use chrono_tz::Tz;
use tracing::info;

pub async fn create_teacher(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.display_name.trim().is_empty() {
        return Err(AppError::Validation("display_name must not be empty".into()));
    }
    if payload.timezone.parse::<Tz>().is_err() {
        return Err(AppError::Validation("Invalid timezone".into()));
    }

    let teacher = Teacher::new(payload.display_name, payload.timezone);
    let created = state.teacher_repo.create(&teacher).await?;
    info!("Teacher created: {}", created.id);
    Ok(Json(created))
}

pub async fn get_teacher(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
) -> Result<impl IntoResponse, AppError> {
    let teacher = state.teacher_repo.find_by_id(&teacher_id).await?
        .ok_or(AppError::NotFound("Teacher not found".into()))?;
    Ok(Json(teacher))
}
