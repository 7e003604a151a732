use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateSessionTypeRequest, UpdateSessionTypeRequest};
use crate::api::extractors::teacher::TeacherId;
use crate::domain::models::session_type::SessionType;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_session_type(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
    Json(payload): Json<CreateSessionTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    if payload.duration_min <= 0 {
        return Err(AppError::Validation("duration_min must be positive".into()));
    }
    if payload.capacity < 1 {
        return Err(AppError::Validation("capacity must be at least 1".into()));
    }
    if payload.price < 0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }

    let session_type = SessionType::new(
        teacher_id,
        payload.name,
        payload.duration_min,
        payload.price,
        payload.capacity,
    );
    let created = state.session_type_repo.create(&session_type).await?;
    info!("Session type created: {} ({})", created.id, created.name);
    Ok(Json(created))
}

pub async fn list_session_types(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
) -> Result<impl IntoResponse, AppError> {
    let session_types = state.session_type_repo.list(&teacher_id).await?;
    Ok(Json(session_types))
}

/// Name, price and capacity stay editable; existing bookings keep their
/// snapshotted price and are never auto-cancelled by a capacity reduction.
/// Duration is frozen once any booking references the type, since changing
/// it would re-cut the slot grid under confirmed bookings.
pub async fn update_session_type(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
    Path((_, session_type_id)): Path<(String, String)>,
    Json(payload): Json<UpdateSessionTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session_type = state.session_type_repo.find_by_id(&teacher_id, &session_type_id).await?
        .ok_or(AppError::NotFound("Session type not found".into()))?;

    if let Some(duration_min) = payload.duration_min
        && duration_min != session_type.duration_min {
        if duration_min <= 0 {
            return Err(AppError::Validation("duration_min must be positive".into()));
        }
        if state.booking_repo.exists_for_session_type(&session_type.id).await? {
            return Err(AppError::Validation("duration_min cannot change once the session type has bookings".into()));
        }
        session_type.duration_min = duration_min;
    }

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        session_type.name = name;
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::Validation("price must not be negative".into()));
        }
        session_type.price = price;
    }
    if let Some(capacity) = payload.capacity {
        if capacity < 1 {
            return Err(AppError::Validation("capacity must be at least 1".into()));
        }
        session_type.capacity = capacity;
    }

    let updated = state.session_type_repo.update(&session_type).await?;
    info!("Session type updated: {}", updated.id);
    Ok(Json(updated))
}
