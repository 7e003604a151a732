use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CancelBookingRequest, CreateBookingRequest};
use crate::api::extractors::teacher::TeacherId;
use crate::domain::services::booking_service::BookRequest;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.idempotency_key.trim().is_empty() {
        return Err(AppError::Validation("idempotency_key must not be empty".into()));
    }

    info!("create_booking: teacher {} session type {} at {}", payload.teacher_id, payload.session_type_id, payload.start);

    let booking = state.booking_service.book(BookRequest {
        teacher_id: payload.teacher_id,
        student_id: payload.student_id,
        session_type_id: payload.session_type_id,
        start: payload.start,
        idempotency_key: payload.idempotency_key,
    }).await?;

    Ok(Json(booking))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.booking_service.cancel(&booking_id, &payload.actor_id).await?;
    Ok(Json(cancelled))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    Ok(Json(booking))
}

pub async fn list_teacher_bookings(
    State(state): State<Arc<AppState>>,
    TeacherId(teacher_id): TeacherId,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_teacher(&teacher_id).await?;
    Ok(Json(bookings))
}
