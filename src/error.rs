use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Semantic booking conflicts, surfaced verbatim to the caller and never
/// retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    CapacityExceeded,
    StudentDoubleBooked,
    SlotNotFound,
    AlreadyCancelled,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::CapacityExceeded => "CAPACITY_EXCEEDED",
            ConflictKind::StudentDoubleBooked => "STUDENT_DOUBLE_BOOKED",
            ConflictKind::SlotNotFound => "SLOT_NOT_FOUND",
            ConflictKind::AlreadyCancelled => "ALREADY_CANCELLED",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ConflictKind::CapacityExceeded => "Slot is fully booked",
            ConflictKind::StudentDoubleBooked => "Student already has an overlapping booking with this teacher",
            ConflictKind::SlotNotFound => "Selected time slot does not exist or is no longer bookable",
            ConflictKind::AlreadyCancelled => "Booking is already cancelled",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Not authorized: {0}")]
    NotAuthorized(String),
    #[error("Conflict: {0}")]
    Conflict(ConflictKind),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Temporarily unavailable: {0}")]
    Transient(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

/// Storage errors worth retrying with backoff: pool/IO trouble, SQLite
/// busy/locked, Postgres lock or serialization failures.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => {
            let code = db.code().unwrap_or_default();
            // 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED
            // 40001 = serialization_failure, 40P01 = deadlock_detected,
            // 55P03 = lock_not_available
            code == "5" || code == "6" || code == "40001" || code == "40P01" || code == "55P03"
        }
        _ => false,
    }
}

/// 2067 = SQLITE_CONSTRAINT_UNIQUE, 1555 = SQLITE_CONSTRAINT_PRIMARYKEY,
/// 23505 = PostgreSQL unique_violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        let code = db.code().unwrap_or_default();
        return code == "2067" || code == "1555" || code == "23505";
    }
    false
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, kind) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), Some("NOT_FOUND")),
            AppError::NotAuthorized(msg) => (StatusCode::FORBIDDEN, msg.clone(), Some("NOT_AUTHORIZED")),
            AppError::Conflict(conflict) => (StatusCode::CONFLICT, conflict.to_string(), Some(conflict.as_str())),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Transient(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone(), Some("TRANSIENT")),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string(), None),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string(), None)
            }
        };

        let body = match kind {
            Some(kind) => Json(json!({ "error": message, "kind": kind })),
            None => Json(json!({ "error": message })),
        };

        (status, body).into_response()
    }
}
