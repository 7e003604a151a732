use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
};
use std::collections::HashMap;
use crate::state::AppState;
use std::sync::Arc;

/// Resolves the `{teacher_id}` path segment and rejects unknown teachers
/// before the handler runs.
pub struct TeacherId(pub String);

impl FromRequestParts<Arc<AppState>> for TeacherId {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        let teacher_id = params.get("teacher_id").ok_or(StatusCode::BAD_REQUEST)?;

        match state.teacher_repo.find_by_id(teacher_id).await {
            Ok(Some(_)) => Ok(TeacherId(teacher_id.clone())),
            Ok(None) => Err(StatusCode::NOT_FOUND),
            Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
