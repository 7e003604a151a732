use crate::domain::{models::session_type::SessionType, ports::SessionTypeRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSessionTypeRepo {
    pool: SqlitePool,
}

impl SqliteSessionTypeRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl SessionTypeRepository for SqliteSessionTypeRepo {
    async fn create(&self, session_type: &SessionType) -> Result<SessionType, AppError> {
        sqlx::query_as::<_, SessionType>(
            "INSERT INTO session_types (id, teacher_id, name, duration_min, price, capacity, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&session_type.id)
            .bind(&session_type.teacher_id)
            .bind(&session_type.name)
            .bind(session_type.duration_min)
            .bind(session_type.price)
            .bind(session_type.capacity)
            .bind(session_type.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, teacher_id: &str, id: &str) -> Result<Option<SessionType>, AppError> {
        sqlx::query_as::<_, SessionType>("SELECT * FROM session_types WHERE teacher_id = ? AND id = ?")
            .bind(teacher_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, teacher_id: &str) -> Result<Vec<SessionType>, AppError> {
        sqlx::query_as::<_, SessionType>("SELECT * FROM session_types WHERE teacher_id = ? ORDER BY created_at ASC")
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, session_type: &SessionType) -> Result<SessionType, AppError> {
        sqlx::query_as::<_, SessionType>(
            "UPDATE session_types SET name=?, duration_min=?, price=?, capacity=?
             WHERE id=? AND teacher_id=?
             RETURNING *"
        )
            .bind(&session_type.name)
            .bind(session_type.duration_min)
            .bind(session_type.price)
            .bind(session_type.capacity)
            .bind(&session_type.id)
            .bind(&session_type.teacher_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
