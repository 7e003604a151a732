use crate::domain::{models::session_type::SessionType, ports::SessionTypeRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresSessionTypeRepo {
    pool: PgPool,
}

impl PostgresSessionTypeRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl SessionTypeRepository for PostgresSessionTypeRepo {
    async fn create(&self, session_type: &SessionType) -> Result<SessionType, AppError> {
        sqlx::query_as::<_, SessionType>(
            "INSERT INTO session_types (id, teacher_id, name, duration_min, price, capacity, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
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
        sqlx::query_as::<_, SessionType>("SELECT * FROM session_types WHERE teacher_id = $1 AND id = $2")
            .bind(teacher_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, teacher_id: &str) -> Result<Vec<SessionType>, AppError> {
        sqlx::query_as::<_, SessionType>("SELECT * FROM session_types WHERE teacher_id = $1 ORDER BY created_at ASC")
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, session_type: &SessionType) -> Result<SessionType, AppError> {
        sqlx::query_as::<_, SessionType>(
            "UPDATE session_types SET name=$1, duration_min=$2, price=$3, capacity=$4
             WHERE id=$5 AND teacher_id=$6
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
