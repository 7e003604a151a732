use crate::domain::{models::teacher::Teacher, ports::TeacherRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresTeacherRepo {
    pool: PgPool,
}

impl PostgresTeacherRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl TeacherRepository for PostgresTeacherRepo {
    async fn create(&self, teacher: &Teacher) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (id, display_name, timezone, created_at) VALUES ($1, $2, $3, $4) RETURNING *"
        )
            .bind(&teacher.id)
            .bind(&teacher.display_name)
            .bind(&teacher.timezone)
            .bind(teacher.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Teacher>, AppError> {
        sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
