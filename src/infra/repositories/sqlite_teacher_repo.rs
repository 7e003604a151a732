use crate::domain::{models::teacher::Teacher, ports::TeacherRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTeacherRepo {
    pool: SqlitePool,
}

impl SqliteTeacherRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl TeacherRepository for SqliteTeacherRepo {
    async fn create(&self, teacher: &Teacher) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (id, display_name, timezone, created_at) VALUES (?, ?, ?, ?) RETURNING *"
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
        sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
