use crate::domain::{models::date_exception::DateException, ports::DateExceptionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteDateExceptionRepo {
    pool: SqlitePool,
}

impl SqliteDateExceptionRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl DateExceptionRepository for SqliteDateExceptionRepo {
    async fn create(&self, exception: &DateException) -> Result<DateException, AppError> {
        sqlx::query_as::<_, DateException>(
            "INSERT INTO date_exceptions (id, teacher_id, date, kind, session_type_id, start_time, end_time, reason, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&exception.id)
            .bind(&exception.teacher_id)
            .bind(exception.date)
            .bind(&exception.kind)
            .bind(&exception.session_type_id)
            .bind(exception.start_time)
            .bind(exception.end_time)
            .bind(&exception.reason)
            .bind(exception.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_date(&self, teacher_id: &str, date: NaiveDate) -> Result<Vec<DateException>, AppError> {
        sqlx::query_as::<_, DateException>("SELECT * FROM date_exceptions WHERE teacher_id = ? AND date = ?")
            .bind(teacher_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, teacher_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DateException>, AppError> {
        sqlx::query_as::<_, DateException>(
            "SELECT * FROM date_exceptions WHERE teacher_id = ? AND date >= ? AND date <= ?"
        )
            .bind(teacher_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, teacher_id: &str, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM date_exceptions WHERE teacher_id = ? AND id = ?")
            .bind(teacher_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Date exception not found".into()));
        }
        Ok(())
    }
}
