use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use chrono::{DateTime, Utc};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn insert_confirmed(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, teacher_id, student_id, session_type_id, start_time, end_time, status, price_at_booking, idempotency_key, payment_ref, cancelled_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *"
        )
            .bind(&booking.id)
            .bind(&booking.teacher_id)
            .bind(&booking.student_id)
            .bind(&booking.session_type_id)
            .bind(booking.start_time)
            .bind(booking.end_time)
            .bind(&booking.status)
            .bind(booking.price_at_booking)
            .bind(&booking.idempotency_key)
            .bind(&booking.payment_ref)
            .bind(&booking.cancelled_by)
            .bind(booking.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE idempotency_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE teacher_id = $1 ORDER BY start_time ASC")
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_confirmed_in_range(&self, teacher_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE teacher_id = $1 AND start_time < $2 AND end_time > $3 AND status = 'CONFIRMED'"
        )
            .bind(teacher_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_confirmed_at(&self, teacher_id: &str, session_type_id: &str, start: DateTime<Utc>) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM bookings WHERE teacher_id = $1 AND session_type_id = $2 AND start_time = $3 AND status = 'CONFIRMED'"
        )
            .bind(teacher_id)
            .bind(session_type_id)
            .bind(start)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn list_confirmed_overlapping_for_student(&self, teacher_id: &str, student_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE teacher_id = $1 AND student_id = $2 AND start_time < $3 AND end_time > $4 AND status = 'CONFIRMED'"
        )
            .bind(teacher_id)
            .bind(student_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_cancelled(&self, id: &str, actor_id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'CANCELLED', cancelled_by = $1 WHERE id = $2 AND status = 'CONFIRMED' RETURNING *"
        )
            .bind(actor_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn exists_for_session_type(&self, session_type_id: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE session_type_id = $1")
            .bind(session_type_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }
}
