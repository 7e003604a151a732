use crate::domain::{models::availability_rule::AvailabilityRule, ports::AvailabilityRuleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresAvailabilityRuleRepo {
    pool: PgPool,
}

impl PostgresAvailabilityRuleRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl AvailabilityRuleRepository for PostgresAvailabilityRuleRepo {
    async fn create(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError> {
        sqlx::query_as::<_, AvailabilityRule>(
            "INSERT INTO availability_rules (id, teacher_id, session_type_id, weekday, start_time, end_time, effective_from, effective_until, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *"
        )
            .bind(&rule.id)
            .bind(&rule.teacher_id)
            .bind(&rule.session_type_id)
            .bind(rule.weekday)
            .bind(rule.start_time)
            .bind(rule.end_time)
            .bind(rule.effective_from)
            .bind(rule.effective_until)
            .bind(rule.active)
            .bind(rule.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, teacher_id: &str, id: &str) -> Result<Option<AvailabilityRule>, AppError> {
        sqlx::query_as::<_, AvailabilityRule>("SELECT * FROM availability_rules WHERE teacher_id = $1 AND id = $2")
            .bind(teacher_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, teacher_id: &str) -> Result<Vec<AvailabilityRule>, AppError> {
        sqlx::query_as::<_, AvailabilityRule>(
            "SELECT * FROM availability_rules WHERE teacher_id = $1 ORDER BY weekday, start_time"
        )
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self, teacher_id: &str) -> Result<Vec<AvailabilityRule>, AppError> {
        sqlx::query_as::<_, AvailabilityRule>(
            "SELECT * FROM availability_rules WHERE teacher_id = $1 AND active = TRUE ORDER BY weekday, start_time"
        )
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn deactivate(&self, teacher_id: &str, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("UPDATE availability_rules SET active = FALSE WHERE teacher_id = $1 AND id = $2")
            .bind(teacher_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Availability rule not found".into()));
        }
        Ok(())
    }
}
