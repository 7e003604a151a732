use crate::domain::models::{
    availability_rule::AvailabilityRule, booking::Booking, date_exception::DateException,
    session_type::SessionType, teacher::Teacher,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait TeacherRepository: Send + Sync {
    async fn create(&self, teacher: &Teacher) -> Result<Teacher, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Teacher>, AppError>;
}

#[async_trait]
pub trait SessionTypeRepository: Send + Sync {
    async fn create(&self, session_type: &SessionType) -> Result<SessionType, AppError>;
    async fn find_by_id(&self, teacher_id: &str, id: &str) -> Result<Option<SessionType>, AppError>;
    async fn list(&self, teacher_id: &str) -> Result<Vec<SessionType>, AppError>;
    async fn update(&self, session_type: &SessionType) -> Result<SessionType, AppError>;
}

#[async_trait]
pub trait AvailabilityRuleRepository: Send + Sync {
    async fn create(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError>;
    async fn find_by_id(&self, teacher_id: &str, id: &str) -> Result<Option<AvailabilityRule>, AppError>;
    async fn list(&self, teacher_id: &str) -> Result<Vec<AvailabilityRule>, AppError>;
    async fn list_active(&self, teacher_id: &str) -> Result<Vec<AvailabilityRule>, AppError>;
    async fn deactivate(&self, teacher_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait DateExceptionRepository: Send + Sync {
    async fn create(&self, exception: &DateException) -> Result<DateException, AppError>;
    async fn list_by_date(&self, teacher_id: &str, date: NaiveDate) -> Result<Vec<DateException>, AppError>;
    async fn list_by_range(&self, teacher_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DateException>, AppError>;
    async fn delete(&self, teacher_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert_confirmed(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_confirmed_in_range(&self, teacher_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    async fn count_confirmed_at(&self, teacher_id: &str, session_type_id: &str, start: DateTime<Utc>) -> Result<i64, AppError>;
    async fn list_confirmed_overlapping_for_student(&self, teacher_id: &str, student_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    /// Returns None when the booking was not in CONFIRMED state.
    async fn mark_cancelled(&self, id: &str, actor_id: &str) -> Result<Option<Booking>, AppError>;
    async fn exists_for_session_type(&self, session_type_id: &str) -> Result<bool, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Student,
}

/// External identity collaborator. Authentication itself lives outside this
/// service; we only resolve an opaque actor id to a role.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, actor_id: &str) -> Result<Role, AppError>;
}

/// External payment collaborator. A hold is placed before Reserve, captured
/// on Confirmed and released on Rejected.
#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    async fn hold(&self, student_id: &str, amount: i64) -> Result<String, AppError>;
    async fn capture(&self, hold_ref: &str) -> Result<(), AppError>;
    async fn release(&self, hold_ref: &str) -> Result<(), AppError>;
}
