pub mod postgres_availability_rule_repo;
pub mod postgres_booking_repo;
pub mod postgres_date_exception_repo;
pub mod postgres_session_type_repo;
pub mod postgres_teacher_repo;
pub mod sqlite_availability_rule_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_date_exception_repo;
pub mod sqlite_session_type_repo;
pub mod sqlite_teacher_repo;
