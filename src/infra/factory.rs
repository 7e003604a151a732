use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::services::booking_service::{BookingService, BookingServiceDeps};
use crate::domain::services::ledger::BookingLedger;
use crate::infra::identity::http_identity_service::HttpIdentityService;
use crate::infra::payment::http_payment_service::HttpPaymentService;
use crate::infra::repositories::{
    postgres_availability_rule_repo::PostgresAvailabilityRuleRepo,
    postgres_booking_repo::PostgresBookingRepo,
    postgres_date_exception_repo::PostgresDateExceptionRepo,
    postgres_session_type_repo::PostgresSessionTypeRepo,
    postgres_teacher_repo::PostgresTeacherRepo,
    sqlite_availability_rule_repo::SqliteAvailabilityRuleRepo,
    sqlite_booking_repo::SqliteBookingRepo,
    sqlite_date_exception_repo::SqliteDateExceptionRepo,
    sqlite_session_type_repo::SqliteSessionTypeRepo,
    sqlite_teacher_repo::SqliteTeacherRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let payment_service = Arc::new(HttpPaymentService::new(
        config.payment_service_url.clone(),
        config.payment_service_token.clone(),
    ));
    let identity_service = Arc::new(HttpIdentityService::new(
        config.identity_service_url.clone(),
        config.identity_service_token.clone(),
    ));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        assemble_state(
            config,
            Arc::new(PostgresTeacherRepo::new(pool.clone())),
            Arc::new(PostgresSessionTypeRepo::new(pool.clone())),
            Arc::new(PostgresAvailabilityRuleRepo::new(pool.clone())),
            Arc::new(PostgresDateExceptionRepo::new(pool.clone())),
            Arc::new(PostgresBookingRepo::new(pool.clone())),
            identity_service,
            payment_service,
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        assemble_state(
            config,
            Arc::new(SqliteTeacherRepo::new(pool.clone())),
            Arc::new(SqliteSessionTypeRepo::new(pool.clone())),
            Arc::new(SqliteAvailabilityRuleRepo::new(pool.clone())),
            Arc::new(SqliteDateExceptionRepo::new(pool.clone())),
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            identity_service,
            payment_service,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn assemble_state(
    config: &Config,
    teacher_repo: Arc<dyn crate::domain::ports::TeacherRepository>,
    session_type_repo: Arc<dyn crate::domain::ports::SessionTypeRepository>,
    rule_repo: Arc<dyn crate::domain::ports::AvailabilityRuleRepository>,
    exception_repo: Arc<dyn crate::domain::ports::DateExceptionRepository>,
    booking_repo: Arc<dyn crate::domain::ports::BookingRepository>,
    identity_service: Arc<dyn crate::domain::ports::IdentityProvider>,
    payment_service: Arc<dyn crate::domain::ports::PaymentAuthorizer>,
) -> AppState {
    let ledger = Arc::new(BookingLedger::new(
        teacher_repo.clone(),
        rule_repo.clone(),
        exception_repo.clone(),
        session_type_repo.clone(),
        booking_repo.clone(),
        chrono::Duration::minutes(config.min_lead_time_min),
    ));

    let booking_service = Arc::new(BookingService::new(BookingServiceDeps {
        teacher_repo: teacher_repo.clone(),
        rule_repo: rule_repo.clone(),
        exception_repo: exception_repo.clone(),
        session_type_repo: session_type_repo.clone(),
        booking_repo: booking_repo.clone(),
        ledger,
        identity_service: identity_service.clone(),
        payment_service: payment_service.clone(),
        min_lead_time_min: config.min_lead_time_min,
        retry_attempts: config.reserve_retry_attempts,
        retry_base_ms: config.reserve_retry_base_ms,
    }));

    AppState {
        config: config.clone(),
        teacher_repo,
        session_type_repo,
        rule_repo,
        exception_repo,
        booking_repo,
        identity_service,
        payment_service,
        booking_service,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
