use tutoria_backend::{
    api::router::create_router,
    config::Config,
    domain::ports::{IdentityProvider, PaymentAuthorizer, Role},
    domain::services::booking_service::{BookingService, BookingServiceDeps},
    domain::services::ledger::BookingLedger,
    error::AppError,
    infra::repositories::{
        sqlite_availability_rule_repo::SqliteAvailabilityRuleRepo,
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_date_exception_repo::SqliteDateExceptionRepo,
        sqlite_session_type_repo::SqliteSessionTypeRepo,
        sqlite_teacher_repo::SqliteTeacherRepo,
    },
    state::AppState,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use axum::Router;
use uuid::Uuid;

/// Resolves ids prefixed "teacher:" to the Teacher role, rejects ids
/// prefixed "unknown", and treats everything else as a student.
pub struct MockIdentityService;

#[async_trait]
impl IdentityProvider for MockIdentityService {
    async fn verify(&self, actor_id: &str) -> Result<Role, AppError> {
        if actor_id.starts_with("unknown") {
            return Err(AppError::NotAuthorized("Unknown actor".into()));
        }
        if actor_id.starts_with("teacher:") {
            return Ok(Role::Teacher);
        }
        Ok(Role::Student)
    }
}

/// Records every hold/capture/release so tests can assert the payment
/// protocol without a real collaborator.
pub struct MockPaymentService {
    next_ref: AtomicU64,
    pub events: Mutex<Vec<String>>,
}

impl MockPaymentService {
    pub fn new() -> Self {
        Self {
            next_ref: AtomicU64::new(1),
            events: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn count(&self, prefix: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

#[async_trait]
impl PaymentAuthorizer for MockPaymentService {
    async fn hold(&self, student_id: &str, amount: i64) -> Result<String, AppError> {
        let hold_ref = format!("hold-{}", self.next_ref.fetch_add(1, Ordering::SeqCst));
        self.events.lock().unwrap().push(format!("hold:{}:{}:{}", hold_ref, student_id, amount));
        Ok(hold_ref)
    }

    async fn capture(&self, hold_ref: &str) -> Result<(), AppError> {
        self.events.lock().unwrap().push(format!("capture:{}", hold_ref));
        Ok(())
    }

    async fn release(&self, hold_ref: &str) -> Result<(), AppError> {
        self.events.lock().unwrap().push(format!("release:{}", hold_ref));
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub payment: Arc<MockPaymentService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            payment_service_url: "http://localhost".to_string(),
            payment_service_token: "token".to_string(),
            identity_service_url: "http://localhost".to_string(),
            identity_service_token: "token".to_string(),
            min_lead_time_min: 60,
            reserve_retry_attempts: 2,
            reserve_retry_base_ms: 10,
        };

        let teacher_repo = Arc::new(SqliteTeacherRepo::new(pool.clone()));
        let session_type_repo = Arc::new(SqliteSessionTypeRepo::new(pool.clone()));
        let rule_repo = Arc::new(SqliteAvailabilityRuleRepo::new(pool.clone()));
        let exception_repo = Arc::new(SqliteDateExceptionRepo::new(pool.clone()));
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));

        let identity_service = Arc::new(MockIdentityService);
        let payment = Arc::new(MockPaymentService::new());

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
            payment_service: payment.clone(),
            min_lead_time_min: config.min_lead_time_min,
            retry_attempts: config.reserve_retry_attempts,
            retry_base_ms: config.reserve_retry_base_ms,
        }));

        let state = Arc::new(AppState {
            config,
            teacher_repo,
            session_type_repo,
            rule_repo,
            exception_repo,
            booking_repo,
            identity_service,
            payment_service: payment.clone(),
            booking_service,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            payment,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
