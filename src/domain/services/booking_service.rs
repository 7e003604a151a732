use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use rand::Rng;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::models::booking::Booking;
use crate::domain::models::slot::SlotInstance;
use crate::domain::ports::{
    AvailabilityRuleRepository, BookingRepository, DateExceptionRepository, IdentityProvider,
    PaymentAuthorizer, Role, SessionTypeRepository, TeacherRepository,
};
use crate::domain::services::ledger::{BookingLedger, ReserveRequest};
use crate::domain::services::{recurrence, slots};
use crate::error::{is_transient, AppError, ConflictKind};

#[derive(Debug, Clone)]
pub struct BookRequest {
    pub teacher_id: String,
    pub student_id: String,
    pub session_type_id: String,
    pub start: chrono::DateTime<Utc>,
    pub idempotency_key: String,
}

/// The orchestrator exposed to callers: availability queries are stateless
/// reads; Book drives payment hold -> ledger reserve -> capture/release
/// with bounded retries on transient storage failures. Semantic conflicts
/// are surfaced verbatim, never retried.
pub struct BookingService {
    teacher_repo: Arc<dyn TeacherRepository>,
    rule_repo: Arc<dyn AvailabilityRuleRepository>,
    exception_repo: Arc<dyn DateExceptionRepository>,
    session_type_repo: Arc<dyn SessionTypeRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    ledger: Arc<BookingLedger>,
    identity_service: Arc<dyn IdentityProvider>,
    payment_service: Arc<dyn PaymentAuthorizer>,
    min_lead_time: Duration,
    retry_attempts: u32,
    retry_base_ms: u64,
}

pub struct BookingServiceDeps {
    pub teacher_repo: Arc<dyn TeacherRepository>,
    pub rule_repo: Arc<dyn AvailabilityRuleRepository>,
    pub exception_repo: Arc<dyn DateExceptionRepository>,
    pub session_type_repo: Arc<dyn SessionTypeRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub ledger: Arc<BookingLedger>,
    pub identity_service: Arc<dyn IdentityProvider>,
    pub payment_service: Arc<dyn PaymentAuthorizer>,
    pub min_lead_time_min: i64,
    pub retry_attempts: u32,
    pub retry_base_ms: u64,
}

impl BookingService {
    pub fn new(deps: BookingServiceDeps) -> Self {
        Self {
            teacher_repo: deps.teacher_repo,
            rule_repo: deps.rule_repo,
            exception_repo: deps.exception_repo,
            session_type_repo: deps.session_type_repo,
            booking_repo: deps.booking_repo,
            ledger: deps.ledger,
            identity_service: deps.identity_service,
            payment_service: deps.payment_service,
            min_lead_time: Duration::minutes(deps.min_lead_time_min),
            retry_attempts: deps.retry_attempts,
            retry_base_ms: deps.retry_base_ms,
        }
    }

    /// Pure read over one consistent bookings snapshot. May race with
    /// concurrent reserves (a returned slot can be taken a moment later;
    /// Reserve revalidates), but never omits a genuinely available slot.
    pub async fn get_availability(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SlotInstance>, AppError> {
        let teacher = self.teacher_repo.find_by_id(teacher_id).await?
            .ok_or(AppError::NotFound("Teacher not found".into()))?;
        let tz: Tz = teacher.timezone.parse().unwrap_or(chrono_tz::UTC);

        let rules = self.rule_repo.list_active(teacher_id).await?;
        let exceptions = self.exception_repo.list_by_range(teacher_id, from, to).await?;
        let raw = recurrence::expand(&rules, &exceptions, tz, from, to + Duration::days(1));

        let (Some(window_start), Some(window_end)) =
            (raw.iter().map(|i| i.start).min(), raw.iter().map(|i| i.end).max())
        else {
            return Ok(Vec::new());
        };
        let bookings = self.booking_repo
            .list_confirmed_in_range(teacher_id, window_start, window_end)
            .await?;
        let session_types = self.session_type_repo.list(teacher_id).await?;

        Ok(slots::materialize(
            teacher_id,
            &raw,
            &session_types,
            &bookings,
            Utc::now(),
            self.min_lead_time,
        ))
    }

    /// Request state machine: Pending -> {Confirmed, Rejected}. Either the
    /// ledger row exists and the hold is captured, or no booking state is
    /// visible and the hold is released.
    pub async fn book(&self, req: BookRequest) -> Result<Booking, AppError> {
        // Replays short-circuit before payment: the original request
        // already settled its hold.
        if let Some(existing) = self.booking_repo.find_by_idempotency_key(&req.idempotency_key).await? {
            info!("book: idempotent replay, returning booking {}", existing.id);
            return Ok(existing);
        }

        let role = self.identity_service.verify(&req.student_id).await?;
        if role != Role::Student {
            return Err(AppError::NotAuthorized("Only students may book sessions".into()));
        }

        let session_type = self.session_type_repo.find_by_id(&req.teacher_id, &req.session_type_id).await?
            .ok_or(AppError::Conflict(ConflictKind::SlotNotFound))?;

        let hold_ref = self.payment_service.hold(&req.student_id, session_type.price).await?;

        let reserve_req = ReserveRequest {
            teacher_id: req.teacher_id.clone(),
            student_id: req.student_id.clone(),
            session_type_id: req.session_type_id.clone(),
            start: req.start,
            idempotency_key: req.idempotency_key.clone(),
            payment_ref: Some(hold_ref.clone()),
        };

        let mut attempt = 0u32;
        loop {
            match self.ledger.reserve(reserve_req.clone()).await {
                Ok(booking) => {
                    if booking.payment_ref.as_deref() == Some(hold_ref.as_str()) {
                        if let Err(e) = self.payment_service.capture(&hold_ref).await {
                            error!("payment capture failed for booking {}: {}", booking.id, e);
                        }
                    } else {
                        // An idempotency race returned a booking created by
                        // another request; our hold has no booking to back.
                        self.release_hold(&hold_ref).await;
                    }
                    return Ok(booking);
                }
                Err(AppError::Database(e)) if is_transient(&e) => {
                    attempt += 1;
                    if attempt > self.retry_attempts {
                        warn!("reserve failed after {} transient retries: {}", self.retry_attempts, e);
                        self.release_hold(&hold_ref).await;
                        return Err(AppError::Transient("Booking storage is contended, please retry".into()));
                    }
                    let backoff = self.backoff_delay(attempt);
                    warn!("transient reserve failure (attempt {}), retrying in {:?}: {}", attempt, backoff, e);
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => {
                    self.release_hold(&hold_ref).await;
                    return Err(err);
                }
            }
        }
    }

    pub async fn cancel(&self, booking_id: &str, actor_id: &str) -> Result<Booking, AppError> {
        self.identity_service.verify(actor_id).await?;
        self.ledger.cancel(booking_id, actor_id).await
    }

    async fn release_hold(&self, hold_ref: &str) {
        if let Err(e) = self.payment_service.release(hold_ref).await {
            error!("payment release failed for hold {}: {}", hold_ref, e);
        }
    }

    fn backoff_delay(&self, attempt: u32) -> std::time::Duration {
        let base = self.retry_base_ms * 2u64.saturating_pow(attempt - 1);
        let jitter = rand::thread_rng().gen_range(0..=self.retry_base_ms);
        std::time::Duration::from_millis(base + jitter)
    }
}
