use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::models::booking::{Booking, NewBookingParams};
use crate::domain::ports::{
    AvailabilityRuleRepository, BookingRepository, DateExceptionRepository,
    SessionTypeRepository, TeacherRepository,
};
use crate::domain::services::{recurrence, slots};
use crate::error::{is_unique_violation, AppError, ConflictKind};

#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub teacher_id: String,
    pub student_id: String,
    pub session_type_id: String,
    pub start: DateTime<Utc>,
    pub idempotency_key: String,
    pub payment_ref: Option<String>,
}

type SlotKey = (String, String, DateTime<Utc>);
type StudentKey = (String, String);

/// The only component allowed to mutate booking state. `reserve` is
/// strictly serialized per (teacher, session type, start) tuple; calls for
/// distinct tuples proceed in parallel. A second lock tier per (teacher,
/// student) closes the cross-session-type double-booking race: the student
/// overlap scan spans all of a teacher's session types, so it cannot rely
/// on the slot lock alone. Locks are always taken slot-first, student-second.
pub struct BookingLedger {
    teacher_repo: Arc<dyn TeacherRepository>,
    rule_repo: Arc<dyn AvailabilityRuleRepository>,
    exception_repo: Arc<dyn DateExceptionRepository>,
    session_type_repo: Arc<dyn SessionTypeRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    min_lead_time: Duration,
    slot_locks: Mutex<HashMap<SlotKey, Arc<Mutex<()>>>>,
    student_locks: Mutex<HashMap<StudentKey, Arc<Mutex<()>>>>,
}

impl BookingLedger {
    pub fn new(
        teacher_repo: Arc<dyn TeacherRepository>,
        rule_repo: Arc<dyn AvailabilityRuleRepository>,
        exception_repo: Arc<dyn DateExceptionRepository>,
        session_type_repo: Arc<dyn SessionTypeRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        min_lead_time: Duration,
    ) -> Self {
        Self {
            teacher_repo,
            rule_repo,
            exception_repo,
            session_type_repo,
            booking_repo,
            min_lead_time,
            slot_locks: Mutex::new(HashMap::new()),
            student_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn reserve(&self, req: ReserveRequest) -> Result<Booking, AppError> {
        // Retried requests must reuse their idempotency key; the original
        // outcome wins regardless of what happened to the slot since.
        if let Some(existing) = self.booking_repo.find_by_idempotency_key(&req.idempotency_key).await? {
            info!("reserve: idempotent replay for key {}, returning booking {}", req.idempotency_key, existing.id);
            return Ok(existing);
        }

        let teacher = self.teacher_repo.find_by_id(&req.teacher_id).await?
            .ok_or(AppError::NotFound("Teacher not found".into()))?;
        let session_type = self.session_type_repo.find_by_id(&req.teacher_id, &req.session_type_id).await?
            .ok_or(AppError::Conflict(ConflictKind::SlotNotFound))?;

        self.validate_slot_exists(&teacher.timezone, &req, &session_type).await?;

        let slot_lock = self.slot_lock(&req).await;
        let _slot_guard = slot_lock.lock().await;
        let student_lock = self.student_lock(&req).await;
        let _student_guard = student_lock.lock().await;

        // A concurrent retry with the same key may have won the insert
        // while we waited on the locks.
        if let Some(existing) = self.booking_repo.find_by_idempotency_key(&req.idempotency_key).await? {
            info!("reserve: idempotent replay for key {}, returning booking {}", req.idempotency_key, existing.id);
            return Ok(existing);
        }

        let seats = self.booking_repo
            .count_confirmed_at(&req.teacher_id, &req.session_type_id, req.start)
            .await?;
        if seats >= session_type.capacity as i64 {
            warn!(
                "reserve rejected: capacity {} reached for teacher {} session type {} at {}",
                session_type.capacity, req.teacher_id, req.session_type_id, req.start
            );
            return Err(AppError::Conflict(ConflictKind::CapacityExceeded));
        }

        let end = req.start + Duration::minutes(session_type.duration_min as i64);
        let overlapping = self.booking_repo
            .list_confirmed_overlapping_for_student(&req.teacher_id, &req.student_id, req.start, end)
            .await?;
        if !overlapping.is_empty() {
            warn!(
                "reserve rejected: student {} already booked with teacher {} between {} and {}",
                req.student_id, req.teacher_id, req.start, end
            );
            return Err(AppError::Conflict(ConflictKind::StudentDoubleBooked));
        }

        let booking = Booking::new(NewBookingParams {
            teacher_id: req.teacher_id.clone(),
            student_id: req.student_id.clone(),
            session_type_id: req.session_type_id.clone(),
            start: req.start,
            duration_min: session_type.duration_min,
            price: session_type.price,
            idempotency_key: req.idempotency_key.clone(),
            payment_ref: req.payment_ref.clone(),
        });

        match self.booking_repo.insert_confirmed(&booking).await {
            Ok(created) => {
                info!("booking confirmed: {} ({} seats now taken)", created.id, seats + 1);
                Ok(created)
            }
            // A concurrent replay of the same request won the insert; the
            // unique index on idempotency_key is the backstop.
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                let existing = self.booking_repo.find_by_idempotency_key(&req.idempotency_key).await?
                    .ok_or(AppError::Database(e))?;
                info!("reserve: lost idempotency race, returning booking {}", existing.id);
                Ok(existing)
            }
            Err(e) => Err(e),
        }
    }

    /// Transitions CONFIRMED -> CANCELLED. Only the booking's student or
    /// teacher may cancel. Rows are never deleted.
    pub async fn cancel(&self, booking_id: &str, actor_id: &str) -> Result<Booking, AppError> {
        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        if actor_id != booking.student_id && actor_id != booking.teacher_id {
            return Err(AppError::NotAuthorized("Only the booking's student or teacher may cancel".into()));
        }
        if booking.status == "CANCELLED" {
            return Err(AppError::Conflict(ConflictKind::AlreadyCancelled));
        }

        let cancelled = self.booking_repo.mark_cancelled(booking_id, actor_id).await?
            .ok_or(AppError::Conflict(ConflictKind::AlreadyCancelled))?;
        info!("booking cancelled: {} by {}", cancelled.id, actor_id);
        Ok(cancelled)
    }

    /// Re-derives the one targeted slot from the teacher's current rules
    /// and exceptions rather than trusting the client. Any ambiguity is
    /// SlotNotFound, pushing the client back to availability.
    async fn validate_slot_exists(
        &self,
        timezone: &str,
        req: &ReserveRequest,
        session_type: &crate::domain::models::session_type::SessionType,
    ) -> Result<(), AppError> {
        if req.start < Utc::now() + self.min_lead_time {
            return Err(AppError::Conflict(ConflictKind::SlotNotFound));
        }

        let tz: Tz = timezone.parse().unwrap_or(chrono_tz::UTC);
        let date = req.start.with_timezone(&tz).date_naive();

        let rules = self.rule_repo.list_active(&req.teacher_id).await?;
        let exceptions = self.exception_repo.list_by_date(&req.teacher_id, date).await?;
        let raw = recurrence::expand(&rules, &exceptions, tz, date, date + Duration::days(1));

        if !slots::contains_slot(&raw, session_type, req.start) {
            warn!(
                "reserve rejected: no derivable slot for teacher {} session type {} at {}",
                req.teacher_id, req.session_type_id, req.start
            );
            return Err(AppError::Conflict(ConflictKind::SlotNotFound));
        }
        Ok(())
    }

    async fn slot_lock(&self, req: &ReserveRequest) -> Arc<Mutex<()>> {
        let key = (req.teacher_id.clone(), req.session_type_id.clone(), req.start);
        let mut table = self.slot_locks.lock().await;
        table.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    async fn student_lock(&self, req: &ReserveRequest) -> Arc<Mutex<()>> {
        let key = (req.teacher_id.clone(), req.student_id.clone());
        let mut table = self.student_locks.lock().await;
        table.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}
