use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    AvailabilityRuleRepository, BookingRepository, DateExceptionRepository, IdentityProvider,
    PaymentAuthorizer, SessionTypeRepository, TeacherRepository,
};
use crate::domain::services::booking_service::BookingService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub teacher_repo: Arc<dyn TeacherRepository>,
    pub session_type_repo: Arc<dyn SessionTypeRepository>,
    pub rule_repo: Arc<dyn AvailabilityRuleRepository>,
    pub exception_repo: Arc<dyn DateExceptionRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub identity_service: Arc<dyn IdentityProvider>,
    pub payment_service: Arc<dyn PaymentAuthorizer>,
    pub booking_service: Arc<BookingService>,
}
