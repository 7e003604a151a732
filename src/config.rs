use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub payment_service_url: String,
    pub payment_service_token: String,
    pub identity_service_url: String,
    pub identity_service_token: String,
    /// Minimum minutes between "now" and a bookable slot's start.
    pub min_lead_time_min: i64,
    /// Bounded retries for transient storage failures inside Book.
    pub reserve_retry_attempts: u32,
    pub reserve_retry_base_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            payment_service_url: env::var("PAYMENT_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8100/api/v1".to_string()),
            payment_service_token: env::var("PAYMENT_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            identity_service_url: env::var("IDENTITY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8200/api/v1".to_string()),
            identity_service_token: env::var("IDENTITY_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            min_lead_time_min: env::var("MIN_LEAD_TIME_MIN").unwrap_or_else(|_| "60".to_string()).parse().expect("MIN_LEAD_TIME_MIN must be a number"),
            reserve_retry_attempts: env::var("RESERVE_RETRY_ATTEMPTS").unwrap_or_else(|_| "3".to_string()).parse().expect("RESERVE_RETRY_ATTEMPTS must be a number"),
            reserve_retry_base_ms: env::var("RESERVE_RETRY_BASE_MS").unwrap_or_else(|_| "50".to_string()).parse().expect("RESERVE_RETRY_BASE_MS must be a number"),
        }
    }
}
