use crate::domain::ports::PaymentAuthorizer;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Adapter for the external payment-authorization service. Holds are
/// placed before a reserve, captured on confirmation, released on reject.
pub struct HttpPaymentService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPaymentService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<reqwest::Response, AppError> {
        let res = self.client.post(format!("{}{}", self.api_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Payment service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Payment service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }
        Ok(res)
    }
}

#[derive(Serialize)]
struct HoldPayload<'a> {
    student_id: &'a str,
    amount: i64,
}

#[derive(Deserialize)]
struct HoldResponse {
    hold_ref: String,
}

#[derive(Serialize)]
struct HoldRefPayload<'a> {
    hold_ref: &'a str,
}

#[async_trait]
impl PaymentAuthorizer for HttpPaymentService {
    async fn hold(&self, student_id: &str, amount: i64) -> Result<String, AppError> {
        let res = self.post("/holds", &HoldPayload { student_id, amount }).await?;
        let body: HoldResponse = res.json().await
            .map_err(|e| AppError::InternalWithMsg(format!("Payment service returned invalid hold response: {}", e)))?;
        Ok(body.hold_ref)
    }

    async fn capture(&self, hold_ref: &str) -> Result<(), AppError> {
        self.post("/captures", &HoldRefPayload { hold_ref }).await?;
        Ok(())
    }

    async fn release(&self, hold_ref: &str) -> Result<(), AppError> {
        self.post("/releases", &HoldRefPayload { hold_ref }).await?;
        Ok(())
    }
}
