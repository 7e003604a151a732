use crate::domain::ports::{IdentityProvider, Role};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

/// Adapter for the external identity service: resolves an opaque actor id
/// to its marketplace role. Authentication happens upstream of this crate.
pub struct HttpIdentityService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpIdentityService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct VerifyResponse {
    role: String,
}

#[async_trait]
impl IdentityProvider for HttpIdentityService {
    async fn verify(&self, actor_id: &str) -> Result<Role, AppError> {
        let res = self.client.get(format!("{}/actors/{}", self.api_url, actor_id))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Identity service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotAuthorized("Unknown actor".into()));
        }
        if !res.status().is_success() {
            let status = res.status();
            let msg = format!("Identity service failed. Status: {}", status);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        let body: VerifyResponse = res.json().await
            .map_err(|e| AppError::InternalWithMsg(format!("Identity service returned invalid response: {}", e)))?;

        match body.role.as_str() {
            "TEACHER" => Ok(Role::Teacher),
            "STUDENT" => Ok(Role::Student),
            other => Err(AppError::InternalWithMsg(format!("Identity service returned unknown role: {}", other))),
        }
    }
}
