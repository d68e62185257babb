use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::{AuthError, AuthProvider, Identity, Session};

/// Client for the hosted auth API (`<base>/auth/v1`).
pub struct GoTrueClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl GoTrueClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let base_url = Url::parse(base_url).map_err(|e| AuthError::Network(format!("invalid auth url: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Network(e.to_string()))?;
        Ok(Self { client, base_url, api_key: api_key.into() })
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let full = format!("{}/auth/v1/{}", url.path().trim_end_matches('/'), path);
        url.set_path(&full);
        url
    }

    async fn read<T: DeserializeOwned>(
        response: reqwest::Response,
        rejected: impl FnOnce(String) -> AuthError,
    ) -> Result<T, AuthError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| AuthError::Network(e.to_string()))?;
        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| AuthError::Rejected { status: status.as_u16(), message: e.to_string() });
        }

        let message = error_message(&body).unwrap_or_else(|| format!("status {}", status));
        match status {
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND
            | StatusCode::UNPROCESSABLE_ENTITY => Err(rejected(message)),
            _ => Err(AuthError::Rejected { status: status.as_u16(), message }),
        }
    }
}

/// Auth API errors use several shapes (`msg`, `error_description`, `message`).
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<Session, AuthError> {
        let mut url = self.endpoint("token");
        url.query_pairs_mut().append_pair("grant_type", "pkce");

        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&json!({ "auth_code": code, "code_verifier": code_verifier.unwrap_or_default() }))
            .send()
            .await
            .map_err(|e| {
                warn!("Code exchange request failed: {}", e);
                AuthError::Network(e.to_string())
            })?;

        let session: Session = Self::read(response, AuthError::InvalidCode).await?;
        debug!("Exchanged sign-in code for user {}", session.user.id);
        Ok(session)
    }

    async fn user_for_token(&self, access_token: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        Self::read(response, AuthError::InvalidToken).await
    }
}
