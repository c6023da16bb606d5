use std::collections::HashMap;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::app_error::{AppError, AppResult};

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    api_base: Url,
    secret_key: SecretString,
    api_version: String,
}

impl StripeClient {
    pub fn new(client: Client, api_base: Url, secret_key: SecretString, api_version: String) -> Self {
        Self {
            client,
            api_base,
            secret_key,
            api_version,
        }
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:", self.secret_key.expose_secret()));
        format!("Basic {}", encoded)
    }

    /// `{api_base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Stripe API base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ========================================================================
    // Checkout Sessions
    // ========================================================================

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> AppResult<StripeCheckoutSession> {
        let url = self.endpoint(&["checkout", "sessions", session_id])?;

        let response = self
            .client
            .get(url)
            .header("Authorization", self.auth_header())
            .header("Stripe-Version", &self.api_version)
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Stripe API error");
            return Err(parse_error_body(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Stripe response");
            AppError::PaymentProvider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

fn parse_error_body(status: reqwest::StatusCode, body: &str) -> AppError {
    match serde_json::from_str::<StripeErrorResponse>(body) {
        Ok(error) => AppError::PaymentProvider(
            error.error.message.unwrap_or(error.error.error_type),
        ),
        Err(_) => AppError::PaymentProvider(format!("Stripe API error: {} - {}", status, body)),
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub payment_status: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeError,
}

#[derive(Debug, Deserialize)]
pub struct StripeError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: Option<String>,
}
