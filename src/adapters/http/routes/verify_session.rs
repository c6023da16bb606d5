//! Checkout session verification endpoint.
//!
//! Business outcomes are reported with `success` plus an outcome-specific
//! shape; faults go through `AppError` as 500 `{ "error": ... }`.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::verify_session::{NEEDS_ACCOUNT, PAYMENT_NOT_COMPLETED, VerifyOutcome},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/verify-session", post(verify_session).options(preflight))
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct VerifySessionRequest {
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifySessionResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    already_processed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    needs_account: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan_exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

fn render(outcome: VerifyOutcome) -> (StatusCode, VerifySessionResponse) {
    match outcome {
        VerifyOutcome::PaymentIncomplete => (
            StatusCode::BAD_REQUEST,
            VerifySessionResponse {
                success: false,
                error: Some(PAYMENT_NOT_COMPLETED),
                ..Default::default()
            },
        ),
        VerifyOutcome::AlreadyProcessed {
            subscription_id,
            plan_exists,
        } => (
            StatusCode::OK,
            VerifySessionResponse {
                success: true,
                already_processed: Some(true),
                subscription_id: Some(subscription_id),
                plan_exists: Some(plan_exists),
                ..Default::default()
            },
        ),
        VerifyOutcome::NeedsAccount => (
            StatusCode::OK,
            VerifySessionResponse {
                success: false,
                needs_account: Some(true),
                error: Some(NEEDS_ACCOUNT),
                ..Default::default()
            },
        ),
        VerifyOutcome::Activated {
            subscription_id,
            user_id,
        } => (
            StatusCode::OK,
            VerifySessionResponse {
                success: true,
                subscription_id: Some(subscription_id),
                user_id: Some(user_id),
                ..Default::default()
            },
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /functions/v1/verify-session
/// Confirms a Stripe checkout session and activates its subscription.
async fn verify_session(
    State(app_state): State<AppState>,
    body: Bytes,
) -> AppResult<Response> {
    let request: VerifySessionRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(step = "Validate input", error = %e, "Rejected unparseable request body");
        AppError::InvalidInput(format!("Invalid request body: {e}"))
    })?;

    let outcome = app_state
        .verify_session_use_cases
        .verify(request.session_id.as_deref().unwrap_or_default())
        .await?;

    let (status, response) = render(outcome);
    Ok((status, Json(response)).into_response())
}

/// OPTIONS /functions/v1/verify-session
/// Real CORS preflights are answered by the CORS layer before reaching here.
async fn preflight() -> StatusCode {
    StatusCode::OK
}
