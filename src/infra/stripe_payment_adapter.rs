use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use url::Url;

use crate::{
    app_error::AppResult,
    application::ports::payment_provider::{
        CheckoutPaymentStatus, CheckoutSession, CheckoutSessionId, CheckoutSessionPort,
    },
    infra::stripe_client::{StripeCheckoutSession, StripeClient},
};

/// Adapter that wraps StripeClient to implement CheckoutSessionPort.
#[derive(Clone)]
pub struct StripePaymentAdapter {
    client: StripeClient,
}

impl StripePaymentAdapter {
    pub fn new(http: Client, api_base: Url, secret_key: SecretString, api_version: String) -> Self {
        Self {
            client: StripeClient::new(http, api_base, secret_key, api_version),
        }
    }

    /// Convert Stripe payment status to domain status
    fn map_payment_status(status: &str) -> CheckoutPaymentStatus {
        match status {
            "paid" => CheckoutPaymentStatus::Paid,
            "unpaid" => CheckoutPaymentStatus::Unpaid,
            "no_payment_required" => CheckoutPaymentStatus::NoPaymentRequired,
            _ => CheckoutPaymentStatus::Unknown,
        }
    }

    fn to_checkout_session(session: StripeCheckoutSession) -> CheckoutSession {
        CheckoutSession {
            id: CheckoutSessionId::new(session.id),
            payment_status: Self::map_payment_status(&session.payment_status),
            metadata: session.metadata.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl CheckoutSessionPort for StripePaymentAdapter {
    async fn retrieve_checkout_session(
        &self,
        session_id: &CheckoutSessionId,
    ) -> AppResult<CheckoutSession> {
        let session = self
            .client
            .retrieve_checkout_session(session_id.as_str())
            .await?;

        Ok(Self::to_checkout_session(session))
    }
}
