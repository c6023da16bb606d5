use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app_error::AppResult;

// ============================================================================
// Port Types - Provider-agnostic domain types
// ============================================================================

/// Identifier of a hosted checkout session in the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutSessionId(pub String);

impl CheckoutSessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CheckoutSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment state of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    #[serde(other)]
    Unknown,
}

impl CheckoutPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPaymentStatus::Paid => "paid",
            CheckoutPaymentStatus::Unpaid => "unpaid",
            CheckoutPaymentStatus::NoPaymentRequired => "no_payment_required",
            CheckoutPaymentStatus::Unknown => "unknown",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, CheckoutPaymentStatus::Paid)
    }
}

/// The parts of a checkout session the activation workflow reads.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: CheckoutSessionId,
    pub payment_status: CheckoutPaymentStatus,
    pub metadata: HashMap<String, String>,
}

// ============================================================================
// Checkout Session Port
// ============================================================================

#[async_trait]
pub trait CheckoutSessionPort: Send + Sync {
    /// Fetch a checkout session by id from the payment provider.
    async fn retrieve_checkout_session(
        &self,
        session_id: &CheckoutSessionId,
    ) -> AppResult<CheckoutSession>;
}
