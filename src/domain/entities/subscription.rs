use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Canceled,
    /// Written by another process (the lifecycle job, manual edits). Kept
    /// verbatim so reading a row never fails on its status.
    Other(String),
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Other(raw) => raw,
        }
    }

    /// Parse the stored text column.
    pub fn from_db(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => SubscriptionStatus::Active,
            "expired" => SubscriptionStatus::Expired,
            "canceled" | "cancelled" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Other(s.to_string()),
        }
    }
}

/// A row of the `subscriptions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: String,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub includes_addon: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub stripe_session_id: String,
    pub created_at: Option<DateTime<Utc>>,
}
