//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    application::ports::payment_provider::{
        CheckoutPaymentStatus, CheckoutSession, CheckoutSessionId,
    },
    domain::entities::{
        subscription::{SubscriptionProfile, SubscriptionStatus},
        user_profile::UserProfile,
    },
};

pub const TEST_EMAIL: &str = "ana@example.com";

/// Create a paid checkout session whose metadata names a one month plan for
/// [`TEST_EMAIL`].
pub fn create_test_session(overrides: impl FnOnce(&mut CheckoutSession)) -> CheckoutSession {
    let metadata: HashMap<String, String> = [
        ("email", TEST_EMAIL),
        ("planId", "fit-pro"),
        ("planName", "Plan Pro"),
        ("duration", "1 mes"),
        ("addOnIncluded", "false"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let mut session = CheckoutSession {
        id: CheckoutSessionId::new(format!("cs_test_{}", Uuid::new_v4().simple())),
        payment_status: CheckoutPaymentStatus::Paid,
        metadata,
    };
    overrides(&mut session);
    session
}

/// Create a registered user with [`TEST_EMAIL`].
pub fn create_test_profile(overrides: impl FnOnce(&mut UserProfile)) -> UserProfile {
    let mut profile = UserProfile {
        user_id: Uuid::new_v4(),
        email: TEST_EMAIL.to_string(),
    };
    overrides(&mut profile);
    profile
}

/// Create an active one month subscription for the given user and session.
pub fn create_test_subscription(
    user_id: Uuid,
    stripe_session_id: &str,
    overrides: impl FnOnce(&mut SubscriptionProfile),
) -> SubscriptionProfile {
    let start = test_datetime();
    let mut subscription = SubscriptionProfile {
        id: Uuid::new_v4(),
        user_id,
        plan_id: "fit-pro".to_string(),
        plan_name: "Plan Pro".to_string(),
        status: SubscriptionStatus::Active,
        includes_addon: false,
        start_date: start,
        end_date: start + chrono::Duration::days(31),
        stripe_session_id: stripe_session_id.to_string(),
        created_at: Some(start),
    };
    overrides(&mut subscription);
    subscription
}

/// Returns a fixed datetime for deterministic tests.
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
}
