use std::collections::HashMap;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::plan_duration::PlanDuration,
};

pub const UNKNOWN_PLAN_ID: &str = "unknown";

/// Purchase details the checkout step stores in the session metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub email: String,
    pub plan_id: String,
    pub plan_name: String,
    pub duration: PlanDuration,
    pub includes_addon: bool,
}

impl CheckoutMetadata {
    /// Resolve metadata keys `email`, `planId`, `planName`, `duration` and
    /// `addOnIncluded`.
    ///
    /// `email` and `planName` are mandatory; their absence means the checkout
    /// session was created incorrectly and is reported as
    /// [`AppError::MissingMetadata`].
    pub fn from_metadata(metadata: &HashMap<String, String>) -> AppResult<Self> {
        let get = |key: &str| {
            metadata
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let email = get("email").ok_or(AppError::MissingMetadata)?;
        let plan_name = get("planName").ok_or(AppError::MissingMetadata)?;

        Ok(Self {
            email: email.to_string(),
            plan_id: get("planId").unwrap_or(UNKNOWN_PLAN_ID).to_string(),
            plan_name: plan_name.to_string(),
            duration: PlanDuration::parse(get("duration").unwrap_or_default()),
            includes_addon: get("addOnIncluded") == Some("true"),
        })
    }
}
