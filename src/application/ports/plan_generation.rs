use async_trait::async_trait;
use uuid::Uuid;

use crate::app_error::AppResult;

/// Downstream service that builds the personalised plan for a new
/// subscription.
///
/// Callers treat this as best effort: the activation is already recorded when
/// it is invoked, and its result never reaches the HTTP response.
#[async_trait]
pub trait PlanGenerationTrigger: Send + Sync {
    async fn trigger(&self, user_id: Uuid, subscription_id: Uuid) -> AppResult<()>;
}
