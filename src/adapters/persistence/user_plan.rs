use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::verify_session::UserPlanRepoTrait,
};

#[async_trait]
impl UserPlanRepoTrait for PostgresPersistence {
    async fn exists_for_subscription(&self, subscription_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_plans WHERE subscription_id = $1)",
        )
        .bind(subscription_id)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)
    }
}
