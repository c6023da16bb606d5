use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::verify_session::ProfileRepoTrait,
    domain::entities::user_profile::UserProfile,
};

#[async_trait]
impl ProfileRepoTrait for PostgresPersistence {
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query("SELECT user_id, email FROM profiles WHERE email = $1 LIMIT 1")
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(AppError::from)?;

        Ok(row.map(|row| UserProfile {
            user_id: row.get("user_id"),
            email: row.get("email"),
        }))
    }
}
