use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::verify_session::{CreateSubscriptionInput, SubscriptionRepoTrait},
    domain::entities::subscription::{SubscriptionProfile, SubscriptionStatus},
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> SubscriptionProfile {
    let status: String = row.get("status");

    SubscriptionProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        plan_name: row.get("plan_name"),
        status: SubscriptionStatus::from_db(&status),
        includes_addon: row.get("includes_addon"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        stripe_session_id: row.get("stripe_session_id"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, plan_id, plan_name, status, includes_addon,
    start_date, end_date, stripe_session_id, created_at
"#;

#[async_trait]
impl SubscriptionRepoTrait for PostgresPersistence {
    async fn get_by_stripe_session_id(
        &self,
        stripe_session_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE stripe_session_id = $1",
            SELECT_COLS
        ))
        .bind(stripe_session_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;

        Ok(row.as_ref().map(row_to_profile))
    }

    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<SubscriptionProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscriptions
                (user_id, plan_id, plan_name, status, includes_addon,
                 start_date, end_date, stripe_session_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(input.user_id)
        .bind(&input.plan_id)
        .bind(&input.plan_name)
        .bind(input.status.as_str())
        .bind(input.includes_addon)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.stripe_session_id)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;

        Ok(row_to_profile(&row))
    }
}
