//! Persistence over the Supabase PostgREST API, used when no direct
//! `DATABASE_URL` is configured. Requests authenticate with the service role
//! key and therefore bypass row level security.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::verify_session::{
        CreateSubscriptionInput, ProfileRepoTrait, SubscriptionRepoTrait, UserPlanRepoTrait,
    },
    domain::entities::{
        subscription::{SubscriptionProfile, SubscriptionStatus},
        user_profile::UserProfile,
    },
};

const UNIQUE_VIOLATION: &str = "23505";
const SUBSCRIPTION_COLUMNS: &str = "id,user_id,plan_id,plan_name,status,includes_addon,start_date,end_date,stripe_session_id,created_at";

#[derive(Clone)]
pub struct SupabaseRestPersistence {
    client: Client,
    base_url: Url,
    service_role_key: SecretString,
}

impl SupabaseRestPersistence {
    pub fn new(client: Client, supabase_url: Url, service_role_key: SecretString) -> Self {
        Self {
            client,
            base_url: supabase_url,
            service_role_key,
        }
    }

    /// `{supabase_url}/rest/v1/{table}` with the given query pairs.
    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("SUPABASE_URL cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_role_key.expose_secret();
        request
            .header("apikey", key)
            .bearer_auth(key)
            .header("Accept", "application/json")
    }

    async fn select<T: DeserializeOwned>(&self, url: Url) -> AppResult<Vec<T>> {
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| AppError::Database(format!("Supabase request failed: {e}")))?;

        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::Database(format!("Failed to read Supabase response: {e}")))?;

    if !status.is_success() {
        return Err(classify_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(body = %body, error = %e, "Failed to parse Supabase response");
        AppError::Database(format!("Failed to parse Supabase response: {e}"))
    })
}

fn classify_error(status: StatusCode, body: &str) -> AppError {
    let error = serde_json::from_str::<PostgrestError>(body).ok();

    if status == StatusCode::CONFLICT
        || error.as_ref().and_then(|e| e.code.as_deref()) == Some(UNIQUE_VIOLATION)
    {
        return AppError::DuplicateSession;
    }

    tracing::error!(status = %status, body = %body, "Supabase API error");
    match error.and_then(|e| e.message) {
        Some(message) => AppError::Database(message),
        None => AppError::Database(format!("Supabase API error: {status}")),
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan_id: String,
    plan_name: String,
    status: String,
    includes_addon: bool,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    stripe_session_id: String,
    created_at: Option<DateTime<Utc>>,
}

impl From<SubscriptionRow> for SubscriptionProfile {
    fn from(row: SubscriptionRow) -> Self {
        SubscriptionProfile {
            id: row.id,
            user_id: row.user_id,
            plan_id: row.plan_id,
            plan_name: row.plan_name,
            status: SubscriptionStatus::from_db(&row.status),
            includes_addon: row.includes_addon,
            start_date: row.start_date,
            end_date: row.end_date,
            stripe_session_id: row.stripe_session_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewSubscriptionRow<'a> {
    user_id: Uuid,
    plan_id: &'a str,
    plan_name: &'a str,
    status: &'a str,
    includes_addon: bool,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    stripe_session_id: &'a str,
}

impl<'a> From<&'a CreateSubscriptionInput> for NewSubscriptionRow<'a> {
    fn from(input: &'a CreateSubscriptionInput) -> Self {
        Self {
            user_id: input.user_id,
            plan_id: &input.plan_id,
            plan_name: &input.plan_name,
            status: input.status.as_str(),
            includes_addon: input.includes_addon,
            start_date: input.start_date,
            end_date: input.end_date,
            stripe_session_id: &input.stripe_session_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    user_id: Uuid,
    email: String,
}

// ============================================================================
// Repository Implementations
// ============================================================================

#[async_trait]
impl SubscriptionRepoTrait for SupabaseRestPersistence {
    async fn get_by_stripe_session_id(
        &self,
        stripe_session_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>> {
        let filter = format!("eq.{stripe_session_id}");
        let url = self.table_url(
            "subscriptions",
            &[
                ("select", SUBSCRIPTION_COLUMNS),
                ("stripe_session_id", filter.as_str()),
                ("limit", "1"),
            ],
        )?;

        let rows: Vec<SubscriptionRow> = self.select(url).await?;
        Ok(rows.into_iter().next().map(SubscriptionProfile::from))
    }

    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<SubscriptionProfile> {
        let url = self.table_url("subscriptions", &[("select", SUBSCRIPTION_COLUMNS)])?;

        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&NewSubscriptionRow::from(input))
            .send()
            .await
            .map_err(|e| AppError::Database(format!("Supabase request failed: {e}")))?;

        let rows: Vec<SubscriptionRow> = handle_response(response).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("Insert returned no rows".into()))?;
        Ok(SubscriptionProfile::from(row))
    }
}

#[async_trait]
impl ProfileRepoTrait for SupabaseRestPersistence {
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let filter = format!("eq.{email}");
        let url = self.table_url(
            "profiles",
            &[("select", "user_id,email"), ("email", filter.as_str()), ("limit", "1")],
        )?;

        let rows: Vec<ProfileRow> = self.select(url).await?;
        Ok(rows.into_iter().next().map(|row| UserProfile {
            user_id: row.user_id,
            email: row.email,
        }))
    }
}

#[async_trait]
impl UserPlanRepoTrait for SupabaseRestPersistence {
    async fn exists_for_subscription(&self, subscription_id: Uuid) -> AppResult<bool> {
        let filter = format!("eq.{subscription_id}");
        let url = self.table_url(
            "user_plans",
            &[("select", "id"), ("subscription_id", filter.as_str()), ("limit", "1")],
        )?;

        let rows: Vec<serde::de::IgnoredAny> = self.select(url).await?;
        Ok(!rows.is_empty())
    }
}
