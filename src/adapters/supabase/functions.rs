use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::plan_generation::PlanGenerationTrigger,
};

pub const GENERATE_PLAN_FUNCTION: &str = "generate-plan";

/// Invokes the `generate-plan` edge function with the project's anon key.
#[derive(Clone)]
pub struct EdgeFunctionPlanTrigger {
    client: Client,
    supabase_url: Url,
    anon_key: SecretString,
}

impl EdgeFunctionPlanTrigger {
    pub fn new(client: Client, supabase_url: Url, anon_key: SecretString) -> Self {
        Self {
            client,
            supabase_url,
            anon_key,
        }
    }

    fn function_url(&self) -> AppResult<Url> {
        let mut url = self.supabase_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("SUPABASE_URL cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["functions", "v1", GENERATE_PLAN_FUNCTION]);
        Ok(url)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratePlanRequest {
    user_id: Uuid,
    subscription_id: Uuid,
}

#[async_trait]
impl PlanGenerationTrigger for EdgeFunctionPlanTrigger {
    async fn trigger(&self, user_id: Uuid, subscription_id: Uuid) -> AppResult<()> {
        let body = GeneratePlanRequest {
            user_id,
            subscription_id,
        };

        self.client
            .post(self.function_url()?)
            .bearer_auth(self.anon_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("generate-plan request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Internal(format!("generate-plan rejected request: {e}")))?;

        Ok(())
    }
}
