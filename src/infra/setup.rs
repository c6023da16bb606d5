use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        http::app_state::AppState,
        persistence::PostgresPersistence,
        supabase::{functions::EdgeFunctionPlanTrigger, rest::SupabaseRestPersistence},
    },
    application::use_cases::verify_session::{
        ProfileRepoTrait, SubscriptionRepoTrait, UserPlanRepoTrait, VerifySessionUseCases,
    },
    infra::{
        config::{AppConfig, LogFormat},
        db::{init_db, run_migrations},
        error::InfraError,
        http_client::build_client,
        stripe_payment_adapter::StripePaymentAdapter,
    },
};

struct Repositories {
    subscriptions: Arc<dyn SubscriptionRepoTrait>,
    profiles: Arc<dyn ProfileRepoTrait>,
    user_plans: Arc<dyn UserPlanRepoTrait>,
}

pub async fn init_app_state(config: AppConfig) -> Result<AppState, InfraError> {
    let http = build_client().map_err(InfraError::HttpClient)?;

    let repos = match &config.database_url {
        Some(database_url) => {
            let pool = init_db(database_url).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            info!(backend = "postgres", "Persistence initialized");
            let postgres = Arc::new(PostgresPersistence::new(pool));
            Repositories {
                subscriptions: postgres.clone(),
                profiles: postgres.clone(),
                user_plans: postgres,
            }
        }
        None => {
            info!(backend = "postgrest", "Persistence initialized");
            let rest = Arc::new(SupabaseRestPersistence::new(
                http.clone(),
                config.supabase_url.clone(),
                config.supabase_service_role_key.clone(),
            ));
            Repositories {
                subscriptions: rest.clone(),
                profiles: rest.clone(),
                user_plans: rest,
            }
        }
    };

    let checkout = Arc::new(StripePaymentAdapter::new(
        http.clone(),
        config.stripe_api_base.clone(),
        config.stripe_secret_key.clone(),
        config.stripe_api_version.clone(),
    ));

    let plan_trigger = Arc::new(EdgeFunctionPlanTrigger::new(
        http,
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));

    let verify_session_use_cases = VerifySessionUseCases::new(
        checkout,
        repos.subscriptions,
        repos.profiles,
        repos.user_plans,
        plan_trigger,
        config.step_timeout,
    );

    Ok(AppState {
        config: Arc::new(config),
        verify_session_use_cases: Arc::new(verify_session_use_cases),
    })
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fitplan_api=debug,tower_http=debug".into());

    // Console (pretty logs) or structured JSON for log shipping
    let fmt_layer = match log_format {
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_level(true)
            .pretty()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}
