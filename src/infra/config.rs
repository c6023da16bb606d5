use std::{net::SocketAddr, str::FromStr, time::Duration};

use env_helpers::get_env_default;
use secrecy::SecretString;
use url::Url;

use crate::infra::error::InfraError;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
pub const DEFAULT_STRIPE_API_VERSION: &str = "2025-08-27.basil";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub supabase_url: Url,
    /// Used for the PostgREST data API.
    pub supabase_service_role_key: SecretString,
    /// Used to invoke the plan generation edge function.
    pub supabase_anon_key: SecretString,
    pub stripe_secret_key: SecretString,
    pub stripe_api_base: Url,
    pub stripe_api_version: String,
    /// When set, persistence talks to Postgres directly instead of PostgREST.
    pub database_url: Option<SecretString>,
    pub run_migrations: bool,
    /// Upper bound for each outbound call made while verifying a session.
    pub step_timeout: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let supabase_url = parse_required::<Url>("SUPABASE_URL")?;
        let supabase_service_role_key = secret_required("SUPABASE_SERVICE_ROLE_KEY")?;
        let supabase_anon_key = secret_required("SUPABASE_ANON_KEY")?;
        let stripe_secret_key = secret_required("STRIPE_SECRET_KEY")?;

        let stripe_api_base: String =
            get_env_default("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE.to_string());
        let stripe_api_base = Url::parse(&stripe_api_base)
            .map_err(|_| InfraError::ConfigInvalid { var: "STRIPE_API_BASE" })?;
        let stripe_api_version: String =
            get_env_default("STRIPE_API_VERSION", DEFAULT_STRIPE_API_VERSION.to_string());

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);
        let run_migrations: bool = get_env_default("RUN_MIGRATIONS", false);

        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8000)));
        let step_timeout_secs: u64 = get_env_default("STEP_TIMEOUT_SECS", 10);
        let log_format: LogFormat = get_env_default("LOG_FORMAT", String::from("pretty"))
            .parse()
            .map_err(|_| InfraError::ConfigInvalid { var: "LOG_FORMAT" })?;

        Ok(Self {
            bind_addr,
            supabase_url,
            supabase_service_role_key,
            supabase_anon_key,
            stripe_secret_key,
            stripe_api_base,
            stripe_api_version,
            database_url,
            run_migrations,
            step_timeout: Duration::from_secs(step_timeout_secs),
            log_format,
        })
    }
}

fn required(var: &'static str) -> Result<String, InfraError> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(InfraError::ConfigMissing { var })
}

fn secret_required(var: &'static str) -> Result<SecretString, InfraError> {
    required(var).map(SecretString::from)
}

fn parse_required<T: FromStr>(var: &'static str) -> Result<T, InfraError> {
    required(var)?
        .parse()
        .map_err(|_| InfraError::ConfigInvalid { var })
}
