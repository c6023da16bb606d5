use dotenvy::dotenv;
use tracing::{error, info};

use fitplan_api::infra::{
    app::create_app,
    config::{AppConfig, LogFormat},
    error::InfraError,
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map(|c| c.log_format)
            .unwrap_or(LogFormat::Pretty),
    );
    let config = config.inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    let app_state = init_app_state(config)
        .await
        .inspect_err(|e| error!(error = %e, "Startup failed"))?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(InfraError::TcpBind)?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .map_err(InfraError::Server)?;

    Ok(())
}
