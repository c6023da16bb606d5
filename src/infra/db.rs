use secrecy::{ExposeSecret, SecretString};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::infra::error::InfraError;

pub async fn init_db(database_url: &SecretString) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url.expose_secret())
        .await?;

    info!("Connected to database!");
    Ok(pool)
}

/// Apply the migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
    info!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations complete");
    Ok(())
}
