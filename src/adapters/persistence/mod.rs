use sqlx::PgPool;

use crate::app_error::AppError;

pub mod profile;
pub mod subscription;
pub mod user_plan;

/// Direct Postgres access, used when `DATABASE_URL` is configured.
#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) => {
                // The only unique key written here is subscriptions.stripe_session_id
                if db_err.is_unique_violation() || db_err.message().contains("duplicate key") {
                    AppError::DuplicateSession
                } else {
                    tracing::error!(error = %err, "Database error");
                    AppError::Database(db_err.message().to_string())
                }
            }
            _ => {
                tracing::error!(error = %err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
