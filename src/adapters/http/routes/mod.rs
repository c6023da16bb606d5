pub mod health;
pub mod verify_session;

use axum::Router;

use crate::adapters::http::app_state::AppState;

/// Routes served under `/functions/v1`.
pub fn router() -> Router<AppState> {
    Router::new().merge(verify_session::router())
}
