use std::sync::Arc;

use crate::{
    application::use_cases::verify_session::VerifySessionUseCases, infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verify_session_use_cases: Arc<VerifySessionUseCases>,
}
