pub mod payment_provider;
pub mod plan_generation;
