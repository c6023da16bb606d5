pub mod checkout_metadata;
pub mod plan_duration;
pub mod subscription;
pub mod user_profile;
