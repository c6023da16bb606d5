//! Test utilities for use case and HTTP testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory implementations of the repository and provider ports
//! - `TestAppStateBuilder` for wiring them into use cases or an `AppState`

mod factories;
mod verify_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use verify_mocks::*;
