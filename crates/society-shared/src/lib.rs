//! # Society Shared
//! 
//! Shared configuration, telemetry, clock, and small utilities for the
//! society onboarding service.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AppError;
pub use types::*;
