//! # Society Core
//! 
//! Domain entities, services, and ports for residential-society onboarding:
//! one-time codes, invites, unit inventory, and registration.

pub mod domain;
pub mod error;
pub mod notifications;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind, OtpFailure};
