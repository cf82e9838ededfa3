//! # Society API
//! 
//! HTTP handlers, extractors, DTOs, and the error-to-response mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod rate_limit;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use rate_limit::OtpRateLimiter;
pub use routes::build_router;
pub use state::AppState;
