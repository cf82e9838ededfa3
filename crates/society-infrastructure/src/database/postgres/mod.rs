//! PostgreSQL repository implementations

pub mod account_repo_impl;
pub mod property_repo_impl;

pub use account_repo_impl::PgAccountRepository;
pub use property_repo_impl::PgPropertyRepository;
