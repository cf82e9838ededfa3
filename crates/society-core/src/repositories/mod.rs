//! Repository traits (ports)

pub mod account_repository;
pub mod memory;
pub mod otp_store;
pub mod property_repository;

pub use account_repository::AccountRepository;
pub use memory::{InMemoryAccountRepository, InMemoryOtpStore, InMemoryPropertyRepository};
pub use otp_store::OtpStore;
pub use property_repository::PropertyRepository;
