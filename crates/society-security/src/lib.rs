//! # Society Security
//! 
//! Security utilities: signed tokens, password hashing, one-time codes.

pub mod jwt;
pub mod otp;
pub mod password;

pub use jwt::{JwtError, JwtService, SignedClaims};
pub use password::PasswordService;
