//! Application-wide constants

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_INVITE: &str = "invite";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 604800;
pub const DEFAULT_INVITE_TOKEN_EXPIRY: i64 = 900;

pub const OTP_LENGTH: usize = 6;
pub const DEFAULT_OTP_TTL_SECONDS: i64 = 60;
pub const DEFAULT_OTP_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_OTP_REQUESTS_PER_MINUTE: u32 = 5;

/// Unit ids pad indexes to two digits, so wing, floor, and room counts stop at 99.
pub const MAX_UNIT_INDEX: u32 = 99;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Attempts at a property write before giving up on a version conflict.
pub const MAX_PROPERTY_WRITE_RETRIES: usize = 3;
