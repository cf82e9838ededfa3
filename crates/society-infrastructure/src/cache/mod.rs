//! Cache module (Redis adapters)

pub mod redis_otp_store;

pub use redis_otp_store::{create_redis_pool, RedisOtpStore};
