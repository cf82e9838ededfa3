//! # Society Infrastructure
//! 
//! Database, cache, and mail implementations (adapters).

pub mod cache;
pub mod database;
pub mod mail;

pub use cache::{create_redis_pool, RedisOtpStore};
pub use database::{create_pool, run_migrations, PgAccountRepository, PgPropertyRepository};
pub use mail::{LogMailer, MailTemplates, SmtpMailer};
