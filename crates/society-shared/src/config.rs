//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_INVITE_TOKEN_EXPIRY, DEFAULT_OTP_MAX_ATTEMPTS,
    DEFAULT_OTP_REQUESTS_PER_MINUTE, DEFAULT_OTP_TTL_SECONDS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub jwt: JwtSettings,
    pub otp: OtpSettings,
    pub mail: MailSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Base URL of the web client; invite links point at `{frontend_url}/register`.
    pub frontend_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,
    pub invite_token_expiry: i64,
}

/// Where live OTP entries are kept.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OtpStoreKind {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OtpSettings {
    pub ttl_seconds: i64,
    pub max_attempts: u32,
    pub sweep_interval_seconds: u64,
    pub requests_per_minute: u32,
    pub store: OtpStoreKind,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    pub directory: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "society-server")?
            .set_default("app.frontend_url", "http://localhost:5173")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("redis.max_connections", 8)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("jwt.invite_token_expiry", DEFAULT_INVITE_TOKEN_EXPIRY)?
            .set_default("otp.ttl_seconds", DEFAULT_OTP_TTL_SECONDS)?
            .set_default("otp.max_attempts", DEFAULT_OTP_MAX_ATTEMPTS)?
            .set_default("otp.sweep_interval_seconds", 300)?
            .set_default("otp.requests_per_minute", DEFAULT_OTP_REQUESTS_PER_MINUTE)?
            .set_default("otp.store", "memory")?
            .set_default("mail.enabled", false)?
            .set_default("mail.smtp_host", "smtp.gmail.com")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.username", "")?
            .set_default("mail.password", "")?
            .set_default("mail.from", "no-reply@societysync.local")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must be set".into()));
        }
        if self.jwt.invite_token_expiry <= 0 || self.jwt.access_token_expiry <= 0 {
            return Err(ConfigError::Message("token expiries must be positive".into()));
        }
        if self.otp.ttl_seconds <= 0 || self.otp.max_attempts == 0 {
            return Err(ConfigError::Message(
                "otp.ttl_seconds and otp.max_attempts must be positive".into(),
            ));
        }
        if self.otp.requests_per_minute == 0 {
            return Err(ConfigError::Message("otp.requests_per_minute must be positive".into()));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            app: AppSettings {
                env: "test".into(),
                host: "127.0.0.1".into(),
                port: 8080,
                name: "society-server".into(),
                frontend_url: "http://localhost:5173".into(),
            },
            database: DatabaseSettings {
                url: "postgres://localhost/society".into(),
                max_connections: 5,
                min_connections: 1,
            },
            redis: RedisSettings {
                url: "redis://127.0.0.1:6379".into(),
                max_connections: 4,
            },
            jwt: JwtSettings {
                secret: "secret".into(),
                access_token_expiry: 3600,
                invite_token_expiry: 900,
            },
            otp: OtpSettings {
                ttl_seconds: 60,
                max_attempts: 3,
                sweep_interval_seconds: 300,
                requests_per_minute: 5,
                store: OtpStoreKind::Memory,
            },
            mail: MailSettings {
                enabled: false,
                smtp_host: "localhost".into(),
                smtp_port: 25,
                username: String::new(),
                password: String::new(),
                from: "no-reply@example.com".into(),
            },
            logging: LoggingSettings {
                level: "info".into(),
                json: false,
                directory: None,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let mut config = sample();
        config.jwt.secret = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let mut config = sample();
        config.otp.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
