use std::{env, str::FromStr};

use chrono::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub cors_origin: String,
    pub jwt: JwtConfig,
    pub lockout: LockoutPolicy,
    pub admin: Option<AdminSeed>,
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub valid_hours: i64,
}

impl JwtConfig {
    pub fn validity(&self) -> Duration {
        Duration::hours(self.valid_hours)
    }
}

/// How many failed password checks lock an account, and for how long.
#[derive(Clone, Copy, Debug)]
pub struct LockoutPolicy {
    pub max_failed_attempts: i32,
    pub lockout_minutes: i64,
}

impl LockoutPolicy {
    pub fn window(&self) -> Duration {
        Duration::minutes(self.lockout_minutes)
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        LockoutPolicy {
            max_failed_attempts: 5,
            lockout_minutes: 10,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();

        let admin = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            _ => None,
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_owned()),
            cors_origin: optional("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_owned()),
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                issuer: optional("JWT_VALID_ISSUER").unwrap_or_else(|| "storefront".to_owned()),
                audience: optional("JWT_VALID_AUDIENCE")
                    .unwrap_or_else(|| "storefront".to_owned()),
                valid_hours: parsed("JWT_VALID_HOURS", 8)?,
            },
            lockout: LockoutPolicy {
                max_failed_attempts: parsed("LOCKOUT_MAX_FAILED_ATTEMPTS", 5)?,
                lockout_minutes: parsed("LOCKOUT_MINUTES", 10)?,
            },
            admin,
        })
    }
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
