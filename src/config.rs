// src/config.rs
use std::env;
use std::net::IpAddr;

use chrono::Duration;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "pww-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HOST is not an IP address: {0}")]
    InvalidHost(String),
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: String, value: String },
    #[error("ADMIN_USERNAME is set but ADMIN_PASSWORD is missing")]
    MissingAdminPassword,
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::minutes(5),
            refresh_ttl: Duration::hours(24),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    pub jwt: JwtConfig,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let host = match env::var("HOST") {
            Ok(h) => h.trim().parse().map_err(|_| ConfigError::InvalidHost(h.clone()))?,
            Err(_) => IpAddr::from([127, 0, 0, 1]),
        };
        let port = parse_var("PORT", 8000u16)?;
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5u32)?;

        let secret = match env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };
        let jwt = JwtConfig {
            secret,
            access_ttl: Duration::minutes(parse_var("JWT_ACCESS_MINUTES", 5i64)?),
            refresh_ttl: Duration::hours(parse_var("JWT_REFRESH_HOURS", 24i64)?),
        };

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) if !username.trim().is_empty() => {
                Some(AdminBootstrap { username: username.trim().to_string(), password })
            }
            (Ok(_), Err(_)) => return Err(ConfigError::MissingAdminPassword),
            _ => None,
        };

        Ok(Self { database_url, max_connections, host, port, jwt, admin })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name: name.to_string(), value: raw.clone() }),
        Err(_) => Ok(default),
    }
}
