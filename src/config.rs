use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

use crate::adjudication::WeekOffs;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Leave calendar
    pub week_offs: WeekOffs,
    pub holiday_cache_ttl: Duration,

    // Notifications
    pub notify_queue_capacity: usize,
    pub dashboard_url: String,
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: String,
    pub message_api_url: Option<String>,
    pub message_api_key: Option<String>,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| anyhow!("{key} has invalid value '{raw}': {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", "1000")?,

            week_offs: parsed("WEEK_OFF_DAYS", "Sat,Sun")?,
            holiday_cache_ttl: Duration::from_secs(parsed("HOLIDAY_CACHE_TTL_SECS", "3600")?), // 1h

            notify_queue_capacity: parsed("NOTIFY_QUEUE_CAPACITY", "256")?,
            dashboard_url: env::var("DASHBOARD_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            email_api_url: optional("EMAIL_API_URL"),
            email_api_key: optional("EMAIL_API_KEY"),
            email_from: env::var("EMAIL_FROM").unwrap_or_else(|_| "hr@localhost".to_string()),
            message_api_url: optional("MESSAGE_API_URL"),
            message_api_key: optional("MESSAGE_API_KEY"),
        })
    }
}
