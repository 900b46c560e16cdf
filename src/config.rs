use std::net::IpAddr;

use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub session_ttl_hours: i64,
    /// Time zone used for on-screen creation timestamps. The CSV export
    /// stays in the storage zone (UTC).
    pub display_tz: Tz,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("PREVENTA_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PREVENTA_HOST: {e}"))?;

        let port: u16 = env_or("PREVENTA_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PREVENTA_PORT: {e}"))?;

        let session_ttl_hours: i64 = env_or("PREVENTA_SESSION_TTL_HOURS", "12")
            .parse()
            .map_err(|e| format!("Invalid PREVENTA_SESSION_TTL_HOURS: {e}"))?;

        let display_tz: Tz = env_or("PREVENTA_DISPLAY_TZ", "America/Mexico_City")
            .parse()
            .map_err(|e| format!("Invalid PREVENTA_DISPLAY_TZ: {e}"))?;

        let log_level = env_or("PREVENTA_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            host,
            port,
            session_ttl_hours,
            display_tz,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
