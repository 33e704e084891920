use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

/// Signing secret that only belongs in development.
const PLACEHOLDER_SECRET: &str = "development key";

/// Longest session lifetime accepted from the environment (ten years).
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub secret_key: String,
    pub per_page: u32,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Self {
        let config = Self {
            db_path: PathBuf::from(try_load("MINITWIT_DB_PATH", "minitwit.db".to_string())),
            host: try_load("MINITWIT_HOST", "0.0.0.0".to_string()),
            port: try_load("MINITWIT_PORT", 5000),
            secret_key: try_load("MINITWIT_SECRET_KEY", PLACEHOLDER_SECRET.to_string()),
            per_page: try_load("MINITWIT_PER_PAGE", 30),
            session_ttl_hours: session_ttl(try_load("MINITWIT_SESSION_TTL_HOURS", 720)),
        };

        if is_placeholder_secret(&config.secret_key) {
            warn!("MINITWIT_SECRET_KEY is a development placeholder; set a real secret in production");
        }

        config
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    parse_or_default(key, env::var(key).ok(), default)
}

/// Parse `raw`, falling back to `default` when it is missing or malformed.
fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match raw {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?} ({e}), using default: {default}");
            default
        }),
    }
}

fn is_placeholder_secret(secret: &str) -> bool {
    secret == PLACEHOLDER_SECRET
}

fn session_ttl(hours: i64) -> i64 {
    hours.clamp(1, MAX_SESSION_TTL_HOURS)
}
