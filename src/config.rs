use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub users_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    /// Serves `GET /api/users` when set. The listing has no auth gate.
    pub expose_user_listing: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = StoreConfig {
            users_file: std::env::var("USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("users.json")),
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(3001),
            store,
            expose_user_listing: std::env::var("EXPOSE_USER_LISTING")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
