use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Width of the exported map image, which the legend graphic matches.
    pub legend_available_width: f64,
    /// Preferred width of one legend section (column).
    pub legend_section_width: f64,
    /// Largest section budget a layout request may ask for.
    pub legend_max_sections: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            legend_available_width: parse_env("LEGEND_AVAILABLE_WIDTH", 1500.0)?,
            legend_section_width: parse_env("LEGEND_SECTION_WIDTH", 500.0)?,
            legend_max_sections: parse_env("LEGEND_MAX_SECTIONS", 32)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
