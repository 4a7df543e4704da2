use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Bundles
    /// Directory holding `<code>.json` bundles; `None` serves the embedded ones
    pub locales_dir: Option<PathBuf>,

    // Server
    pub bind_address: String,
    pub port: u16,

    // Cookies
    /// Always mark the locale cookie `Secure` (set when TLS terminates upstream)
    pub secure_cookies: bool,

    // Startup
    pub validate_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            locales_dir: std::env::var("LOCALES_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: match std::env::var("PORT") {
                Ok(v) => v.parse().context("PORT must be a valid port number")?,
                Err(_) => 8080,
            },

            secure_cookies: parse_bool("SECURE_COOKIES", false)?,
            validate_on_startup: parse_bool("VALIDATE_ON_STARTUP", true)?,
        })
    }

    /// Socket address string for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn parse_bool(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{} must be a boolean, got '{}'", name, other),
        },
        Err(_) => Ok(default),
    }
}
