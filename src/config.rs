use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime settings, built once at startup and handed to [`crate::state::AppState`].
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub database_path: String,
    pub media_root: String,
    pub media_url: String,
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3004".into(),
            database_path: "glowreview.db".into(),
            media_root: "media".into(),
            media_url: "/media".into(),
            secure_cookies: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let media_url: String = try_load("GLOW_MEDIA_URL", &defaults.media_url)?;
        if !media_url.starts_with('/') || media_url.len() < 2 {
            return Err(ConfigError::Invalid {
                key: "GLOW_MEDIA_URL",
                reason: "must be an absolute path below the site root".into(),
            });
        }

        Ok(Self {
            addr: try_load("GLOW_ADDR", &defaults.addr)?,
            database_path: try_load("GLOW_DATABASE", &defaults.database_path)?,
            media_root: try_load("GLOW_MEDIA_ROOT", &defaults.media_root)?,
            media_url: media_url.trim_end_matches('/').to_string(),
            secure_cookies: try_load("GLOW_SECURE_COOKIES", "false")?,
        })
    }

    /// Public URL of a stored attachment reference, always on this site.
    pub fn media_href(&self, reference: &str) -> String {
        if reference.starts_with('/') && !reference.starts_with("//") {
            reference.to_string()
        } else {
            format!(
                "{}/{}",
                self.media_url,
                reference.trim_start_matches('/')
            )
        }
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }
    })
}
