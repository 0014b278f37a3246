use std::{env, fmt::Display, str::FromStr, time::Duration};

use reqwest::Url;
use tracing::info;

use crate::app::backend::RetryPolicy;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where the recipe backend lives and how patiently we talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl BackendConfig {
    /// Default timeout and retry policy against `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; `load` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup("RECIPE_BACKEND_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => {
                info!("RECIPE_BACKEND_URL not set, using default: {DEFAULT_BACKEND_URL}");
                parse_base_url(DEFAULT_BACKEND_URL)?
            }
        };
        let defaults = Self::new(base_url);

        let timeout_secs: u64 =
            try_load(&lookup, "RECIPE_BACKEND_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        // a zero timeout fails every request before it is sent
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "RECIPE_BACKEND_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
                reason: "must be at least one second".to_string(),
            });
        }
        let max_attempts: u32 = try_load(
            &lookup,
            "RECIPE_BACKEND_MAX_ATTEMPTS",
            defaults.retry.max_attempts,
        )?;
        let backoff_ms: u64 = try_load(
            &lookup,
            "RECIPE_BACKEND_BACKOFF_MS",
            u64::try_from(defaults.retry.initial_backoff.as_millis()).unwrap_or(u64::MAX),
        )?;

        Ok(Self {
            base_url: defaults.base_url,
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy {
                max_attempts,
                initial_backoff: Duration::from_millis(backoff_ms),
                max_backoff: defaults.retry.max_backoff,
            },
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "RECIPE_BACKEND_URL",
        value: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }

    // a trailing slash keeps a base path like `/api` when endpoints are appended
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
