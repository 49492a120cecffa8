//! Server configuration
//!
//! Read from the Shuttle secret store, falling back to the process
//! environment (and `.env` for local runs). Every key is optional.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use giftify::application::{SchedulerConfig, WorkerConfig};
use giftify::domain::services::DispatcherConfig;
use giftify::DeliveryPlatform;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {key}={value:?}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct GiftifyConfig {
    /// Bearer token for protected routes; `None` disables auth
    pub api_key: Option<String>,
    pub scheduler: SchedulerConfig,
    pub dispatcher: DispatcherConfig,
    pub worker: WorkerConfig,
    /// Connectors are attempted in this order
    pub platforms: Vec<DeliveryPlatform>,
}

impl Default for GiftifyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            scheduler: SchedulerConfig::default(),
            dispatcher: DispatcherConfig::default(),
            worker: WorkerConfig::default(),
            platforms: vec![DeliveryPlatform::Blinkit, DeliveryPlatform::Zepto],
        }
    }
}

impl GiftifyConfig {
    pub fn from_secrets(secrets: &shuttle_runtime::SecretStore) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| secrets.get(key).or_else(|| std::env::var(key).ok()))
    }

    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| values.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let scheduler = SchedulerConfig {
            interval: match get("SCHEDULER_INTERVAL_SECS") {
                Some(v) => Duration::from_secs(parse_positive("SCHEDULER_INTERVAL_SECS", &v)?),
                None => defaults.scheduler.interval,
            },
            startup_delay: match get("SCHEDULER_STARTUP_DELAY_SECS") {
                Some(v) => Duration::from_secs(parse("SCHEDULER_STARTUP_DELAY_SECS", &v)?),
                None => defaults.scheduler.startup_delay,
            },
            enabled: match get("SCHEDULER_ENABLED") {
                Some(v) => parse_bool("SCHEDULER_ENABLED", &v)?,
                None => defaults.scheduler.enabled,
            },
        };

        let dispatcher = DispatcherConfig {
            attempt_timeout: match get("DISPATCH_TIMEOUT_MS") {
                Some(v) => Duration::from_millis(parse_positive("DISPATCH_TIMEOUT_MS", &v)?),
                None => defaults.dispatcher.attempt_timeout,
            },
            ..defaults.dispatcher
        };

        let worker = WorkerConfig {
            concurrency: match get("WORKER_CONCURRENCY") {
                Some(v) => parse_positive("WORKER_CONCURRENCY", &v)? as usize,
                None => defaults.worker.concurrency,
            },
        };

        let platforms = match get("DELIVERY_PLATFORMS") {
            Some(v) => parse_platforms(&v)?,
            None => defaults.platforms,
        };

        Ok(Self {
            api_key: get("GIFTIFY_API_KEY"),
            scheduler,
            dispatcher,
            worker,
            platforms,
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|e: std::num::ParseIntError| invalid(key, value, e.to_string()))
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match parse(key, value)? {
        0 => Err(invalid(key, value, "must be greater than zero")),
        n => Ok(n),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

fn parse_platforms(value: &str) -> Result<Vec<DeliveryPlatform>, ConfigError> {
    let mut platforms = Vec::new();
    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let platform: DeliveryPlatform = name
            .parse()
            .map_err(|e: String| invalid("DELIVERY_PLATFORMS", value, e))?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    if platforms.is_empty() {
        return Err(invalid("DELIVERY_PLATFORMS", value, "no platforms listed"));
    }
    Ok(platforms)
}
