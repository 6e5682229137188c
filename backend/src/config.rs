use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://127.0.0.1:8080,http://127.0.0.1:3000";
const DEFAULT_PRIZES_DELAY_MS: u64 = 300;
const DEFAULT_CLAIM_DELAY_MS: u64 = 500;
const DEFAULT_CODE_PREFIX: &str = "NAILS";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub allowed_origins: Vec<HeaderValue>,
    /// Artificial latency on the prize list, mimicking a slow catalog backend.
    pub prizes_delay: Duration,
    /// Artificial latency on claims, mimicking mail delivery.
    pub claim_delay: Duration,
    pub code_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .split(',')
                .map(HeaderValue::from_static)
                .collect(),
            prizes_delay: Duration::from_millis(DEFAULT_PRIZES_DELAY_MS),
            claim_delay: Duration::from_millis(DEFAULT_CLAIM_DELAY_MS),
            code_prefix: DEFAULT_CODE_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let addr_value = get("LUCKY_WHEEL_ADDR", DEFAULT_ADDR);
        let addr = addr_value
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                name: "LUCKY_WHEEL_ADDR",
                value: addr_value.clone(),
            })?;

        let origins_value = get("LUCKY_WHEEL_ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS);
        let allowed_origins = origins_value
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| ConfigError::Invalid {
                    name: "LUCKY_WHEEL_ALLOWED_ORIGINS",
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let prizes_delay = parse_millis(
            "LUCKY_WHEEL_PRIZES_DELAY_MS",
            lookup("LUCKY_WHEEL_PRIZES_DELAY_MS"),
            DEFAULT_PRIZES_DELAY_MS,
        )?;
        let claim_delay = parse_millis(
            "LUCKY_WHEEL_CLAIM_DELAY_MS",
            lookup("LUCKY_WHEEL_CLAIM_DELAY_MS"),
            DEFAULT_CLAIM_DELAY_MS,
        )?;

        let code_prefix = get("LUCKY_WHEEL_CODE_PREFIX", DEFAULT_CODE_PREFIX)
            .trim()
            .to_string();
        if code_prefix.is_empty() || !code_prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid {
                name: "LUCKY_WHEEL_CODE_PREFIX",
                value: code_prefix,
            });
        }

        Ok(Self {
            addr,
            allowed_origins,
            prizes_delay,
            claim_delay,
            code_prefix,
        })
    }
}

fn parse_millis(name: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::from_millis(default)),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
