use std::{env, net::SocketAddr, time::Duration};

use ipnet::IpNet;

use thiserror::Error;

pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_BRAVE_SEARCH_BASE_URL: &str = "https://api.search.brave.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub openweather_api_key: String,
    pub news_api_key: String,
    pub brave_search_api_key: String,
    pub bind_addr: String,
    pub bind_port: u16,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
    pub upstream_timeout: Duration,
    pub trusted_proxies: Vec<IpNet>,
    pub openweather_base_url: String,
    pub news_api_base_url: String,
    pub brave_search_base_url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required and must not be empty")]
    MissingApiKey(&'static str),
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("{0} must be a positive integer")]
    InvalidNumber(&'static str),
    #[error("TRUSTED_PROXIES must be a comma separated list of CIDR ranges")]
    InvalidTrustedProxies,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests do not
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &'static str| non_empty(key).ok_or(ConfigError::MissingApiKey(key));
        let positive = |key: &'static str, default: u64| {
            non_empty(key)
                .map(|value| {
                    value
                        .parse::<u64>()
                        .ok()
                        .filter(|parsed| *parsed > 0)
                        .ok_or(ConfigError::InvalidNumber(key))
                })
                .transpose()
                .map(|value| value.unwrap_or(default))
        };

        let openweather_api_key = required("OPENWEATHER_API_KEY")?;
        let news_api_key = required("NEWS_API_KEY")?;
        let brave_search_api_key = required("BRAVE_SEARCH_API_KEY")?;

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = non_empty("BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8000);

        let cache_capacity = usize::try_from(positive("CACHE_CAPACITY", 100)?)
            .map_err(|_| ConfigError::InvalidNumber("CACHE_CAPACITY"))?;
        let rate_limit_requests = u32::try_from(positive("RATE_LIMIT_REQUESTS", 50)?)
            .map_err(|_| ConfigError::InvalidNumber("RATE_LIMIT_REQUESTS"))?;

        let trusted_proxies = non_empty("TRUSTED_PROXIES")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| {
                        item.parse::<IpNet>()
                            .map_err(|_| ConfigError::InvalidTrustedProxies)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            openweather_api_key,
            news_api_key,
            brave_search_api_key,
            bind_addr,
            bind_port,
            cache_ttl: Duration::from_secs(positive("CACHE_TTL_SECS", 300)?),
            cache_capacity,
            rate_limit_requests,
            rate_limit_window: Duration::from_secs(positive("RATE_LIMIT_WINDOW_SECS", 60)?),
            upstream_timeout: Duration::from_secs(positive("UPSTREAM_TIMEOUT_SECS", 10)?),
            trusted_proxies,
            openweather_base_url: non_empty("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENWEATHER_BASE_URL.to_string()),
            news_api_base_url: non_empty("NEWS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_NEWS_API_BASE_URL.to_string()),
            brave_search_base_url: non_empty("BRAVE_SEARCH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BRAVE_SEARCH_BASE_URL.to_string()),
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}
