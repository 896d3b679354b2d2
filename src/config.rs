use crate::errors::ApiError;
use std::{net::SocketAddr, str::FromStr, time::Duration};

const DEFAULT_GATEWAY_PORT: u16 = 3000;
const DEFAULT_REPUTATION_TTL_SECS: u64 = 300;
const DEFAULT_MAX_CONCURRENCY: usize = 256;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the SitVerse backend, without the `/api` suffix.
    pub api_url: String,
    /// Session credential forwarded as a bearer token.
    pub session_token: Option<String>,
    pub gateway_addr: SocketAddr,
    pub reputation_ttl: Duration,
    /// `None` leaves backend calls without a client-side timeout.
    pub request_timeout: Option<Duration>,
    pub max_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("SITVERSE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::ValidationError("SITVERSE_API_URL must be set".into()))?;

        let session_token = lookup("SITVERSE_SESSION_TOKEN").filter(|v| !v.trim().is_empty());

        let gateway_addr = parse_or(
            &lookup,
            "GATEWAY_ADDR",
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_GATEWAY_PORT)),
        )?;
        let ttl_secs = parse_or(&lookup, "REPUTATION_TTL_SECS", DEFAULT_REPUTATION_TTL_SECS)?;
        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value("REQUEST_TIMEOUT_SECS", &raw)?)),
            None => None,
        };
        let max_concurrency =
            parse_or(&lookup, "GATEWAY_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?;
        if max_concurrency == 0 {
            return Err(ApiError::ValidationError(
                "GATEWAY_MAX_CONCURRENCY must be positive".into(),
            ));
        }

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_token,
            gateway_addr,
            reputation_ttl: Duration::from_secs(ttl_secs),
            request_timeout,
            max_concurrency,
        })
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::ValidationError(format!("{} has an invalid value: {}", key, raw)))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ApiError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let config = Config::from_lookup(lookup_from(&[(
            "SITVERSE_API_URL",
            "https://sitverse.example/",
        )]))
        .unwrap();
        assert_eq!(config.api_url, "https://sitverse.example");
        assert_eq!(config.gateway_addr.port(), 3000);
        assert_eq!(config.reputation_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.session_token, None);
    }

    #[test]
    fn missing_url_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("SITVERSE_API_URL", "http://localhost:5000"),
            ("SITVERSE_SESSION_TOKEN", "abc"),
            ("GATEWAY_ADDR", "0.0.0.0:8080"),
            ("REPUTATION_TTL_SECS", "60"),
            ("REQUEST_TIMEOUT_SECS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.session_token.as_deref(), Some("abc"));
        assert_eq!(config.gateway_addr.port(), 8080);
        assert_eq!(config.reputation_ttl, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn garbage_values_are_validation_errors() {
        let err = Config::from_lookup(lookup_from(&[
            ("SITVERSE_API_URL", "http://localhost:5000"),
            ("REPUTATION_TTL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
