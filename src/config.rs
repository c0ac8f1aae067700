use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub api_base: String,
    pub upload_limit: usize,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values are
    /// treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            port: parse_or(var("PORT"), "PORT", DEFAULT_PORT),
            api_base: resolve_api_base(var("API_BASE"), var("API_URL")),
            upload_limit: parse_or(var("UPLOAD_LIMIT_BYTES"), "UPLOAD_LIMIT_BYTES", DEFAULT_UPLOAD_LIMIT),
        }
    }
}

fn resolve_api_base(api_base: Option<String>, api_url: Option<String>) -> String {
    let base = api_base.or(api_url).unwrap_or_else(|| {
        info!("API_BASE/API_URL not set, using default: {DEFAULT_API_BASE}");
        DEFAULT_API_BASE.to_string()
    });
    let base = base.trim();
    base.strip_suffix('/').unwrap_or(base).to_string()
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.upload_limit, DEFAULT_UPLOAD_LIMIT);
    }

    #[test]
    fn api_base_wins_over_api_url() {
        let config = config_from(&[
            ("API_BASE", "https://alias.example"),
            ("API_URL", "https://injected.example"),
        ]);
        assert_eq!(config.api_base, "https://alias.example");
    }

    #[test]
    fn api_url_used_when_api_base_is_empty() {
        let config = config_from(&[("API_BASE", ""), ("API_URL", "https://injected.example/")]);
        assert_eq!(config.api_base, "https://injected.example");
    }

    #[test]
    fn invalid_port_falls_back() {
        let config = config_from(&[("PORT", "eighty"), ("UPLOAD_LIMIT_BYTES", "2048")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.upload_limit, 2048);
    }
}
