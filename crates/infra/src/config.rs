//! Process configuration, read from environment variables.

use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime configuration for the catalog service.
///
/// - `BIND_ADDR`: listen address (default `0.0.0.0:8080`)
/// - `DATABASE_URL`: Postgres URL; when unset the in-memory repository is used
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 5)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Invalid values fall back to defaults
    /// with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid BIND_ADDR; using {DEFAULT_BIND_ADDR}");
                default_bind_addr()
            }),
            None => default_bind_addr(),
        };

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(value = %raw, "invalid DATABASE_MAX_CONNECTIONS; using {DEFAULT_MAX_CONNECTIONS}");
                    DEFAULT_MAX_CONNECTIONS
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Self {
            bind_addr,
            database_url,
            database_max_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])), AppConfig::default());
    }

    #[test]
    fn reads_all_keys() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://shop@localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]));
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://shop@localhost/shop"));
        assert_eq!(cfg.database_max_connections, 12);
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "not-an-addr"),
            ("DATABASE_URL", "  "),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]));
        assert_eq!(cfg, AppConfig::default());
    }
}
