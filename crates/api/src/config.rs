//! Process configuration, read once at startup.

use std::net::SocketAddr;

use thiserror::Error;

pub const BIND_ADDR_ENV: &str = "SOCKSTOCK_BIND_ADDR";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS_ENV: &str = "SOCKSTOCK_DB_MAX_CONNECTIONS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value:?}")]
    BindAddr { var: &'static str, value: String },

    #[error("{var} must be a positive integer, found {value:?}")]
    MaxConnections { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_addr = get(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::BindAddr {
                var: BIND_ADDR_ENV,
                value: raw_addr.clone(),
            })?;

        let db_max_connections = match get(DB_MAX_CONNECTIONS_ENV) {
            None => DEFAULT_DB_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::MaxConnections {
                        var: DB_MAX_CONNECTIONS_ENV,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            bind_addr,
            database_url: get(DATABASE_URL_ENV),
            db_max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.db_max_connections, 5);
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (BIND_ADDR_ENV, "127.0.0.1:9000"),
            (DATABASE_URL_ENV, "postgres://localhost/socks"),
            (DB_MAX_CONNECTIONS_ENV, "12"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/socks"));
        assert_eq!(cfg.db_max_connections, 12);
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let cfg = AppConfig::from_lookup(lookup(&[(DATABASE_URL_ENV, "  ")])).unwrap();
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn malformed_values_fail() {
        let err = AppConfig::from_lookup(lookup(&[(BIND_ADDR_ENV, "not-an-addr")])).unwrap_err();
        assert!(matches!(err, ConfigError::BindAddr { .. }));

        for bad in ["0", "-3", "many"] {
            let err =
                AppConfig::from_lookup(lookup(&[(DB_MAX_CONNECTIONS_ENV, bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::MaxConnections { .. }), "{bad}");
        }
    }
}
