//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration for the static alias server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory every request is served from and jailed to by default.
    pub root: PathBuf,

    /// File served when a request resolves to a directory.
    pub index_file: String,

    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Alias rules, evaluated in order. `[alias]` or `[[alias]]`.
    #[serde(rename = "alias", alias = "aliases", deserialize_with = "one_or_many")]
    pub aliases: Vec<AliasConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index_file: "index.html".to_string(),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            aliases: Vec::new(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on one request, alias resolution included, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One alias rule as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AliasConfig {
    /// Match conditions; empty matches every request.
    #[serde(rename = "match", default, deserialize_with = "one_or_many")]
    pub conditions: Vec<MatchSpec>,

    /// Serve templates; empty serves the request's own path.
    #[serde(default, deserialize_with = "one_or_many")]
    pub serve: Vec<String>,

    /// Accept the first serve candidate without checking it exists.
    #[serde(default)]
    pub force: bool,

    /// Permit the served path to lie outside the root.
    #[serde(default, alias = "allowOutside")]
    pub allow_outside: bool,
}

/// A match condition as written in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MatchSpec {
    /// `key=value`, or a bare value compared with `reqPath`.
    Literal(String),
    /// Regular expression tested against `reqPath`.
    Pattern { regex: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    // Tried first: a struct `T` would otherwise accept a sequence.
    Many(Vec<T>),
    One(T),
}

/// Accept either a single value or a list.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
