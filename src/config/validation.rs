//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile-check every alias regular expression before serving
//! - Validate addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use regex::Regex;

use crate::config::schema::{MatchSpec, ServerConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("root must not be empty")]
    EmptyRoot,

    #[error("index_file must not be empty")]
    EmptyIndexFile,

    #[error("alias[{alias}] match[{condition}]: invalid regular expression: {message}")]
    InvalidPattern {
        alias: usize,
        condition: usize,
        message: String,
    },

    #[error("alias[{alias}] serve[{candidate}]: template must not be empty")]
    EmptyTemplate { alias: usize, candidate: usize },

    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("listener.max_connections must be greater than zero")]
    ZeroConnections,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.root.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyRoot);
    }
    if config.index_file.is_empty() {
        errors.push(ValidationError::EmptyIndexFile);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (alias, rule) in config.aliases.iter().enumerate() {
        for (condition, spec) in rule.conditions.iter().enumerate() {
            if let MatchSpec::Pattern { regex } = spec {
                if let Err(e) = Regex::new(regex) {
                    errors.push(ValidationError::InvalidPattern {
                        alias,
                        condition,
                        message: e.to_string(),
                    });
                }
            }
        }
        for (candidate, template) in rule.serve.iter().enumerate() {
            if template.trim().is_empty() {
                errors.push(ValidationError::EmptyTemplate { alias, candidate });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
