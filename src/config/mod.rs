//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, regex compile check)
//!     → ServerConfig (validated, root made absolute)
//!     → routing::AliasRouter::from_config (compiled rules)
//!     → shared via Arc with every request handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A broken alias rule stops startup instead of failing requests later

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{finalize_config, load_config, ConfigError};
pub use schema::AliasConfig;
pub use schema::ListenerConfig;
pub use schema::MatchSpec;
pub use schema::ServerConfig;
