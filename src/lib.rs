//! Static file server with ordered alias rules.
//!
//! Requests are resolved through configurable alias rules (literal, regex or
//! predicate conditions; template or producer serve targets) before falling
//! back to the literal path under the root. The root cannot be escaped
//! unless a rule explicitly allows it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{AliasRouter, AliasRule, Resolution};
