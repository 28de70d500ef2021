//! Sprig Config holds the factory level configuration of a sprig container.
//!
//! Values are registered by type. Factory processors add or replace values while the
//! container bootstraps, and component suppliers read them when building components.
//!
//! # Examples
//!
//! ```rust
//! use sprig_config::provider::ConfigRegistry;
//!
//! #[derive(Clone)]
//! struct ServerConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! let mut configs = ConfigRegistry::new();
//! configs
//!     .insert(ServerConfig {
//!         host: "localhost".to_string(),
//!         port: 8080,
//!     })
//!     .unwrap();
//!
//! let server = configs.get::<ServerConfig>().unwrap();
//! assert_eq!(server.host, "localhost");
//! assert_eq!(server.port, 8080);
//! ```
//!
//! Sprig Config consists of the following components:
//!
//! 1. Config - shared handle to a registered value
//! 2. Provider - the registry of values, adding, replacing and retrieving them
//! 3. Errors - for config errors

pub mod config;
pub mod errors;
pub mod provider;

pub use config::Config;
pub use errors::ConfigError;
pub use provider::ConfigRegistry;
