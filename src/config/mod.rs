//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, environment overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → RelayState snapshot built per config
//!
//! With --watch:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → new RelayState swapped in atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - The shared secret may live in the environment, never in logs

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AccessConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, TimeoutConfig, TlsConfig,
    UpstreamConfig,
};
pub use validation::ValidationError;
