//! Configuration for the Herald client.
//!
//! Settings are layered with figment: defaults, programmatic merges, an
//! optional TOML or YAML file and `HERALD_*` environment variables.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{
    DispatchConfig, HeraldConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
