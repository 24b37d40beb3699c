//! Configuration for the Herald runtime.
//!
//! Settings are layered with figment: built-in defaults, a `herald.toml`
//! file, `HERALD_*` environment variables, then programmatic overrides.  See
//! [`loader`] for the search rules.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{
    BotConfig, HeraldConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;
