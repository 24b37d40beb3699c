//! Herald Runtime - orchestration layer for the Herald command framework.
//!
//! This crate provides:
//! - Layered configuration (`herald.toml`, `HERALD_*` environment variables)
//! - Logging setup on top of `tracing-subscriber`
//! - The [`HeraldRuntime`], which loads commands and runs the dispatch loop
//!
//! ```ignore
//! use herald_core::{BotContext, LinkedCommands};
//! use herald_runtime::HeraldRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = HeraldRuntime::new();
//!     runtime.load(LinkedCommands, BotContext::new(MyBot::default())).await;
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     spawn_adapter(tx);
//!
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{BotConfig, ConfigError, ConfigLoader, ConfigResult, HeraldConfig, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{HeraldRuntime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
