//! Runtime orchestration.
//!
//! [`HeraldRuntime`] ties configuration, logging, command loading and the
//! dispatch loop together.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//! use herald_core::{BotContext, LinkedCommands};
//!
//! // Loads herald.toml from the current directory, or defaults
//! let mut runtime = HeraldRuntime::new();
//! runtime.load(LinkedCommands, BotContext::new(my_bot)).await;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! // hand `tx` to the chat adapter
//! runtime.run(rx).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tower::ServiceExt;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigLoader, ConfigResult, HeraldConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use herald_core::{BotContext, BoxedMessage, CommandDescriptor, CommandSource};
use herald_framework::{
    DispatchConfig, DispatchOutcome, Dispatcher, LoadReport, Loader, initialize,
};

/// Counts of dispatched messages by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub received: usize,
    pub ignored: usize,
    pub unknown: usize,
    pub denied: usize,
    pub executed: usize,
    pub failed: usize,
}

impl RuntimeStats {
    fn record(&mut self, result: Result<Result<DispatchOutcome, std::convert::Infallible>, JoinError>) {
        match result {
            Ok(Ok(outcome)) => match outcome {
                DispatchOutcome::Ignored => self.ignored += 1,
                DispatchOutcome::UnknownCommand(_) => self.unknown += 1,
                DispatchOutcome::Denied(_) => self.denied += 1,
                DispatchOutcome::Executed => self.executed += 1,
                DispatchOutcome::Failed(_) => self.failed += 1,
            },
            Ok(Err(never)) => match never {},
            Err(err) => {
                error!(error = %err, "Dispatch task aborted");
                self.failed += 1;
            }
        }
    }
}

/// The Herald runtime.
///
/// ```rust,ignore
/// let mut runtime = HeraldRuntime::builder()
///     .config_file("config/herald.toml")
///     .build()?;
/// let report = runtime.load(LinkedCommands, bot).await;
/// runtime.run_until(rx, shutdown_signal).await?;
/// ```
pub struct HeraldRuntime {
    config: HeraldConfig,
    dispatcher: Option<Dispatcher>,
}

impl HeraldRuntime {
    /// Creates a runtime with automatic configuration loading.
    ///
    /// Falls back to defaults if the configuration cannot be loaded.
    pub fn new() -> Self {
        let config = ConfigLoader::new().load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config ({e}), using defaults");
            HeraldConfig::default()
        });

        Self::from_config(&config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration and initializes logging.
    pub fn from_config(config: &HeraldConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            prefix = %config.bot.prefix,
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            dispatcher: None,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    /// Settings handed to the dispatcher.
    pub fn dispatch_config(&self) -> DispatchConfig {
        self.config.bot.to_dispatch_config()
    }

    /// Loads commands from `source`, runs their `init` hooks and prepares the
    /// dispatcher.
    ///
    /// Calling `load` again replaces the previously loaded commands.
    pub async fn load(&mut self, source: impl CommandSource, bot: BotContext) -> LoadReport {
        let (registry, report) = Loader::new().load(source).finish();
        initialize(&registry, &bot).await;

        if !report.is_clean() {
            warn!(
                rejected = report.errors.len(),
                "Some commands were rejected; see errors above"
            );
        }

        self.dispatcher = Some(Dispatcher::new(
            Arc::new(registry),
            bot,
            &self.dispatch_config(),
        ));
        report
    }

    /// The dispatcher built by [`load`](Self::load).
    pub fn dispatcher(&self) -> RuntimeResult<&Dispatcher> {
        self.dispatcher.as_ref().ok_or(RuntimeError::NotLoaded)
    }

    /// Snapshot of the loaded commands, in registration order.
    pub fn commands(&self) -> Vec<Arc<CommandDescriptor>> {
        self.dispatcher
            .as_ref()
            .map(|d| d.registry().list())
            .unwrap_or_default()
    }

    /// Dispatches messages until the channel closes.
    pub async fn run(&self, messages: mpsc::Receiver<BoxedMessage>) -> RuntimeResult<RuntimeStats> {
        self.run_until(messages, std::future::pending()).await
    }

    /// Dispatches messages until the channel closes or `shutdown` completes.
    ///
    /// Each message is handled in its own task.  Tasks still in flight when
    /// the loop ends are awaited before returning.
    pub async fn run_until<F>(
        &self,
        mut messages: mpsc::Receiver<BoxedMessage>,
        shutdown: F,
    ) -> RuntimeResult<RuntimeStats>
    where
        F: Future<Output = ()>,
    {
        let dispatcher = self.dispatcher()?.clone();
        let mut tasks = JoinSet::new();
        let mut stats = RuntimeStats::default();
        tokio::pin!(shutdown);

        info!(
            commands = dispatcher.registry().len(),
            prefix = %dispatcher.prefix(),
            "Herald runtime is now running"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                message = messages.recv() => match message {
                    Some(message) => {
                        stats.received += 1;
                        tasks.spawn(dispatcher.clone().oneshot(message));
                    }
                    None => {
                        debug!("Message channel closed");
                        break;
                    }
                },
                Some(result) = tasks.join_next(), if !tasks.is_empty() => stats.record(result),
            }
        }

        if !tasks.is_empty() {
            debug!(in_flight = tasks.len(), "Waiting for in-flight commands");
        }
        while let Some(result) = tasks.join_next().await {
            stats.record(result);
        }

        info!(
            received = stats.received,
            executed = stats.executed,
            failed = stats.failed,
            denied = stats.denied,
            "Runtime stopped"
        );
        Ok(stats)
    }
}

impl Default for HeraldRuntime {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`HeraldRuntime`] with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: HeraldConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> ConfigResult<HeraldRuntime> {
        let config = self.config_loader.load()?;
        Ok(HeraldRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use herald_core::{
        BoxError, Channel, ChatResult, CommandInfo, InboundMessage, Member, SentMessage,
        StaticCommands, command_fn,
    };
    use parking_lot::Mutex;
    use tokio::sync::Notify;

    use super::*;

    struct Console;

    impl Member for Console {
        fn id(&self) -> &str {
            "console"
        }

        fn has_permission(&self, _permission: &str) -> bool {
            false
        }
    }

    struct Discard;

    #[async_trait]
    impl SentMessage for Discard {
        async fn delete(&self) -> ChatResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Transcript(Mutex<Vec<String>>);

    #[async_trait]
    impl Channel for Transcript {
        async fn send(&self, text: &str) -> ChatResult<Box<dyn SentMessage>> {
            self.0.lock().push(text.to_string());
            Ok(Box::new(Discard))
        }
    }

    struct Line {
        content: String,
        channel: Arc<Transcript>,
    }

    impl InboundMessage for Line {
        fn content(&self) -> &str {
            &self.content
        }

        fn member(&self) -> &dyn Member {
            &Console
        }

        fn channel(&self) -> &dyn Channel {
            self.channel.as_ref()
        }
    }

    fn line(content: &str, channel: &Arc<Transcript>) -> BoxedMessage {
        Arc::new(Line {
            content: content.to_string(),
            channel: Arc::clone(channel),
        })
    }

    fn runtime() -> HeraldRuntime {
        HeraldRuntime::from_config(&HeraldConfig::default())
    }

    fn ping() -> herald_core::BoxedCommand {
        Arc::new(command_fn(|_, msg: BoxedMessage, _| async move {
            msg.channel().send("pong").await?;
            Ok::<(), BoxError>(())
        }))
    }

    #[tokio::test]
    async fn test_run_before_load_fails() {
        let (_tx, rx) = mpsc::channel(1);
        let result = runtime().run(rx).await;
        assert!(matches!(result, Err(RuntimeError::NotLoaded)));
        assert!(runtime().commands().is_empty());
    }

    #[tokio::test]
    async fn test_load_reports_and_exposes_commands() {
        let mut runtime = runtime();
        let source = StaticCommands::new()
            .command("ping.rs", ping(), CommandInfo::new("ping", "!ping", "Pong"))
            .candidate("broken.rs", || Ok(None))
            .candidate("_util.rs", || Ok(None));

        let report = runtime.load(&source, BotContext::empty()).await;
        assert_eq!(report.registered, ["ping"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.skipped, ["_util.rs"]);

        let names: Vec<_> = runtime.commands().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, ["ping"]);
    }

    #[tokio::test]
    async fn test_run_dispatches_until_channel_closes() {
        let mut runtime = runtime();
        let source = StaticCommands::new().command(
            "ping.rs",
            ping(),
            CommandInfo::new("ping", "!ping", "Pong"),
        );
        runtime.load(&source, BotContext::empty()).await;

        let transcript = Arc::new(Transcript::default());
        let (tx, rx) = mpsc::channel(8);
        for content in ["!ping", "hello", "!nope", "!PING"] {
            tx.send(line(content, &transcript)).await.unwrap();
        }
        drop(tx);

        let stats = runtime.run(rx).await.unwrap();
        assert_eq!(
            stats,
            RuntimeStats {
                received: 4,
                ignored: 1,
                unknown: 1,
                executed: 2,
                ..Default::default()
            }
        );
        assert_eq!(*transcript.0.lock(), ["pong", "pong"]);
    }

    #[tokio::test]
    async fn test_slow_command_does_not_block_others() {
        let gate = Arc::new(Notify::new());
        let waiter = Arc::clone(&gate);
        let wait = Arc::new(command_fn(move |_, _, _| {
            let gate = Arc::clone(&waiter);
            async move {
                gate.notified().await;
                Ok::<(), BoxError>(())
            }
        }));
        let opener = Arc::clone(&gate);
        let release = Arc::new(command_fn(move |_, _, _| {
            let gate = Arc::clone(&opener);
            async move {
                gate.notify_one();
                Ok::<(), BoxError>(())
            }
        }));

        let mut runtime = runtime();
        let source = StaticCommands::new()
            .command("wait.rs", wait, CommandInfo::new("wait", "!wait", "Waits"))
            .command("release.rs", release, CommandInfo::new("release", "!release", "Releases"));
        runtime.load(&source, BotContext::empty()).await;

        let transcript = Arc::new(Transcript::default());
        let (tx, rx) = mpsc::channel(8);
        tx.send(line("!wait", &transcript)).await.unwrap();
        tx.send(line("!release", &transcript)).await.unwrap();
        drop(tx);

        let stats = tokio::time::timeout(Duration::from_secs(5), runtime.run(rx))
            .await
            .expect("dispatch loop deadlocked")
            .unwrap();
        assert_eq!(stats.executed, 2);
    }

    #[tokio::test]
    async fn test_run_until_stops_on_shutdown() {
        let mut runtime = runtime();
        runtime
            .load(StaticCommands::new(), BotContext::empty())
            .await;

        let (_tx, rx) = mpsc::channel::<BoxedMessage>(1);
        let stats = runtime.run_until(rx, async {}).await.unwrap();
        assert_eq!(stats, RuntimeStats::default());
    }

    #[test]
    fn test_dispatch_config_follows_bot_config() {
        let mut config = HeraldConfig::default();
        config.bot.prefix = "?".to_string();
        config.bot.owner_id = Some("7".to_string());
        config.bot.notice_ttl_ms = 1500;

        let runtime = HeraldRuntime::from_config(&config);
        let dispatch = runtime.dispatch_config();
        assert_eq!(dispatch.prefix, "?");
        assert_eq!(dispatch.effective_owner_id(), "7");
        assert_eq!(dispatch.notice_ttl, Duration::from_millis(1500));
    }
}
