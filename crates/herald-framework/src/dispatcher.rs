//! Message dispatcher.
//!
//! The [`Dispatcher`] turns one inbound message into at most one command
//! invocation:
//!
//! 1. The content must start with the configured prefix, otherwise the
//!    message is ignored.
//! 2. The rest is split on whitespace; the first token names the command and
//!    the remaining tokens are its arguments.
//! 3. Unknown commands are ignored silently.
//! 4. Denied callers get a `:no_entry_sign:` notice.
//! 5. The handler runs; if it fails or panics the caller gets an `:x:` notice.
//!
//! Notices are deleted after the configured TTL by a detached task.  Nothing
//! that happens during dispatch is propagated to the caller: the outcome is
//! reported through [`DispatchOutcome`] only.
//!
//! # Tower integration
//!
//! `Dispatcher` implements `tower::Service<BoxedMessage>` with
//! `Error = Infallible`, so middleware can wrap it:
//!
//! ```rust,ignore
//! use tower::ServiceExt;
//!
//! let outcome = dispatcher.clone().oneshot(message).await?;
//! ```

use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::FutureExt;
use tower::Service;
use tracing::{Instrument, debug, info_span, trace, warn};

use herald_core::{BotContext, BoxedMessage, Channel, panic_message};

use crate::authorizer::Authorizer;
use crate::config::DispatchConfig;
use crate::registry::Registry;

const DENIAL_PREFIX: &str = ":no_entry_sign: ";
const FAILURE_PREFIX: &str = ":x: ";
const UNKNOWN_ERROR: &str = "An unknown error has occurred!";

/// Which branch a dispatched message took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command: wrong prefix or nothing after it.
    Ignored,
    /// No command with that name or alias.
    UnknownCommand(String),
    /// The caller was refused; carries the denial text.
    Denied(String),
    /// The handler completed.
    Executed,
    /// The handler failed; carries the reported text.
    Failed(String),
}

/// A parsed command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The command token as typed.
    pub name: String,
    /// Remaining whitespace-separated tokens.
    pub args: Vec<String>,
}

/// Splits `content` into a command name and arguments.
///
/// Returns `None` if `content` does not start with `prefix` or nothing but
/// whitespace follows it.
pub fn parse_invocation(content: &str, prefix: &str) -> Option<Invocation> {
    let rest = content.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_string();
    Some(Invocation {
        name,
        args: tokens.map(str::to_string).collect(),
    })
}

/// Routes inbound messages to registered commands.
///
/// Cheap to clone: the registry is shared.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    authorizer: Authorizer,
    bot: BotContext,
    prefix: Arc<str>,
    notice_ttl: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher over a finished registry.
    pub fn new(registry: Arc<Registry>, bot: BotContext, config: &DispatchConfig) -> Self {
        Self {
            registry,
            authorizer: Authorizer::new(config),
            bot,
            prefix: Arc::from(config.prefix.as_str()),
            notice_ttl: config.notice_ttl,
        }
    }

    /// The registry commands are resolved against.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The configured command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handles one message.
    pub async fn dispatch(&self, message: BoxedMessage) -> DispatchOutcome {
        let Some(Invocation { name, args }) = parse_invocation(message.content(), &self.prefix)
        else {
            trace!("Message is not a command");
            return DispatchOutcome::Ignored;
        };

        let span = info_span!("dispatch", command = %name);
        self.invoke(name, args, message).instrument(span).await
    }

    async fn invoke(&self, name: String, args: Vec<String>, message: BoxedMessage) -> DispatchOutcome {
        let Some(command) = self.registry.find(&name) else {
            debug!("Unknown command");
            return DispatchOutcome::UnknownCommand(name);
        };

        if let Err(denial) = self.authorizer.check(command, message.member()) {
            debug!(member = %message.member().id(), %denial, "Command denied");
            let text = denial.to_string();
            self.notify(message.channel(), DENIAL_PREFIX, &text).await;
            return DispatchOutcome::Denied(text);
        }

        debug!(args = args.len(), "Running command");
        let run = command
            .handler()
            .run(self.bot.clone(), Arc::clone(&message), args);
        let reason = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(())) => return DispatchOutcome::Executed,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()).unwrap_or_default().to_string(),
        };

        warn!(error = %reason, "Command failed");
        let text = if reason.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            reason
        };
        self.notify(message.channel(), FAILURE_PREFIX, &text).await;
        DispatchOutcome::Failed(text)
    }

    /// Sends a transient notice and schedules its deletion.
    async fn notify(&self, channel: &dyn Channel, marker: &str, text: &str) {
        match channel.send(&format!("{marker}{text}")).await {
            Ok(sent) => {
                let ttl = self.notice_ttl;
                tokio::spawn(async move {
                    tokio::time::sleep(ttl).await;
                    let _ = sent.delete().await;
                });
            }
            Err(err) => warn!(error = %err, "Failed to send notice"),
        }
    }
}

impl Service<BoxedMessage> for Dispatcher {
    type Response = DispatchOutcome;
    type Error = Infallible;
    type Future =
        Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, message: BoxedMessage) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.dispatch(message).await) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use herald_core::{BoxError, CommandInfo, StaticCommands, command_fn};
    use tower::ServiceExt;

    use super::*;
    use crate::config::DEFAULT_OWNER_ID;
    use crate::loader::Loader;
    use crate::testing::{
        RecordingChannel, TestMember, failing_command, message, recording_command,
    };

    fn dispatcher_for(source: StaticCommands) -> Dispatcher {
        let (registry, report) = Loader::new().load(&source).finish();
        assert!(report.is_clean(), "{:?}", report.errors);
        Dispatcher::new(Arc::new(registry), BotContext::empty(), &DispatchConfig::default())
    }

    fn anyone() -> TestMember {
        TestMember::new("42", &[])
    }

    #[test]
    fn test_parse_invocation() {
        assert_eq!(
            parse_invocation("!ping", "!"),
            Some(Invocation {
                name: "ping".into(),
                args: vec![]
            })
        );
        assert_eq!(
            parse_invocation("!  say   hello\tworld ", "!"),
            Some(Invocation {
                name: "say".into(),
                args: vec!["hello".into(), "world".into()]
            })
        );
        assert_eq!(
            parse_invocation(">>ban bob", ">>").map(|i| i.name),
            Some("ban".to_string())
        );
        assert_eq!(parse_invocation("hello", "!"), None);
        assert_eq!(parse_invocation("!", "!"), None);
        assert_eq!(parse_invocation("!   ", "!"), None);
        assert_eq!(parse_invocation(" !ping", "!"), None);
    }

    #[tokio::test]
    async fn test_prefixed_message_runs_command_with_args() {
        let (ping, calls) = recording_command();
        let dispatcher = dispatcher_for(
            StaticCommands::new().command("ping.rs", ping, CommandInfo::new("ping", "!ping", "Pong")),
        );
        let channel = RecordingChannel::default();

        let outcome = dispatcher.dispatch(message("!ping", anyone(), &channel)).await;
        assert_eq!(outcome, DispatchOutcome::Executed);

        let outcome = dispatcher.dispatch(message("!PING a  b", anyone(), &channel)).await;
        assert_eq!(outcome, DispatchOutcome::Executed);

        assert_eq!(*calls.lock(), [vec![], vec!["a".to_string(), "b".to_string()]]);
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_alias_resolves() {
        let (ping, calls) = recording_command();
        let dispatcher = dispatcher_for(StaticCommands::new().command(
            "ping.rs",
            ping,
            CommandInfo::new("ping", "!ping", "Pong").alias("p"),
        ));
        let channel = RecordingChannel::default();

        assert_eq!(
            dispatcher.dispatch(message("!P", anyone(), &channel)).await,
            DispatchOutcome::Executed
        );
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_non_commands_are_silent() {
        let (ping, calls) = recording_command();
        let dispatcher = dispatcher_for(
            StaticCommands::new().command("ping.rs", ping, CommandInfo::new("ping", "!ping", "Pong")),
        );
        let channel = RecordingChannel::default();

        for content in ["hello", "", "!", "?ping"] {
            assert_eq!(
                dispatcher.dispatch(message(content, anyone(), &channel)).await,
                DispatchOutcome::Ignored,
                "{content:?}"
            );
        }
        assert_eq!(
            dispatcher.dispatch(message("!pong", anyone(), &channel)).await,
            DispatchOutcome::UnknownCommand("pong".into())
        );
        assert!(calls.lock().is_empty());
        assert!(channel.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_denial_sends_one_transient_notice() {
        let (ban, calls) = recording_command();
        let dispatcher = dispatcher_for(StaticCommands::new().command(
            "ban.rs",
            ban,
            CommandInfo::new("ban", "!ban <user>", "Bans a user").permission("BAN_MEMBERS"),
        ));
        let channel = RecordingChannel::default();

        let outcome = dispatcher.dispatch(message("!ban bob", anyone(), &channel)).await;
        let expected = "You need the permission `BAN_MEMBERS` to use this command.";
        assert_eq!(outcome, DispatchOutcome::Denied(expected.into()));
        assert!(calls.lock().is_empty());
        assert_eq!(channel.sent(), [format!(":no_entry_sign: {expected}")]);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(channel.deleted().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(channel.deleted(), channel.sent());

        let moderator = TestMember::new("42", &["BAN_MEMBERS"]);
        let outcome = dispatcher.dispatch(message("!ban bob", moderator, &channel)).await;
        assert_eq!(outcome, DispatchOutcome::Executed);
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_owner_only_uses_default_owner() {
        let (shutdown, calls) = recording_command();
        let dispatcher = dispatcher_for(StaticCommands::new().command(
            "shutdown.rs",
            shutdown,
            CommandInfo::new("shutdown", "!shutdown", "Stops the bot").owner_only(true),
        ));
        let channel = RecordingChannel::default();

        assert_eq!(
            dispatcher.dispatch(message("!shutdown", anyone(), &channel)).await,
            DispatchOutcome::Denied("Only the owner of the bot can use this command.".into())
        );
        let owner = TestMember::new(DEFAULT_OWNER_ID, &[]);
        assert_eq!(
            dispatcher.dispatch(message("!shutdown", owner, &channel)).await,
            DispatchOutcome::Executed
        );
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_reported_and_dispatch_continues() {
        let (boom, boom_calls) = failing_command("boom");
        let (ping, ping_calls) = recording_command();
        let dispatcher = dispatcher_for(
            StaticCommands::new()
                .command("boom.rs", boom, CommandInfo::new("boom", "!boom", "Fails"))
                .command("ping.rs", ping, CommandInfo::new("ping", "!ping", "Pong")),
        );
        let channel = RecordingChannel::default();

        assert_eq!(
            dispatcher.dispatch(message("!boom", anyone(), &channel)).await,
            DispatchOutcome::Failed("boom".into())
        );
        assert_eq!(boom_calls.load(Ordering::SeqCst), 1);
        assert_eq!(channel.sent(), [":x: boom"]);

        assert_eq!(
            dispatcher.dispatch(message("!ping", anyone(), &channel)).await,
            DispatchOutcome::Executed
        );
        assert_eq!(ping_calls.lock().len(), 1);
        assert_eq!(channel.sent().len(), 1);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(channel.deleted(), [":x: boom"]);
    }

    #[tokio::test]
    async fn test_panics_and_empty_errors_use_fallback_text() {
        let panics = Arc::new(command_fn(|_, _, _| async {
            if true {
                panic!("{}", 42);
            }
            Ok::<(), BoxError>(())
        }));
        let silent = Arc::new(command_fn(|_, _, _| async { Err::<(), BoxError>("".into()) }));
        let dispatcher = dispatcher_for(
            StaticCommands::new()
                .command("panics.rs", panics, CommandInfo::new("panics", "!panics", "p"))
                .command("silent.rs", silent, CommandInfo::new("silent", "!silent", "s")),
        );
        let channel = RecordingChannel::default();

        assert_eq!(
            dispatcher.dispatch(message("!panics", anyone(), &channel)).await,
            DispatchOutcome::Failed("42".into())
        );
        assert_eq!(
            dispatcher.dispatch(message("!silent", anyone(), &channel)).await,
            DispatchOutcome::Failed(UNKNOWN_ERROR.into())
        );
        assert_eq!(
            channel.sent(),
            [":x: 42".to_string(), format!(":x: {UNKNOWN_ERROR}")]
        );
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let (boom, _) = failing_command("boom");
        let dispatcher = dispatcher_for(
            StaticCommands::new().command("boom.rs", boom, CommandInfo::new("boom", "!boom", "b")),
        );
        let channel = RecordingChannel {
            fail_sends: true,
            ..RecordingChannel::default()
        };

        assert_eq!(
            dispatcher.dispatch(message("!boom", anyone(), &channel)).await,
            DispatchOutcome::Failed("boom".into())
        );
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_tower_service() {
        let (ping, calls) = recording_command();
        let dispatcher = dispatcher_for(
            StaticCommands::new().command("ping.rs", ping, CommandInfo::new("ping", "!ping", "Pong")),
        );
        let channel = RecordingChannel::default();

        let outcome = dispatcher
            .clone()
            .oneshot(message("!ping x", anyone(), &channel))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Executed);
        assert_eq!(*calls.lock(), [vec!["x".to_string()]]);
    }
}
