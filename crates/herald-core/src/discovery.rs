//! Command discovery.
//!
//! A [`CommandSource`] enumerates [`Candidate`]s: an identifier plus a loader
//! that produces a raw [`CommandExport`].  Two sources ship with Herald:
//!
//! - [`LinkedCommands`] walks the [`LINKED_COMMANDS`] distributed slice.  Any
//!   crate linked into the binary contributes entries with
//!   [`define_command!`](crate::define_command), so commands are discovered
//!   without a central list.
//! - [`StaticCommands`] is an explicit, programmatic list.
//!
//! Candidates whose identifier ends in a component starting with `_` are
//! support code, not commands (see [`Candidate::is_private`]).

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use linkme::distributed_slice;

use crate::command::{BoxedCommand, CommandExport, CommandInfo};
use crate::error::BoxError;

/// Result of loading a single candidate.  `Ok(None)` means the candidate
/// exported nothing.
pub type LoadResult = Result<Option<CommandExport>, BoxError>;

/// Loader function stored in the distributed slice.
pub type LoadFn = fn() -> LoadResult;

// =============================================================================
// Linked commands (linkme distributed slice)
// =============================================================================

/// One entry contributed by [`define_command!`](crate::define_command).
#[derive(Debug, Clone, Copy)]
pub struct LinkedCommand {
    /// `module_path::STATIC_NAME` of the defining item.
    pub source: &'static str,
    /// Produces the raw export.
    pub load: LoadFn,
}

/// Registry of every command linked into the binary.
#[distributed_slice]
pub static LINKED_COMMANDS: [LinkedCommand];

/// Registers a command candidate in [`LINKED_COMMANDS`].
///
/// The right-hand side is a `fn() -> LoadResult`.  The candidate identifier is
/// the module path followed by the static's name, so a static whose name
/// starts with `_` is skipped by the loader.
///
/// ```rust,ignore
/// fn load_ping() -> herald_core::LoadResult {
///     Ok(Some(CommandExport::new(Ping, CommandInfo::new("ping", "!ping", "Pong!"))))
/// }
///
/// herald_core::define_command! {
///     /// The ping command.
///     pub static PING = load_ping;
/// }
/// ```
#[macro_export]
macro_rules! define_command {
    ($(#[$meta:meta])* $vis:vis static $name:ident = $load:expr $(;)?) => {
        $(#[$meta])*
        #[$crate::__linkme::distributed_slice($crate::discovery::LINKED_COMMANDS)]
        #[linkme(crate = $crate::__linkme)]
        $vis static $name: $crate::discovery::LinkedCommand = $crate::discovery::LinkedCommand {
            source: ::core::concat!(::core::module_path!(), "::", ::core::stringify!($name)),
            load: $load,
        };
    };
}

// =============================================================================
// Candidate
// =============================================================================

type SharedLoad = Arc<dyn Fn() -> LoadResult + Send + Sync>;

/// A discovered, not yet validated command.
#[derive(Clone)]
pub struct Candidate {
    id: Cow<'static, str>,
    load: SharedLoad,
}

impl Candidate {
    /// Creates a candidate from an identifier and a loader.
    pub fn new<F>(id: impl Into<Cow<'static, str>>, load: F) -> Self
    where
        F: Fn() -> LoadResult + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            load: Arc::new(load),
        }
    }

    /// Stable identifier used in reports.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The last component of the identifier, split on `/`, `\` and `::`.
    pub fn base_name(&self) -> &str {
        let id: &str = &self.id;
        let tail = id.rsplit(['/', '\\']).next().unwrap_or(id);
        tail.rsplit("::").next().unwrap_or(tail)
    }

    /// Support files are marked with a leading underscore.
    pub fn is_private(&self) -> bool {
        self.base_name().starts_with('_')
    }

    /// Runs the loader.
    pub fn load(&self) -> LoadResult {
        (self.load)()
    }
}

impl From<&LinkedCommand> for Candidate {
    fn from(linked: &LinkedCommand) -> Self {
        let load = linked.load;
        Self::new(linked.source, load)
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate").field("id", &self.id).finish()
    }
}

// =============================================================================
// Sources
// =============================================================================

/// Something that can enumerate command candidates.
pub trait CommandSource {
    /// All candidates, in discovery order.
    fn candidates(&self) -> Vec<Candidate>;
}

/// Source backed by the [`LINKED_COMMANDS`] distributed slice.
///
/// Link order decides discovery order, and therefore which of two
/// conflicting commands wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedCommands;

impl CommandSource for LinkedCommands {
    fn candidates(&self) -> Vec<Candidate> {
        LINKED_COMMANDS.iter().map(Candidate::from).collect()
    }
}

/// Source backed by an explicit list.
#[derive(Debug, Clone, Default)]
pub struct StaticCommands {
    candidates: Vec<Candidate>,
}

impl StaticCommands {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary candidate.
    pub fn candidate<F>(mut self, id: impl Into<Cow<'static, str>>, load: F) -> Self
    where
        F: Fn() -> LoadResult + Send + Sync + 'static,
    {
        self.candidates.push(Candidate::new(id, load));
        self
    }

    /// Appends a well-formed command.
    pub fn command(
        self,
        id: impl Into<Cow<'static, str>>,
        handler: BoxedCommand,
        info: CommandInfo,
    ) -> Self {
        self.candidate(id, move || {
            Ok(Some(CommandExport::shared(Arc::clone(&handler), &info)))
        })
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns `true` if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl CommandSource for StaticCommands {
    fn candidates(&self) -> Vec<Candidate> {
        self.candidates.clone()
    }
}

impl<S: CommandSource + ?Sized> CommandSource for &S {
    fn candidates(&self) -> Vec<Candidate> {
        (**self).candidates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::command_fn;

    fn load_linked_echo() -> LoadResult {
        let echo = command_fn(|_, _, _| async { Ok::<(), BoxError>(()) });
        Ok(Some(CommandExport::new(
            echo,
            CommandInfo::new("linked-echo", "!linked-echo", "Echo"),
        )))
    }

    fn load_nothing() -> LoadResult {
        Ok(None)
    }

    crate::define_command! {
        static LINKED_ECHO = load_linked_echo;
    }

    crate::define_command! {
        static _LINKED_SUPPORT = load_nothing;
    }

    #[test]
    fn test_base_name_and_private_marker() {
        let cases = [
            ("commands/ping.rs", "ping.rs", false),
            ("commands/_shared.rs", "_shared.rs", true),
            ("commands\\admin\\_util", "_util", true),
            ("my_bot::commands::_HELPERS", "_HELPERS", true),
            ("my_bot::_private::PING", "PING", false),
            ("_top", "_top", true),
        ];
        for (id, base, private) in cases {
            let candidate = Candidate::new(id, || Ok(None));
            assert_eq!(candidate.base_name(), base, "{id}");
            assert_eq!(candidate.is_private(), private, "{id}");
        }
    }

    #[test]
    fn test_linked_commands_are_discovered() {
        let candidates = LinkedCommands.candidates();
        let echo = candidates
            .iter()
            .find(|c| c.id().ends_with("::LINKED_ECHO"))
            .expect("linked candidate missing");
        assert!(!echo.is_private());
        assert!(echo.load().unwrap().is_some());

        let support = candidates
            .iter()
            .find(|c| c.id().ends_with("::_LINKED_SUPPORT"))
            .expect("support candidate missing");
        assert!(support.is_private());
    }

    #[test]
    fn test_static_commands_keep_order() {
        let handler: BoxedCommand = Arc::new(command_fn(|_, _, _| async {
            Ok::<(), BoxError>(())
        }));
        let source = StaticCommands::new()
            .command("a", Arc::clone(&handler), CommandInfo::new("a", "!a", "A"))
            .candidate("b", || Err("broken".into()))
            .command("c", handler, CommandInfo::new("c", "!c", "C"));

        let ids: Vec<_> = source.candidates().iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(source.len(), 3);
        assert!(source.candidates()[1].load().is_err());
    }
}
