//! Dispatch configuration.

use std::time::Duration;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "!";

/// Owner identity used when none is configured.
pub const DEFAULT_OWNER_ID: &str = "138048234819026944";

/// Lifetime of denial and error notices before they are deleted.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Settings read by the dispatcher and the authorizer.
///
/// Built once at startup and injected at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Text every command message starts with.
    pub prefix: String,
    /// Identity allowed to run owner-only commands.
    pub owner_id: Option<String>,
    /// How long transient notices stay in the channel.
    pub notice_ttl: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            owner_id: None,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}

impl DispatchConfig {
    /// Default settings with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Sets the owner identity.
    pub fn owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Sets the notice lifetime.
    pub fn notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// The configured owner, or [`DEFAULT_OWNER_ID`].
    pub fn effective_owner_id(&self) -> &str {
        self.owner_id.as_deref().unwrap_or(DEFAULT_OWNER_ID)
    }
}
