//! Chat collaborator traits.
//!
//! Herald does not talk to a chat service itself.  Adapters implement these
//! traits for their platform and feed [`BoxedMessage`]s into the dispatcher:
//!
//! - [`InboundMessage`]: the text that arrived, who sent it and where to reply.
//! - [`Member`]: the sender's identity and permission check.
//! - [`Channel`]: the reply channel.
//! - [`SentMessage`]: a message the bot posted, which can later be removed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChatResult;

/// The author of an inbound message.
pub trait Member: Send + Sync {
    /// Platform identifier of the member.
    fn id(&self) -> &str;

    /// Returns `true` if the member holds the given capability token.
    fn has_permission(&self, permission: &str) -> bool;
}

/// A message posted by the bot.
#[async_trait]
pub trait SentMessage: Send + Sync {
    /// Removes the message from the channel.
    async fn delete(&self) -> ChatResult<()>;
}

/// A place the bot can reply to.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Posts `text` and returns a handle to the posted message.
    async fn send(&self, text: &str) -> ChatResult<Box<dyn SentMessage>>;
}

/// A chat message received by the bot.
pub trait InboundMessage: Send + Sync {
    /// Raw text content.
    fn content(&self) -> &str;

    /// The sender.
    fn member(&self) -> &dyn Member;

    /// The channel replies should go to.
    fn channel(&self) -> &dyn Channel;
}

/// A shared inbound message.
pub type BoxedMessage = Arc<dyn InboundMessage>;
