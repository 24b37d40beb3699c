//! Error types shared by every Herald crate.

use std::any::Any;

use thiserror::Error;

/// Type-erased error returned by command handlers and candidate loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the chat collaborators (channels, sent messages).
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Message deletion failed.
    #[error("failed to delete message: {0}")]
    DeleteFailed(String),

    /// The chat backend is not reachable.
    #[error("chat backend not connected")]
    NotConnected,
}

impl ChatError {
    /// Creates a send failure.
    pub fn send(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }

    /// Creates a delete failure.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteFailed(msg.into())
    }
}

/// Result type for chat collaborator operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Extracts the message carried by a panic payload, if it is a string.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_str_and_string() {
        let literal = std::panic::catch_unwind(|| panic!("static boom")).unwrap_err();
        assert_eq!(panic_message(literal.as_ref()), Some("static boom"));

        let owned = std::panic::catch_unwind(|| panic!("{} boom", "formatted")).unwrap_err();
        assert_eq!(panic_message(owned.as_ref()), Some("formatted boom"));
    }

    #[test]
    fn test_panic_message_non_string_payload() {
        let payload = std::panic::catch_unwind(|| std::panic::panic_any(42_u32)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), None);
    }
}
