//! Opaque bot handle passed to command hooks.
//!
//! The framework never looks inside a [`BotContext`]; it only clones it and
//! hands it to [`Command::init`](crate::Command::init) and
//! [`Command::run`](crate::Command::run).  Commands recover the concrete bot
//! type with [`BotContext::downcast`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A cheaply cloneable, type-erased handle to the application's bot.
///
/// # Example
///
/// ```rust
/// use herald_core::BotContext;
///
/// struct MyBot { name: &'static str }
///
/// let ctx = BotContext::new(MyBot { name: "herald" });
/// let bot = ctx.downcast::<MyBot>().unwrap();
/// assert_eq!(bot.name, "herald");
/// ```
#[derive(Clone)]
pub struct BotContext {
    inner: Arc<dyn Any + Send + Sync>,
}

impl BotContext {
    /// Wraps an owned bot value.
    pub fn new<T: Any + Send + Sync>(bot: T) -> Self {
        Self::from_arc(Arc::new(bot))
    }

    /// Wraps an already shared bot value.
    pub fn from_arc<T: Any + Send + Sync>(bot: Arc<T>) -> Self {
        Self { inner: bot }
    }

    /// A context carrying no bot at all.
    pub fn empty() -> Self {
        Self::new(())
    }

    /// Returns `true` if the wrapped bot is of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_ref().is::<T>()
    }

    /// Returns the wrapped bot as `Arc<T>`, or `None` on a type mismatch.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }
}

impl Default for BotContext {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for BotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    #[test]
    fn test_downcast_shares_the_same_bot() {
        let shared = Arc::new(Counter(7));
        let ctx = BotContext::from_arc(Arc::clone(&shared));

        let bot = ctx.downcast::<Counter>().unwrap();
        assert_eq!(bot.0, 7);
        assert!(Arc::ptr_eq(&bot, &shared));
    }

    #[test]
    fn test_downcast_mismatch() {
        let ctx = BotContext::new(Counter(1));
        assert!(ctx.is::<Counter>());
        assert!(!ctx.is::<String>());
        assert!(ctx.downcast::<String>().is_none());
    }

    #[test]
    fn test_empty_context() {
        assert!(BotContext::default().is::<()>());
    }
}
