//! Warning sink handed to the builder.
//!
//! The builder reports recoverable problems through this port instead of a
//! global logger, so hosts choose where warnings go and tests can inspect them.

use std::sync::{Mutex, PoisonError};

/// Receives warnings emitted while building the context.
pub trait WarningSink {
    fn warn(&self, message: &str);
}

/// Forwards warnings to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Collects warnings in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WarningSink for MemorySink {
    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

impl<T: WarningSink + ?Sized> WarningSink for &T {
    fn warn(&self, message: &str) {
        (**self).warn(message)
    }
}
