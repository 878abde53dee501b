//! Panic containment for calls into plugin-authored code.

use super::api::{PluginError, PluginResult};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Extract a human-readable message from a panic payload.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "non-string panic payload".to_string()
}

/// Run `f`, turning a panic into [`PluginError::Panicked`].
pub fn guard<T>(op: &'static str, f: impl FnOnce() -> PluginResult<T>) -> PluginResult<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(PluginError::Panicked {
            op: op.to_string(),
            message: panic_message(payload),
        }),
    }
}
