//! Input-simulation sinks.
//!
//! [`InputSink`] is the seam between the dispatcher and whatever actually
//! moves the pointer or types keys.  The core ships three backends that need
//! no OS access: [`LogSink`] (dry run), [`NullSink`] and [`RecordingSink`].

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::action::MouseButton;

/// Failure reported by an input backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("unsupported key '{0}'")]
    UnsupportedKey(String),

    #[error("input backend error: {0}")]
    Backend(String),
}

/// Something that can simulate keyboard and mouse input.
pub trait InputSink: Send {
    fn press_key(&mut self, key: &str) -> Result<(), SinkError>;
    fn click(&mut self, button: MouseButton) -> Result<(), SinkError>;
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), SinkError>;
}

impl<S: InputSink + ?Sized> InputSink for Box<S> {
    fn press_key(&mut self, key: &str) -> Result<(), SinkError> { (**self).press_key(key) }
    fn click(&mut self, button: MouseButton) -> Result<(), SinkError> { (**self).click(button) }
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> { (**self).move_relative(dx, dy) }
}

// ── null backend ──────────────────────────────────────────────────────────

/// Accepts everything, does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl InputSink for NullSink {
    fn press_key(&mut self, _key: &str) -> Result<(), SinkError>          { Ok(()) }
    fn click(&mut self, _button: MouseButton) -> Result<(), SinkError>    { Ok(()) }
    fn move_relative(&mut self, _dx: i32, _dy: i32) -> Result<(), SinkError> { Ok(()) }
}

// ── logging backend ───────────────────────────────────────────────────────

/// Logs each simulated input at `info` level instead of performing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl InputSink for LogSink {
    fn press_key(&mut self, key: &str) -> Result<(), SinkError> {
        info!(key, "[dry-run] press key");
        Ok(())
    }
    fn click(&mut self, button: MouseButton) -> Result<(), SinkError> {
        info!(button = button.as_str(), "[dry-run] click");
        Ok(())
    }
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> {
        info!(dx, dy, "[dry-run] move pointer");
        Ok(())
    }
}

// ── recording backend ─────────────────────────────────────────────────────

/// One call received by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulatedInput {
    PressKey(String),
    Click(MouseButton),
    MoveRelative { dx: i32, dy: i32 },
}

/// Appends every call to a shared log.  Clones share the same log, so a
/// test can keep one handle while the dispatcher owns another.
///
/// Keys listed with [`RecordingSink::rejecting`] fail with
/// [`SinkError::UnsupportedKey`] (the call is still logged).
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    calls:    Arc<Mutex<Vec<SimulatedInput>>>,
    rejected: Vec<String>,
}

impl RecordingSink {
    pub fn rejecting<I, K>(keys: I) -> Self
    where I: IntoIterator<Item = K>, K: Into<String>
    {
        RecordingSink {
            calls:    Arc::default(),
            rejected: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Copy of everything recorded so far.
    pub fn calls(&self) -> Vec<SimulatedInput> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, input: SimulatedInput) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(input);
    }
}

impl InputSink for RecordingSink {
    fn press_key(&mut self, key: &str) -> Result<(), SinkError> {
        self.record(SimulatedInput::PressKey(key.to_string()));
        if self.rejected.iter().any(|k| k == key) {
            return Err(SinkError::UnsupportedKey(key.to_string()));
        }
        Ok(())
    }
    fn click(&mut self, button: MouseButton) -> Result<(), SinkError> {
        self.record(SimulatedInput::Click(button));
        Ok(())
    }
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> {
        self.record(SimulatedInput::MoveRelative { dx, dy });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_clones_share_log() {
        let handle = RecordingSink::default();
        let mut owned: Box<dyn InputSink> = Box::new(handle.clone());
        owned.press_key("a").unwrap();
        owned.click(MouseButton::Left).unwrap();
        owned.move_relative(3, -4).unwrap();
        assert_eq!(handle.calls(), vec![
            SimulatedInput::PressKey("a".to_string()),
            SimulatedInput::Click(MouseButton::Left),
            SimulatedInput::MoveRelative { dx: 3, dy: -4 },
        ]);
    }

    #[test]
    fn rejected_keys_fail_but_are_logged() {
        let mut sink = RecordingSink::rejecting(["bogus"]);
        assert_eq!(sink.press_key("bogus"), Err(SinkError::UnsupportedKey("bogus".to_string())));
        assert!(sink.press_key("space").is_ok());
        assert_eq!(sink.calls().len(), 2);
    }
}
