//! Cooldown-gated action dispatch.
//!
//! One [`ActionDispatcher`] per process.  The last-fired timestamp and the
//! sink live behind one mutex, so the cooldown check and the timestamp update
//! happen in a single critical section even when frames are processed on
//! several threads.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::action::Action;
use crate::sink::InputSink;

/// Minimum time between two fired actions.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Pointer travel for a [`Action::MouseMove`], in screen units.
pub const DEFAULT_MOVE_DISTANCE: i32 = 20;

/// What [`ActionDispatcher::execute_action`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The action was handed to the sink (which may still have failed).
    Fired,
    /// Still inside the cooldown window; nothing happened.
    Suppressed,
}

struct DispatchState<S> {
    last_fired: Option<Instant>,
    sink:       S,
}

pub struct ActionDispatcher<S: InputSink> {
    state:         Mutex<DispatchState<S>>,
    cooldown:      Duration,
    move_distance: i32,
}

impl<S: InputSink> ActionDispatcher<S> {
    /// Never fired; cooldown [`DEFAULT_COOLDOWN`], move distance [`DEFAULT_MOVE_DISTANCE`].
    pub fn new(sink: S) -> Self {
        ActionDispatcher {
            state:         Mutex::new(DispatchState { last_fired: None, sink }),
            cooldown:      DEFAULT_COOLDOWN,
            move_distance: DEFAULT_MOVE_DISTANCE,
        }
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn move_distance(mut self, distance: i32) -> Self {
        self.move_distance = distance;
        self
    }

    pub fn last_fired(&self) -> Option<Instant> {
        self.lock().last_fired
    }

    /// Fire `action` unless another action fired less than one cooldown ago.
    ///
    /// The timestamp is advanced before the sink is called, and a sink
    /// failure is logged rather than returned: a failed attempt still counts
    /// against the cooldown.
    pub fn execute_action(&self, action: &Action, now: Instant) -> Dispatch {
        let mut state = self.lock();

        if let Some(last) = state.last_fired {
            // `checked_duration_since` is None when `now` precedes `last`.
            let in_cooldown = now.checked_duration_since(last)
                .map_or(true, |elapsed| elapsed < self.cooldown);
            if in_cooldown {
                debug!(%action, "action suppressed by cooldown");
                return Dispatch::Suppressed;
            }
        }

        state.last_fired = Some(now);

        let outcome = match action {
            Action::Keyboard(key) => state.sink.press_key(key),
            Action::MouseClick(button) => state.sink.click(*button),
            Action::MouseMove(direction) => {
                let (dx, dy) = direction.offset(self.move_distance);
                state.sink.move_relative(dx, dy)
            }
        };

        match outcome {
            Ok(())  => info!(%action, "action fired"),
            Err(e)  => warn!(%action, error = %e, "error executing action"),
        }
        Dispatch::Fired
    }

    /// Give back the sink.
    pub fn into_sink(self) -> S {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner).sink
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DispatchState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
