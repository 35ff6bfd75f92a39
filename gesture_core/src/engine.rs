//! Caller-facing facade: one matcher plus one dispatcher.

use std::sync::Arc;
use std::time::Instant;

use crate::action::Action;
use crate::dispatch::{ActionDispatcher, Dispatch};
use crate::landmark::Landmark;
use crate::library::GestureLibrary;
use crate::matcher::{Matcher, RecognitionResult};
use crate::sink::InputSink;

/// Dispatch only when confidence is strictly above this.
pub const DEFAULT_DISPATCH_CONFIDENCE: u8 = 70;

/// Everything that happened for one processed frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutcome {
    pub result:   RecognitionResult,
    /// Action bound to the matched gesture, if any.
    pub action:   Option<Action>,
    /// `None` when the confidence gate kept the action from being dispatched.
    pub dispatch: Option<Dispatch>,
}

pub struct GestureEngine<S: InputSink> {
    matcher:    Matcher,
    dispatcher: ActionDispatcher<S>,
    gate:       u8,
}

impl<S: InputSink> GestureEngine<S> {
    pub fn new(sink: S) -> Self {
        GestureEngine::from_parts(Matcher::new(), ActionDispatcher::new(sink))
    }

    pub fn from_parts(matcher: Matcher, dispatcher: ActionDispatcher<S>) -> Self {
        GestureEngine { matcher, dispatcher, gate: DEFAULT_DISPATCH_CONFIDENCE }
    }

    /// Change the confidence a match must exceed before its action fires.
    pub fn dispatch_confidence(mut self, gate: u8) -> Self {
        self.gate = gate.min(100);
        self
    }

    pub fn matcher(&self) -> &Matcher { &self.matcher }
    pub fn dispatcher(&self) -> &ActionDispatcher<S> { &self.dispatcher }

    /// Replace the whole gesture library.
    pub fn set_gesture_data(&self, library: impl Into<Arc<GestureLibrary>>) {
        self.matcher.replace(library);
    }

    pub fn recognize(&self, sample: &[Landmark]) -> RecognitionResult {
        self.matcher.recognize(sample)
    }

    pub fn execute_action(&self, action: &Action, now: Instant) -> Dispatch {
        self.dispatcher.execute_action(action, now)
    }

    /// Bound action of `name` in the current library.
    pub fn action_for(&self, name: &str) -> Option<Action> {
        self.matcher.snapshot().get(name).map(|g| g.action().clone())
    }

    /// Recognise `sample` and dispatch the matched action when the
    /// confidence passes the gate.
    pub fn process_frame(&self, sample: &[Landmark], now: Instant) -> FrameOutcome {
        let library = self.matcher.snapshot();
        let result  = self.matcher.recognize_in(&library, sample);

        let action = result.gesture.as_deref()
            .and_then(|name| library.get(name))
            .map(|g| g.action().clone());

        let dispatch = match &action {
            Some(a) if result.confidence > self.gate => Some(self.dispatcher.execute_action(a, now)),
            _ => None,
        };

        FrameOutcome { result, action, dispatch }
    }

    pub fn into_sink(self) -> S { self.dispatcher.into_sink() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::{Gesture, Sample};
    use crate::sink::{RecordingSink, SimulatedInput};

    fn hand(v: f64) -> Sample { vec![Landmark::new(v, v, 0.0); 21] }

    fn fist_library() -> GestureLibrary {
        [Gesture::new("fist", vec![hand(0.0)], Action::keyboard("space")).unwrap()]
            .into_iter().collect()
    }

    #[test]
    fn fist_scenario_fires_then_suppresses() {
        let sink   = RecordingSink::default();
        let engine = GestureEngine::new(sink.clone());
        engine.set_gesture_data(fist_library());

        let t0 = Instant::now();
        let first = engine.process_frame(&hand(0.0), t0);
        assert_eq!(first.result.gesture.as_deref(), Some("fist"));
        assert_eq!(first.result.score, 0.0);
        assert_eq!(first.result.confidence, 100);
        assert_eq!(first.dispatch, Some(Dispatch::Fired));

        let second = engine.process_frame(&hand(0.0), t0 + Duration::from_millis(30));
        assert_eq!(second.dispatch, Some(Dispatch::Suppressed));
        assert_eq!(sink.calls(), vec![SimulatedInput::PressKey("space".to_string())]);
    }

    #[test]
    fn low_confidence_match_is_not_dispatched() {
        let sink   = RecordingSink::default();
        let engine = GestureEngine::new(sink.clone());
        engine.set_gesture_data(fist_library());

        // score = 21 × 2 × 0.04² = 0.0672 → confidence 33, matched but gated
        let out = engine.process_frame(&hand(0.04), Instant::now());
        assert_eq!(out.result.gesture.as_deref(), Some("fist"));
        assert_eq!(out.result.confidence, 33);
        assert_eq!(out.action, Some(Action::keyboard("space")));
        assert_eq!(out.dispatch, None);
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn gate_is_strictly_greater() {
        let engine = GestureEngine::new(RecordingSink::default()).dispatch_confidence(33);
        engine.set_gesture_data(fist_library());
        assert_eq!(engine.process_frame(&hand(0.04), Instant::now()).dispatch, None);

        let engine = GestureEngine::new(RecordingSink::default()).dispatch_confidence(32);
        engine.set_gesture_data(fist_library());
        assert_eq!(engine.process_frame(&hand(0.04), Instant::now()).dispatch, Some(Dispatch::Fired));
    }

    #[test]
    fn empty_frame_dispatches_the_first_gesture() {
        let sink   = RecordingSink::default();
        let engine = GestureEngine::new(sink.clone());
        engine.set_gesture_data(fist_library());

        let out = engine.process_frame(&[], Instant::now());
        assert_eq!(out.result.gesture.as_deref(), Some("fist"));
        assert_eq!(out.result.confidence, 100);
        assert_eq!(out.dispatch, Some(Dispatch::Fired));
        assert_eq!(sink.calls(), vec![SimulatedInput::PressKey("space".to_string())]);
    }

    #[test]
    fn no_match_reports_near_miss_without_action() {
        let engine = GestureEngine::new(RecordingSink::default());
        engine.set_gesture_data(fist_library());
        let out = engine.process_frame(&hand(0.9), Instant::now());
        assert_eq!(out.result.gesture, None);
        assert_eq!(out.action, None);
        assert_eq!(out.dispatch, None);
    }

    #[test]
    fn action_lookup_follows_current_library() {
        let engine = GestureEngine::new(RecordingSink::default());
        assert_eq!(engine.action_for("fist"), None);
        engine.set_gesture_data(fist_library());
        assert_eq!(engine.action_for("fist"), Some(Action::keyboard("space")));
    }
}
