//! Training session: collect samples for one gesture, then turn them into a
//! [`Gesture`].

use gesture_core::{Action, Gesture, Sample};
use tracing::{debug, info};

/// Where a recording stands after a frame was offered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordProgress {
    /// Still collecting.
    Collecting { count: usize, required: usize },
    /// `required` samples are in; further frames are ignored.
    Complete { count: usize },
}

#[derive(Clone, Debug)]
pub struct Recorder {
    name:     String,
    action:   Action,
    required: usize,
    samples:  Vec<Sample>,
}

impl Recorder {
    /// `required` is clamped to at least one sample.
    pub fn new(name: impl Into<String>, action: Action, required: usize) -> Self {
        Recorder {
            name:     name.into(),
            action,
            required: required.max(1),
            samples:  Vec::new(),
        }
    }

    pub fn name(&self)     -> &str   { &self.name }
    pub fn action(&self)   -> &Action { &self.action }
    pub fn required(&self) -> usize  { self.required }
    pub fn count(&self)    -> usize  { self.samples.len() }

    pub fn is_complete(&self) -> bool {
        self.samples.len() >= self.required
    }

    /// Offer one frame's sample.  Empty samples (no landmarks) are dropped.
    pub fn push(&mut self, sample: Sample) -> RecordProgress {
        if self.is_complete() {
            return RecordProgress::Complete { count: self.count() };
        }
        if !sample.is_empty() {
            self.samples.push(sample);
            debug!(gesture = %self.name, count = self.count(), required = self.required, "sample recorded");
        }
        if self.is_complete() {
            info!("[train] '{}' collected {} samples", self.name, self.count());
            RecordProgress::Complete { count: self.count() }
        } else {
            RecordProgress::Collecting { count: self.count(), required: self.required }
        }
    }

    /// Build the gesture from whatever was collected, even if recording was
    /// stopped early.  Fails when nothing was recorded.
    pub fn finish(self) -> gesture_core::Result<Gesture> {
        Gesture::new(self.name, self.samples, self.action)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_core::{Landmark, MouseButton};

    fn hand() -> Sample { vec![Landmark::new(0.1, 0.2, 0.3); 21] }

    #[test]
    fn completes_after_required_samples() {
        let mut rec = Recorder::new("wave", Action::keyboard("a"), 3);
        assert_eq!(rec.push(hand()), RecordProgress::Collecting { count: 1, required: 3 });
        assert_eq!(rec.push(hand()), RecordProgress::Collecting { count: 2, required: 3 });
        assert_eq!(rec.push(hand()), RecordProgress::Complete { count: 3 });
        assert!(rec.is_complete());

        // extra frames are ignored
        assert_eq!(rec.push(hand()), RecordProgress::Complete { count: 3 });
        let g = rec.finish().unwrap();
        assert_eq!(g.name(), "wave");
        assert_eq!(g.samples().len(), 3);
    }

    #[test]
    fn empty_frames_do_not_count() {
        let mut rec = Recorder::new("wave", Action::keyboard("a"), 2);
        assert_eq!(rec.push(vec![]), RecordProgress::Collecting { count: 0, required: 2 });
        assert_eq!(rec.count(), 0);
    }

    #[test]
    fn early_stop_keeps_partial_samples() {
        let mut rec = Recorder::new("click", Action::MouseClick(MouseButton::Left), 30);
        rec.push(hand());
        let g = rec.finish().unwrap();
        assert_eq!(g.samples().len(), 1);
        assert_eq!(g.action(), &Action::MouseClick(MouseButton::Left));
    }

    #[test]
    fn nothing_recorded_is_an_error() {
        let rec = Recorder::new("ghost", Action::keyboard("a"), 5);
        assert_eq!(
            rec.finish().unwrap_err(),
            gesture_core::Error::EmptySamples { name: "ghost".to_string() },
        );
    }

    #[test]
    fn zero_required_means_one() {
        let rec = Recorder::new("x", Action::keyboard("a"), 0);
        assert_eq!(rec.required(), 1);
    }
}
