//! Nearest-neighbour matcher.
//!
//! The matcher holds the active library as an `Arc` snapshot behind a
//! `RwLock`.  [`Matcher::replace`] swaps the whole snapshot; each call to
//! [`Matcher::recognize`] takes one snapshot up front and scores against it
//! only, so a concurrent replace can never mix gestures from two libraries
//! into a single result.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::landmark::Landmark;
use crate::library::GestureLibrary;

/// Score below which the best gesture is reported as a match.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// RecognitionResult
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of one [`Matcher::recognize`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionResult {
    /// Best gesture, present only when its score is below the threshold.
    pub gesture:    Option<String>,
    /// Average squared distance to the best gesture (0 for an empty library).
    pub score:      f64,
    /// 0–100, computed even when nothing matched.
    pub confidence: u8,
}

impl RecognitionResult {
    pub fn no_match() -> Self {
        RecognitionResult { gesture: None, score: 0.0, confidence: 0 }
    }

    pub fn is_match(&self) -> bool { self.gesture.is_some() }
}

/// `clamp(round(100 · (1 − score / threshold)), 0, 100)`.
pub fn confidence_for(score: f64, threshold: f64) -> u8 {
    let raw = (100.0 * (1.0 - score / threshold)).round();
    raw.clamp(0.0, 100.0) as u8
}

// ════════════════════════════════════════════════════════════════════════════
// Matcher
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Matcher {
    library:   RwLock<Arc<GestureLibrary>>,
    threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self { Matcher::new() }
}

impl Matcher {
    /// Empty library, threshold [`DEFAULT_MATCH_THRESHOLD`].
    pub fn new() -> Self {
        Matcher {
            library:   RwLock::new(Arc::new(GestureLibrary::new())),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    /// Use a different match threshold.  Must be positive.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        assert!(threshold > 0.0, "match threshold must be > 0");
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 { self.threshold }

    /// Swap in a new library snapshot.
    pub fn replace(&self, library: impl Into<Arc<GestureLibrary>>) {
        let library = library.into();
        debug!(gestures = library.len(), "matcher library replaced");
        *self.library.write().unwrap_or_else(PoisonError::into_inner) = library;
    }

    /// The snapshot currently in use.
    pub fn snapshot(&self) -> Arc<GestureLibrary> {
        Arc::clone(&self.library.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Score `sample` against every gesture and report the best one.
    pub fn recognize(&self, sample: &[Landmark]) -> RecognitionResult {
        self.recognize_in(&self.snapshot(), sample)
    }

    /// Like [`recognize`](Self::recognize) against an explicit snapshot.
    pub fn recognize_in(&self, library: &GestureLibrary, sample: &[Landmark]) -> RecognitionResult {
        let mut best: Option<(&str, f64)> = None;
        for gesture in library {
            let score = gesture.score(sample);
            // Strict `<`: ties keep the earlier gesture in name order.
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((gesture.name(), score));
            }
        }

        let Some((name, score)) = best else {
            return RecognitionResult::no_match();
        };

        let confidence = confidence_for(score, self.threshold);
        let gesture = (score < self.threshold).then(|| name.to_string());
        debug!(best = name, score, confidence, matched = gesture.is_some(), "recognize");

        RecognitionResult { gesture, score, confidence }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Gesture, Sample};

    fn hand(x: f64, y: f64) -> Sample { vec![Landmark::new(x, y, 0.0); 21] }

    fn library(entries: &[(&str, Sample)]) -> GestureLibrary {
        entries.iter()
            .map(|(n, s)| Gesture::new(*n, vec![s.clone()], Action::keyboard("space")).unwrap())
            .collect()
    }

    #[test]
    fn empty_library_is_no_match() {
        let m = Matcher::new();
        assert_eq!(m.recognize(&hand(0.1, 0.2)), RecognitionResult::no_match());
        assert_eq!(m.recognize(&[]), RecognitionResult::no_match());
    }

    #[test]
    fn empty_live_sample_matches_first_gesture_by_name() {
        // nothing is compared, so every gesture scores 0
        let m = Matcher::new();
        m.replace(library(&[("open", hand(0.5, 0.5)), ("fist", hand(0.0, 0.0))]));
        let r = m.recognize(&[]);
        assert_eq!(r.gesture.as_deref(), Some("fist"));
        assert_eq!(r.score, 0.0);
        assert_eq!(r.confidence, 100);
    }

    #[test]
    fn exact_match_scores_zero_with_full_confidence() {
        let m = Matcher::new();
        m.replace(library(&[("fist", hand(0.0, 0.0))]));
        let r = m.recognize(&hand(0.0, 0.0));
        assert_eq!(r.gesture.as_deref(), Some("fist"));
        assert_eq!(r.score, 0.0);
        assert_eq!(r.confidence, 100);
    }

    #[test]
    fn far_sample_reports_score_without_match() {
        let m = Matcher::new();
        m.replace(library(&[("open", hand(0.5, 0.5))]));
        let r = m.recognize(&hand(0.9, 0.9));
        assert_eq!(r.gesture, None);
        assert!((r.score - 6.72).abs() < 1e-4, "got {}", r.score);
        assert_eq!(r.confidence, 0);
    }

    #[test]
    fn near_miss_still_carries_score() {
        let m = Matcher::new();
        m.replace(library(&[("g", vec![Landmark::new(0.0, 0.0, 0.0)])]));
        // score = 0.3² = 0.09 → match, confidence round(10) = 10
        let r = m.recognize(&[Landmark::new(0.3, 0.0, 0.0)]);
        assert_eq!(r.gesture.as_deref(), Some("g"));
        assert_eq!(r.confidence, 10);
        // score = 0.4² = 0.16 → no match, confidence clamped to 0
        let r = m.recognize(&[Landmark::new(0.4, 0.0, 0.0)]);
        assert_eq!(r.gesture, None);
        assert!((r.score - 0.16).abs() < 1e-6);
        assert_eq!(r.confidence, 0);
    }

    #[test]
    fn picks_nearest_gesture() {
        let m = Matcher::new();
        m.replace(library(&[("a", hand(0.0, 0.0)), ("b", hand(0.5, 0.5)), ("c", hand(1.0, 1.0))]));
        let r = m.recognize(&hand(0.49, 0.5));
        assert_eq!(r.gesture.as_deref(), Some("b"));
    }

    #[test]
    fn ties_resolve_to_first_in_name_order() {
        let m = Matcher::new();
        m.replace(library(&[("zeta", hand(0.0, 0.0)), ("alpha", hand(0.0, 0.0))]));
        for _ in 0..5 {
            assert_eq!(m.recognize(&hand(0.0, 0.0)).gesture.as_deref(), Some("alpha"));
        }
    }

    #[test]
    fn shorter_training_samples_are_favoured() {
        // The live sample's extra landmarks are never compared.
        let m = Matcher::new();
        let short = vec![Landmark::new(0.0, 0.0, 0.0); 3];
        let mut long = hand(0.0, 0.0);
        long[20] = Landmark::new(0.05, 0.0, 0.0);
        m.replace(library(&[("long", long), ("short", short)]));
        let mut live = hand(0.0, 0.0);
        live[20] = Landmark::new(0.2, 0.0, 0.0);
        assert_eq!(m.recognize(&live).gesture.as_deref(), Some("short"));
    }

    #[test]
    fn confidence_is_monotone_and_clamped() {
        let mut last = 100u8;
        for i in 0..=200 {
            let c = confidence_for(i as f64 * 0.001, DEFAULT_MATCH_THRESHOLD);
            assert!(c <= last, "confidence rose at step {}", i);
            last = c;
        }
        assert_eq!(confidence_for(0.0, 0.1), 100);
        assert_eq!(confidence_for(0.1, 0.1), 0);
        assert_eq!(confidence_for(50.0, 0.1), 0);
    }

    #[test]
    fn replacing_with_same_library_is_idempotent() {
        let lib = library(&[("a", hand(0.0, 0.0)), ("b", hand(0.3, 0.1))]);
        let m = Matcher::new();
        m.replace(lib.clone());
        let first = m.recognize(&hand(0.01, 0.02));
        m.replace(lib);
        assert_eq!(m.recognize(&hand(0.01, 0.02)), first);
    }

    #[test]
    fn snapshot_survives_replace() {
        let m = Matcher::new();
        m.replace(library(&[("a", hand(0.0, 0.0))]));
        let snap = m.snapshot();
        m.replace(GestureLibrary::new());
        assert_eq!(m.recognize_in(&snap, &hand(0.0, 0.0)).gesture.as_deref(), Some("a"));
        assert_eq!(m.recognize(&hand(0.0, 0.0)), RecognitionResult::no_match());
    }

    #[test]
    fn custom_threshold_widens_matches() {
        let m = Matcher::new().with_threshold(10.0);
        m.replace(library(&[("open", hand(0.5, 0.5))]));
        let r = m.recognize(&hand(0.9, 0.9));
        assert_eq!(r.gesture.as_deref(), Some("open"));
        assert_eq!(r.confidence, 33);
    }
}
