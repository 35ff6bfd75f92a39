//! Gestures and the gesture library.
//!
//! A [`Gesture`] can only be built through [`Gesture::new`] (or deserialised
//! through the same check), so every gesture held by a [`GestureLibrary`]
//! has a non-empty name and at least one training sample.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::landmark::{Sample, sample_distance};
use crate::{Error, Result};

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// A named gesture: training samples plus the action it triggers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GestureFields")]
pub struct Gesture {
    name:    String,
    samples: Vec<Sample>,
    action:  Action,
}

#[derive(Deserialize)]
struct GestureFields {
    name:    String,
    samples: Vec<Sample>,
    action:  Action,
}

impl TryFrom<GestureFields> for Gesture {
    type Error = Error;

    fn try_from(f: GestureFields) -> Result<Self> {
        Gesture::new(f.name, f.samples, f.action)
    }
}

impl Gesture {
    /// Build a gesture, refusing an empty name or an empty sample set.
    pub fn new(name: impl Into<String>, samples: Vec<Sample>, action: Action) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if samples.is_empty() {
            return Err(Error::EmptySamples { name });
        }
        Ok(Gesture { name, samples, action })
    }

    pub fn name(&self)    -> &str      { &self.name }
    pub fn samples(&self) -> &[Sample] { &self.samples }
    pub fn action(&self)  -> &Action   { &self.action }

    /// Mean [`sample_distance`] from `live` to each training sample.
    pub fn score(&self, live: &[crate::Landmark]) -> f64 {
        let total: f64 = self.samples.iter()
            .map(|s| sample_distance(live, s))
            .sum();
        total / self.samples.len() as f64
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureLibrary
// ════════════════════════════════════════════════════════════════════════════

/// Name → gesture mapping, iterated in name order.
///
/// Names are case-sensitive.  Inserting a gesture whose name is already
/// present replaces the old one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureLibrary {
    gestures: BTreeMap<String, Gesture>,
}

impl GestureLibrary {
    pub fn new() -> Self { Self::default() }

    /// Insert `gesture`, returning the gesture it replaced, if any.
    pub fn insert(&mut self, gesture: Gesture) -> Option<Gesture> {
        self.gestures.insert(gesture.name.clone(), gesture)
    }

    pub fn remove(&mut self, name: &str) -> Option<Gesture> {
        self.gestures.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Gesture> { self.gestures.get(name) }
    pub fn contains(&self, name: &str) -> bool         { self.gestures.contains_key(name) }
    pub fn len(&self) -> usize                         { self.gestures.len() }
    pub fn is_empty(&self) -> bool                     { self.gestures.is_empty() }

    pub fn iter(&self) -> btree_map::Values<'_, String, Gesture> {
        self.gestures.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.gestures.keys().map(String::as_str)
    }
}

impl FromIterator<Gesture> for GestureLibrary {
    fn from_iter<I: IntoIterator<Item = Gesture>>(iter: I) -> Self {
        let mut lib = GestureLibrary::new();
        for g in iter { lib.insert(g); }
        lib
    }
}

impl IntoIterator for GestureLibrary {
    type Item = Gesture;
    type IntoIter = btree_map::IntoValues<String, Gesture>;

    fn into_iter(self) -> Self::IntoIter { self.gestures.into_values() }
}

impl<'a> IntoIterator for &'a GestureLibrary {
    type Item = &'a Gesture;
    type IntoIter = btree_map::Values<'a, String, Gesture>;

    fn into_iter(self) -> Self::IntoIter { self.gestures.values() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Landmark;

    fn hand(v: f64) -> Sample { vec![Landmark::new(v, v, 0.0); 21] }

    #[test]
    fn refuses_gesture_without_samples() {
        let err = Gesture::new("wave", vec![], Action::keyboard("a")).unwrap_err();
        assert_eq!(err, Error::EmptySamples { name: "wave".to_string() });
    }

    #[test]
    fn refuses_blank_name() {
        let err = Gesture::new("  ", vec![hand(0.0)], Action::keyboard("a")).unwrap_err();
        assert_eq!(err, Error::EmptyName);
    }

    #[test]
    fn score_averages_over_training_samples() {
        let g = Gesture::new("g", vec![hand(0.0), hand(0.2)], Action::keyboard("a")).unwrap();
        // live = hand(0.1): each sample is 21 × (0.1² + 0.1²) = 0.42 away
        let s = g.score(&hand(0.1));
        assert!((s - 0.42).abs() < 1e-4, "got {}", s);
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut lib = GestureLibrary::new();
        lib.insert(Gesture::new("fist", vec![hand(0.0)], Action::keyboard("a")).unwrap());
        let old = lib.insert(Gesture::new("fist", vec![hand(0.5)], Action::keyboard("b")).unwrap());
        assert!(old.is_some());
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.get("fist").unwrap().action(), &Action::keyboard("b"));
    }

    #[test]
    fn names_are_case_sensitive_and_ordered() {
        let lib: GestureLibrary = ["b", "B", "a"].iter()
            .map(|n| Gesture::new(*n, vec![hand(0.0)], Action::keyboard("x")).unwrap())
            .collect();
        assert_eq!(lib.names().collect::<Vec<_>>(), vec!["B", "a", "b"]);
    }

    #[test]
    fn deserialising_enforces_invariants() {
        let bad = r#"{"name":"empty","samples":[],"action":{"type":"keyboard","value":"a"}}"#;
        assert!(serde_json::from_str::<Gesture>(bad).is_err());

        let good = r#"{"name":"one","samples":[[[0,0,0]]],"action":{"type":"mouse_click","value":"left"}}"#;
        let g: Gesture = serde_json::from_str(good).unwrap();
        assert_eq!(g.samples().len(), 1);
    }
}
