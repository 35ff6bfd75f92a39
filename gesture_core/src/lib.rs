//! # gesture_core
//!
//! Nearest-neighbour hand-gesture matching and cooldown-gated input actions.
//!
//! A live [`Sample`] (one ordered set of 3-D hand landmarks) is scored
//! against every [`Gesture`] of a [`GestureLibrary`].  The best candidate is
//! reported with a raw distance score and a 0–100 confidence; when the
//! caller accepts the confidence, the gesture's bound [`Action`] goes to an
//! [`ActionDispatcher`], which enforces a global cooldown and hands the
//! actual input simulation to an [`InputSink`].
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Instant;
//! use gesture_core::{Action, Dispatch, Gesture, GestureEngine, GestureLibrary, Landmark, RecordingSink};
//!
//! let fist = vec![Landmark::new(0.0, 0.0, 0.0); 21];
//! let mut library = GestureLibrary::new();
//! library.insert(Gesture::new("fist", vec![fist.clone()], Action::keyboard("space")).unwrap());
//!
//! let sink   = RecordingSink::default();
//! let engine = GestureEngine::new(sink.clone());
//! engine.set_gesture_data(library);
//!
//! let outcome = engine.process_frame(&fist, Instant::now());
//! assert_eq!(outcome.result.gesture.as_deref(), Some("fist"));
//! assert_eq!(outcome.result.confidence, 100);
//! assert_eq!(outcome.dispatch, Some(Dispatch::Fired));
//! assert_eq!(sink.calls().len(), 1);
//! ```
//!
//! ## Scoring
//!
//! | Quantity | Definition |
//! |---|---|
//! | sample distance | Σₖ ‖live[k] − train[k]‖², k < min(len(live), len(train)) |
//! | gesture score | mean sample distance over the gesture's training samples |
//! | confidence | clamp(round(100 · (1 − score / T)), 0, 100), T = 0.1 |
//! | match | best gesture when score < T |

pub mod landmark;
pub mod action;
pub mod library;
pub mod matcher;
pub mod sink;
pub mod dispatch;
pub mod engine;

pub use landmark::{Landmark, Sample, sample_distance};
pub use action::{Action, Direction, MouseButton};
pub use library::{Gesture, GestureLibrary};
pub use matcher::{Matcher, RecognitionResult, DEFAULT_MATCH_THRESHOLD, confidence_for};
pub use sink::{InputSink, SinkError, SimulatedInput, LogSink, NullSink, RecordingSink};
pub use dispatch::{ActionDispatcher, Dispatch, DEFAULT_COOLDOWN, DEFAULT_MOVE_DISTANCE};
pub use engine::{GestureEngine, FrameOutcome, DEFAULT_DISPATCH_CONFIDENCE};

/// Result alias for library construction and action parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building gesture data.
///
/// Matching and dispatching never fail; only the data-entry boundary does.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("gesture '{name}' has no training samples")]
    EmptySamples { name: String },

    #[error("gesture name must not be empty")]
    EmptyName,

    #[error("invalid action: {0}")]
    InvalidAction(String),
}
