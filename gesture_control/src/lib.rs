//! # gesture_control
//!
//! Hand-gesture controller built on [`gesture_core`] and [`gesture_store`]:
//! records gestures from a landmark stream, recognises live hand poses and
//! turns them into keyboard and mouse input.
//!
//! ## Modes
//!
//! | Mode | What happens per frame |
//! |---|---|
//! | Idle | nothing is recognised, the live hand is only shown |
//! | Recording | the frame is appended to the gesture being trained |
//! | Testing | the frame is recognised; confident matches dispatch their action |
//!
//! ## Feature flags
//!
//! * (default) — frames come from a replay file, input is only logged.
//! * `leap` — frames from a real LeapMotion controller via LeapC.
//! * `enigo` — real keyboard / mouse input on the host OS.
//! * `monitor` — live window with landmarks, confidence bar and status.
//!
//! ### Monitor keys
//!
//! | Key | Effect |
//! |---|---|
//! | `T` | Toggle testing |
//! | `Q` | Quit |

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
#[cfg(feature = "monitor")]
pub mod monitor;
pub mod recorder;
pub mod source;

use thiserror::Error;

/// Errors from the application layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("frame source error: {0}")]
    Source(String),

    #[error("monitor error: {0}")]
    Monitor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] gesture_store::Error),

    #[error(transparent)]
    Library(#[from] gesture_core::Error),
}
