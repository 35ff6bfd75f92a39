//! Top-level application state machine.
//!
//! `AppState` owns the [`GestureEngine`], the [`LibraryStore`] and the
//! optional training [`Recorder`].  It processes [`AppCommand`]s and one
//! landmark frame at a time; the loops at the bottom of this file drive it
//! from a frame source.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use tracing::{debug, info, warn};

use gesture_core::{
    Action, ActionDispatcher, Dispatch, FrameOutcome, GestureEngine, InputSink, Matcher, Sample,
};
use gesture_store::{LibraryStore, MergePolicy};

use crate::config::Config;
use crate::recorder::{RecordProgress, Recorder};
use crate::source::SourceEvent;
use crate::Error;

// ════════════════════════════════════════════════════════════════════════════
// Mode and commands
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode { Idle, Recording, Testing }

/// Everything the user can ask the application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Begin a fresh recording, discarding any unsaved samples.
    StartRecording { name: String, action: Action },
    StopRecording,
    /// Turn the current recording into a gesture and persist it.
    SaveGesture,
    ToggleTesting,
    Delete(String),
    Import { path: PathBuf, policy: MergePolicy },
    Export(PathBuf),
    /// Re-read the library file.
    Reload,
    Quit,
}

/// Per-run counters reported when a loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames:     usize,
    pub hands:      usize,
    pub matches:    usize,
    pub fired:      usize,
    pub suppressed: usize,
}

impl RunSummary {
    pub(crate) fn record(&mut self, frame: Option<&Sample>, outcome: Option<&FrameOutcome>) {
        self.frames += 1;
        if frame.is_some() { self.hands += 1; }
        let Some(out) = outcome else { return };
        if out.result.is_match() { self.matches += 1; }
        match out.dispatch {
            Some(Dispatch::Fired)      => self.fired += 1,
            Some(Dispatch::Suppressed) => self.suppressed += 1,
            None => {}
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState<S: InputSink> {
    // ── recognition ──────────────────────────────────────────────────────
    engine:   GestureEngine<S>,
    store:    LibraryStore,

    // ── training ─────────────────────────────────────────────────────────
    recorder:         Option<Recorder>,
    required_samples: usize,

    // ── mode / display ───────────────────────────────────────────────────
    mode:         Mode,
    running:      bool,
    last_sample:  Option<Sample>,
    last_outcome: Option<FrameOutcome>,
    pub status:   String,
}

impl<S: InputSink> AppState<S> {
    /// Build the engine from `cfg` and load the store's library into it.
    pub fn new(cfg: &Config, store: LibraryStore, sink: S) -> Self {
        let matcher    = Matcher::new().with_threshold(cfg.recognition.threshold);
        let dispatcher = ActionDispatcher::new(sink)
            .cooldown(cfg.dispatch.cooldown())
            .move_distance(cfg.dispatch.move_distance);
        let engine = GestureEngine::from_parts(matcher, dispatcher)
            .dispatch_confidence(cfg.recognition.dispatch_confidence);

        let status = format!("Ready — {} gestures in {}", store.library().len(), store.path().display());
        let app = AppState {
            engine,
            store,
            recorder:         None,
            required_samples: cfg.training.required_samples,
            mode:             Mode::Idle,
            running:          true,
            last_sample:      None,
            last_outcome:     None,
            status,
        };
        app.sync_engine();
        app
    }

    /// Hand the store's current library to the matcher.
    fn sync_engine(&self) {
        self.engine.set_gesture_data(self.store.library().clone());
    }

    // ── process one AppCommand ───────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: AppCommand) -> Result<(), Error> {
        match cmd {
            // ── Recording ─────────────────────────────────────────────────
            AppCommand::StartRecording { name, action } => {
                if name.trim().is_empty() {
                    return Err(gesture_core::Error::EmptyName.into());
                }
                if self.store.library().contains(&name) {
                    warn!("[train] '{}' already exists and will be overwritten on save", name);
                }
                self.status = format!("Recording '{}' — hold the gesture steady", name);
                self.recorder = Some(Recorder::new(name, action, self.required_samples));
                self.mode = Mode::Recording;
            }

            AppCommand::StopRecording => {
                if self.mode == Mode::Recording {
                    self.mode = Mode::Idle;
                }
                let count = self.recorder.as_ref().map_or(0, Recorder::count);
                self.status = if count > 0 {
                    format!("Recording stopped. {} samples collected.", count)
                } else {
                    "Recording stopped. No samples collected.".to_string()
                };
            }

            AppCommand::SaveGesture => {
                let Some(rec) = self.recorder.take() else {
                    warn!("[train] save requested but no recording was started");
                    self.status = "Nothing recorded to save".to_string();
                    return Ok(());
                };
                if self.mode == Mode::Recording {
                    self.mode = Mode::Idle;
                }
                let gesture = rec.finish()?;
                let name = gesture.name().to_string();
                let samples = gesture.samples().len();
                self.store.add(gesture)?;
                self.sync_engine();
                info!("[library] saved '{}' ({} samples)", name, samples);
                self.status = format!("Gesture '{}' saved ({} samples)", name, samples);
            }

            // ── Testing ───────────────────────────────────────────────────
            AppCommand::ToggleTesting => match self.mode {
                Mode::Testing => {
                    self.mode = Mode::Idle;
                    self.status = "Testing stopped".to_string();
                }
                Mode::Recording => {
                    self.status = "Stop recording before testing".to_string();
                }
                Mode::Idle if self.store.library().is_empty() => {
                    self.status = "No gestures available for testing".to_string();
                }
                Mode::Idle => {
                    self.mode = Mode::Testing;
                    self.status = format!("Testing {} gestures", self.store.library().len());
                }
            },

            // ── Library management ────────────────────────────────────────
            AppCommand::Delete(name) => {
                self.store.delete(&name)?;
                self.sync_engine();
                info!("[library] deleted '{}'", name);
                self.status = format!("Gesture '{}' deleted", name);
            }

            AppCommand::Import { path, policy } => {
                let taken = self.store.import(&path, policy)?;
                self.sync_engine();
                info!("[library] imported {} gestures from {}", taken, path.display());
                self.status = format!("Imported {} gestures", taken);
            }

            AppCommand::Export(path) => {
                self.store.export(&path)?;
                info!("[library] exported {} gestures to {}", self.store.library().len(), path.display());
                self.status = format!("Exported to {}", path.display());
            }

            AppCommand::Reload => {
                self.store.reload()?;
                self.sync_engine();
                self.status = format!("Reloaded {} gestures", self.store.library().len());
            }

            AppCommand::Quit => {
                self.running = false;
            }
        }
        Ok(())
    }

    // ── process one landmark frame ───────────────────────────────────────

    /// Feed one frame.  Returns the recognition outcome when testing and a
    /// hand was present.
    pub fn handle_frame(&mut self, frame: Option<Sample>, now: Instant) -> Option<FrameOutcome> {
        self.last_sample = frame;
        self.last_outcome = None;
        let sample = self.last_sample.as_ref()?;

        match self.mode {
            Mode::Idle => None,

            Mode::Recording => {
                let rec = self.recorder.as_mut()?;
                match rec.push(sample.clone()) {
                    RecordProgress::Collecting { count, required } => {
                        self.status = format!("Recording: {}/{}", count, required);
                    }
                    RecordProgress::Complete { .. } => {
                        self.mode = Mode::Idle;
                        self.status = "Samples collected! Ready to save.".to_string();
                    }
                }
                None
            }

            Mode::Testing => {
                let out = self.engine.process_frame(sample, now);
                debug!(gesture = ?out.result.gesture, score = out.result.score, confidence = out.result.confidence);
                self.status = match (&out.result.gesture, &out.action, out.dispatch) {
                    (Some(name), Some(action), Some(Dispatch::Fired)) => {
                        format!("Detected: {} ({}%) -> {}", name, out.result.confidence, action)
                    }
                    (Some(name), _, _) => format!("Detected: {} ({}%)", name, out.result.confidence),
                    (None, _, _)       => "No gesture detected".to_string(),
                };
                self.last_outcome = Some(out.clone());
                Some(out)
            }
        }
    }

    // ── Accessors for the loops and the monitor ──────────────────────────

    pub fn mode(&self)         -> Mode                   { self.mode }
    pub fn is_running(&self)   -> bool                   { self.running }
    pub fn engine(&self)       -> &GestureEngine<S>      { &self.engine }
    pub fn store(&self)        -> &LibraryStore          { &self.store }
    pub fn recorder(&self)     -> Option<&Recorder>      { self.recorder.as_ref() }
    pub fn last_sample(&self)  -> Option<&Sample>        { self.last_sample.as_ref() }
    pub fn last_outcome(&self) -> Option<&FrameOutcome>  { self.last_outcome.as_ref() }

    pub fn into_parts(self) -> (LibraryStore, S) {
        (self.store, self.engine.into_sink())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Loops
// ════════════════════════════════════════════════════════════════════════════

/// Feed every event from `frames` into `app` until the source ends or the
/// app is told to quit.
pub fn run<S: InputSink>(app: &mut AppState<S>, frames: Receiver<SourceEvent>) -> RunSummary {
    let mut summary = RunSummary::default();
    for event in frames {
        match event {
            SourceEvent::Frame(frame) => {
                let outcome = app.handle_frame(frame, Instant::now());
                summary.record(app.last_sample(), outcome.as_ref());
            }
            SourceEvent::End => break,
        }
        if !app.is_running() { break; }
    }
    info!(
        "[run] {} frames, {} with a hand, {} matches, {} fired, {} suppressed",
        summary.frames, summary.hands, summary.matches, summary.fired, summary.suppressed
    );
    summary
}

/// Record one gesture from `frames` and save it.  Stops at the required
/// sample count or when the source ends, whichever comes first.
pub fn train<S: InputSink>(
    app:    &mut AppState<S>,
    frames: Receiver<SourceEvent>,
    name:   &str,
    action: Action,
) -> Result<usize, Error> {
    app.handle_command(AppCommand::StartRecording { name: name.to_string(), action })?;
    for event in frames {
        match event {
            SourceEvent::Frame(frame) => { app.handle_frame(frame, Instant::now()); }
            SourceEvent::End => break,
        }
        if app.mode() != Mode::Recording { break; }
    }
    if app.mode() == Mode::Recording {
        app.handle_command(AppCommand::StopRecording)?;
    }
    let count = app.recorder().map_or(0, Recorder::count);
    app.handle_command(AppCommand::SaveGesture)?;
    Ok(count)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
