//! Landmark sources — recorded-frame replay and LeapMotion hardware.
//!
//! The public interface is [`SourceEvent`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether frames came from real hardware or a
//! replay file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::debug;

use gesture_core::{Landmark, Sample};

use crate::Error;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

/// What a source delivers per processed frame.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// One processed frame; `None` when no hand was detected.
    Frame(Option<Sample>),
    /// The source has nothing more to deliver.
    End,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait — unified interface for hw and replay
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<F: FrameSource>(source: F) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource — JSON Lines frame file
// ════════════════════════════════════════════════════════════════════════════

/// Replays frames recorded as JSON Lines: one frame per line, `null` for a
/// frame without a hand, otherwise `[[x, y, z], …]`.  Blank lines are
/// skipped.
///
/// The whole file is parsed up front by [`ReplaySource::open`], so a bad
/// line is reported before any frame is delivered.
#[derive(Clone, Debug)]
pub struct ReplaySource {
    frames:   Vec<Option<Sample>>,
    interval: Duration,
    looping:  bool,
}

impl ReplaySource {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        let frames = parse_frames(BufReader::new(file), path)?;
        debug!(path = %path.display(), frames = frames.len(), "replay file loaded");
        Ok(ReplaySource::from_frames(frames))
    }

    pub fn from_frames(frames: Vec<Option<Sample>>) -> Self {
        ReplaySource { frames, interval: Duration::ZERO, looping: false }
    }

    /// Sleep this long between frames.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start over at the end of the file instead of ending.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize { self.frames.len() }
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }
}

impl FrameSource for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        if self.frames.is_empty() {
            let _ = tx.send(SourceEvent::End);
            return;
        }
        loop {
            for frame in &self.frames {
                if tx.send(SourceEvent::Frame(frame.clone())).is_err() { return; }
                if !self.interval.is_zero() { thread::sleep(self.interval); }
            }
            if !self.looping { break; }
        }
        let _ = tx.send(SourceEvent::End);
    }
}

/// Parse a JSON Lines frame stream.  `origin` only labels errors.
pub fn parse_frames<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<Option<Sample>>, Error> {
    let mut frames = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() { continue; }
        let frame: Option<Sample> = serde_json::from_str(line).map_err(|e| Error::Source(format!(
            "{} line {}: {}", origin.display(), idx + 1, e
        )))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Append-friendly encoding of one frame, the inverse of [`parse_frames`].
pub fn frame_to_line(frame: Option<&[Landmark]>) -> String {
    // A slice of plain floats cannot fail to serialise.
    serde_json::to_string(&frame).unwrap_or_else(|_| "null".to_string())
}

/// Where replay frames come from when `--frames` is not given.
pub fn default_frames_path() -> PathBuf {
    PathBuf::from("gestures").join("frames.jsonl")
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// The first tracked hand becomes a 21-landmark sample: palm centre, then
/// for each digit (thumb → pinky) the ends of the metacarpal, proximal,
/// intermediate and distal bones.  LeapC reports millimetres; samples are
/// emitted in metres so stored libraries stay in the same range as the
/// matcher's default threshold expects.
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use leaprs::*;

        const MM_PER_M: f64 = 1000.0;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                tracing::warn!("[leap] failed to create LeapC connection: {:?}", e);
                let _ = tx.send(SourceEvent::End);
                return;
            }
        };
        if let Err(e) = connection.open() {
            tracing::warn!("[leap] failed to open LeapMotion device: {:?}", e);
            let _ = tx.send(SourceEvent::End);
            return;
        }

        macro_rules! point {
            ($v:expr) => {{
                let v = $v;
                Landmark::new(f64::from(v.x) / MM_PER_M, f64::from(v.y) / MM_PER_M, f64::from(v.z) / MM_PER_M)
            }};
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let sample = frame.hands().next().map(|hand| {
                    let mut s: Sample = Vec::with_capacity(21);
                    s.push(point!(hand.palm().position()));
                    for digit in hand.digits() {
                        s.push(point!(digit.metacarpal().next_joint()));
                        s.push(point!(digit.proximal().next_joint()));
                        s.push(point!(digit.intermediate().next_joint()));
                        s.push(point!(digit.distal().next_joint()));
                    }
                    s
                });
                if tx.send(SourceEvent::Frame(sample)).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_frames_and_gaps() {
        let text = "[[0.1,0.2,0.0],[0.3,0.4,-0.1]]\n\nnull\n[[1,1,1]]\n";
        let frames = parse_frames(Cursor::new(text), Path::new("t.jsonl")).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].as_ref().unwrap()[1], Landmark::new(0.3, 0.4, -0.1));
        assert_eq!(frames[1], None);
        assert_eq!(frames[2], Some(vec![Landmark::new(1.0, 1.0, 1.0)]));
    }

    #[test]
    fn bad_line_names_its_position() {
        let err = parse_frames(Cursor::new("null\n[[1,2]]\n"), Path::new("t.jsonl")).unwrap_err();
        match err {
            Error::Source(msg) => assert!(msg.contains("line 2"), "{}", msg),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn frame_line_round_trips() {
        let sample = vec![Landmark::new(0.5, 0.25, 0.0); 2];
        let line = frame_to_line(Some(sample.as_slice()));
        let back = parse_frames(Cursor::new(line), Path::new("x")).unwrap();
        assert_eq!(back, vec![Some(sample)]);
        assert_eq!(frame_to_line(None), "null");
    }

    #[test]
    fn replay_delivers_frames_then_end() {
        let frames = vec![None, Some(vec![Landmark::default()])];
        let rx = spawn_frame_source(ReplaySource::from_frames(frames.clone()));
        let got: Vec<SourceEvent> = rx.iter().collect();
        assert_eq!(got, vec![
            SourceEvent::Frame(None),
            SourceEvent::Frame(frames[1].clone()),
            SourceEvent::End,
        ]);
    }

    #[test]
    fn empty_replay_just_ends() {
        let rx = spawn_frame_source(ReplaySource::from_frames(vec![]));
        assert_eq!(rx.recv().unwrap(), SourceEvent::End);
    }

    #[test]
    fn looping_replay_repeats_until_receiver_drops() {
        let rx = spawn_frame_source(ReplaySource::from_frames(vec![None]).looping(true));
        for _ in 0..10 {
            assert_eq!(rx.recv().unwrap(), SourceEvent::Frame(None));
        }
    }
}
