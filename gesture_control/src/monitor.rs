//! Software-rendered monitor window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  MODE                       gesture  action  │
//! │                                              │
//! │            .   .  .                          │
//! │          .   live landmarks  .               │
//! │            .      .                          │
//! │                                              │
//! │  [confidence bar ██████████░░░░░░░░░░░]  73  │
//! │  status bar                                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Drawing goes to a plain [`Canvas`] so it can be checked without a window.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use gesture_core::{FrameOutcome, InputSink, Landmark};

use crate::app::{AppCommand, AppState, Mode, RunSummary};
use crate::source::SourceEvent;
use crate::Error;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 640;
pub const WIN_H:       usize = 480;
const HEADER_H:        usize = 24;
const BAR_Y:           usize = WIN_H - 72;
const BAR_H:           usize = 14;
const BAR_X:           usize = 10;
const BAR_W:           usize = WIN_W - 60;
const STATUS_Y:        usize = WIN_H - 40;
const PLOT_TOP:        usize = HEADER_H + 16;
const PLOT_BOTTOM:     usize = BAR_Y - 16;
const DOT_R:           usize = 3;
const BG_COLOR:        u32   = 0xFF1A1A2E;
const TEXT_BG:         u32   = 0xFF0F3460;
const BAR_BG:          u32   = 0xFF333344;
const DOT_COLOR:       u32   = 0xFF66DDFF;
const PALM_COLOR:      u32   = 0xFFFFD700;
const MATCH_COLOR:     u32   = 0xFF44DD66;
const MISS_COLOR:      u32   = 0xFFDD5544;

/// Everything one rendered frame shows.
pub struct MonitorView<'a> {
    pub mode:      Mode,
    pub sample:    Option<&'a [Landmark]>,
    pub outcome:   Option<&'a FrameOutcome>,
    /// `(count, required)` while recording.
    pub recording: Option<(usize, usize)>,
    pub status:    &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    buf: Vec<u32>,
}

impl Default for Canvas {
    fn default() -> Self { Canvas { buf: vec![BG_COLOR; WIN_W * WIN_H] } }
}

impl Canvas {
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < WIN_W && y < WIN_H).then(|| self.buf[y * WIN_W + x])
    }

    pub fn render(&mut self, view: &MonitorView<'_>) {
        self.buf.fill(BG_COLOR);

        // ── Header ────────────────────────────────────────────────────────
        self.fill_rect(0, 0, WIN_W, HEADER_H, TEXT_BG);
        let mode = match (view.mode, view.recording) {
            (Mode::Recording, Some((n, of))) => format!("RECORDING {}/{}", n, of),
            (Mode::Recording, None)          => "RECORDING".to_string(),
            (Mode::Testing, _)               => "TESTING".to_string(),
            (Mode::Idle, _)                  => "IDLE".to_string(),
        };
        self.draw_label(&mode, 10, 10, 0xFFEEEEEE);

        if let Some(out) = view.outcome {
            let label = match (&out.result.gesture, &out.action) {
                (Some(name), Some(action)) => format!("{}  {}", name, action),
                (Some(name), None)         => name.clone(),
                (None, _)                  => "no gesture".to_string(),
            };
            self.draw_label(&label, WIN_W / 2, 10, 0xFFAADDFF);
        }

        // ── Landmarks ─────────────────────────────────────────────────────
        if let Some(sample) = view.sample {
            for (i, (x, y)) in project(sample).into_iter().enumerate() {
                let color = if i == 0 { PALM_COLOR } else { DOT_COLOR };
                self.draw_dot(x, y, DOT_R, color);
            }
        }

        // ── Confidence bar ────────────────────────────────────────────────
        if let Some(out) = view.outcome {
            let color = if out.result.is_match() { MATCH_COLOR } else { MISS_COLOR };
            self.draw_bar(out.result.confidence, color);
            self.draw_label(&out.result.confidence.to_string(), BAR_X + BAR_W + 10, BAR_Y + 5, 0xFFEEEEEE);
        } else {
            self.fill_rect(BAR_X, BAR_Y, BAR_W, BAR_H, BAR_BG);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(view.status, 10, STATUS_Y + 10, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label("T=test  Q=quit", 10, WIN_H - 12, 0xFF888888);
    }

    fn draw_bar(&mut self, confidence: u8, color: u32) {
        self.fill_rect(BAR_X, BAR_Y, BAR_W, BAR_H, BAR_BG);
        let filled = BAR_W * usize::from(confidence.min(100)) / 100;
        self.fill_rect(BAR_X, BAR_Y, filled, BAR_H, color);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn draw_dot(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        let r2 = (r * r) as isize;
        for dy in -(r as isize)..=r as isize {
            for dx in -(r as isize)..=r as isize {
                if dx*dx + dy*dy > r2 { continue; }
                let (sx, sy) = (cx as isize + dx, cy as isize + dy);
                if sx >= 0 && sy >= 0 {
                    self.set_pixel(sx as usize, sy as usize, color);
                }
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += 4;
            if cx + 4 > WIN_W { break; }
        }
    }
}

/// Fit the sample's x/y extent into 90% of the plot area, keeping its aspect
/// ratio.  Larger y is drawn higher up.
fn project(sample: &[Landmark]) -> Vec<(usize, usize)> {
    if sample.is_empty() { return Vec::new(); }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in sample {
        min_x = min_x.min(p.x); max_x = max_x.max(p.x);
        min_y = min_y.min(p.y); max_y = max_y.max(p.y);
    }

    let plot_w = (WIN_W - 40) as f64;
    let plot_h = (PLOT_BOTTOM - PLOT_TOP) as f64;
    let span   = (max_x - min_x).max(max_y - min_y);
    let scale  = if span > f64::EPSILON && span.is_finite() { 0.9 * plot_w.min(plot_h) / span } else { 0.0 };

    let cx = WIN_W as f64 / 2.0;
    let cy = (PLOT_TOP + PLOT_BOTTOM) as f64 / 2.0;
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;

    sample.iter().map(|p| {
        let x = cx + (p.x - mid_x) * scale;
        let y = cy - (p.y - mid_y) * scale;
        (x.max(0.0) as usize, y.max(0.0) as usize)
    }).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Monitor — the window
// ════════════════════════════════════════════════════════════════════════════

pub struct Monitor {
    window: Window,
    canvas: Canvas,
}

impl Monitor {
    pub fn new() -> Result<Self, Error> {
        let mut window = Window::new(
            "Gesture Control — monitor",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| Error::Monitor(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Monitor { window, canvas: Canvas::default() })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Translate key presses into commands.
    pub fn poll_input(&self) -> Option<AppCommand> {
        if self.window.is_key_pressed(Key::Q, KeyRepeat::No) {
            return Some(AppCommand::Quit);
        }
        if self.window.is_key_pressed(Key::T, KeyRepeat::No) {
            return Some(AppCommand::ToggleTesting);
        }
        None
    }

    pub fn render(&mut self, view: &MonitorView<'_>) -> Result<(), Error> {
        self.canvas.render(view);
        self.window
            .update_with_buffer(self.canvas.pixels(), WIN_W, WIN_H)
            .map_err(|e| Error::Monitor(e.to_string()))
    }
}

/// Like [`crate::app::run`], but with the monitor window open.  Closing the
/// window or pressing `Q` ends the loop.
pub fn run_monitored<S: InputSink>(
    app:    &mut AppState<S>,
    frames: Receiver<SourceEvent>,
) -> Result<RunSummary, Error> {
    let mut monitor = Monitor::new()?;
    let mut summary = RunSummary::default();
    let mut source_done = false;

    while monitor.is_open() && app.is_running() {
        // 1. Window keys
        if let Some(cmd) = monitor.poll_input() {
            if let Err(e) = app.handle_command(cmd) {
                tracing::warn!("[monitor] {}", e);
                app.status = e.to_string();
            }
        }

        // 2. Drain frames
        while !source_done {
            match frames.try_recv() {
                Ok(SourceEvent::Frame(frame)) => {
                    let outcome = app.handle_frame(frame, Instant::now());
                    summary.record(app.last_sample(), outcome.as_ref());
                }
                Ok(SourceEvent::End) | Err(TryRecvError::Disconnected) => {
                    source_done = true;
                    app.status = format!("{} (source ended)", app.status);
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        // 3. Render
        let view = MonitorView {
            mode:      app.mode(),
            sample:    app.last_sample().map(Vec::as_slice),
            outcome:   app.last_outcome(),
            recording: app.recorder().map(|r| (r.count(), r.required())),
            status:    &app.status,
        };
        monitor.render(&view)?;
    }
    Ok(summary)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_core::{Action, Dispatch, RecognitionResult};

    fn idle_view(status: &str) -> MonitorView<'_> {
        MonitorView { mode: Mode::Idle, sample: None, outcome: None, recording: None, status }
    }

    #[test]
    fn projection_fits_plot_area() {
        let sample = vec![
            Landmark::new(-0.1, 0.1, 0.0),
            Landmark::new( 0.1, 0.3, 0.0),
            Landmark::new( 0.0, 0.2, 0.0),
        ];
        let pts = project(&sample);
        assert_eq!(pts.len(), 3);
        for &(x, y) in &pts {
            assert!(x < WIN_W);
            assert!((PLOT_TOP..=PLOT_BOTTOM).contains(&y), "y = {}", y);
        }
        // higher y is drawn above
        assert!(pts[1].1 < pts[0].1);
        // the midpoint lands at the centre
        assert_eq!(pts[2].0, WIN_W / 2);
    }

    #[test]
    fn degenerate_sample_collapses_to_centre() {
        let pts = project(&[Landmark::new(0.5, 0.5, 0.5); 4]);
        assert!(pts.iter().all(|&p| p == pts[0]));
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn confidence_bar_fills_proportionally() {
        let outcome = FrameOutcome {
            result:   RecognitionResult { gesture: Some("fist".into()), score: 0.05, confidence: 50 },
            action:   Some(Action::keyboard("space")),
            dispatch: Some(Dispatch::Fired),
        };
        let mut canvas = Canvas::default();
        canvas.render(&MonitorView { outcome: Some(&outcome), ..idle_view("") });

        let mid = BAR_Y + BAR_H / 2;
        assert_eq!(canvas.pixel(BAR_X + 1, mid), Some(MATCH_COLOR));
        assert_eq!(canvas.pixel(BAR_X + BAR_W / 2 - 1, mid), Some(MATCH_COLOR));
        assert_eq!(canvas.pixel(BAR_X + BAR_W / 2 + 1, mid), Some(BAR_BG));
    }

    #[test]
    fn status_text_is_drawn() {
        let mut canvas = Canvas::default();
        canvas.render(&idle_view("ready"));
        let status_row = STATUS_Y + 10;
        let lit = (0..WIN_W).filter(|&x| {
            (status_row..status_row + 5).any(|y| canvas.pixel(x, y) == Some(0xFFEEEEEE))
        }).count();
        assert!(lit > 0);
    }

    #[test]
    fn landmarks_are_drawn() {
        let sample = vec![Landmark::new(0.0, 0.0, 0.0), Landmark::new(1.0, 1.0, 0.0)];
        let mut canvas = Canvas::default();
        canvas.render(&MonitorView { mode: Mode::Testing, sample: Some(&sample), ..idle_view("") });
        let pts = project(&sample);
        assert_eq!(canvas.pixel(pts[0].0, pts[0].1), Some(PALM_COLOR));
        assert_eq!(canvas.pixel(pts[1].0, pts[1].1), Some(DOT_COLOR));
    }
}
