//! Input actions bound to gestures.
//!
//! The textual form is `kind:value`, e.g. `keyboard:space`,
//! `mouse_click:left`, `mouse_move:up`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Mouse button for [`Action::MouseClick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left   => "left",
            MouseButton::Right  => "right",
            MouseButton::Middle => "middle",
        }
    }
}

impl FromStr for MouseButton {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left"   => Ok(MouseButton::Left),
            "right"  => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            other    => Err(Error::InvalidAction(format!("unknown mouse button '{}'", other))),
        }
    }
}

/// Direction for [`Action::MouseMove`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up    => "up",
            Direction::Down  => "down",
            Direction::Left  => "left",
            Direction::Right => "right",
        }
    }

    /// Screen-space offset of `distance` units in this direction (y grows downward).
    pub fn offset(self, distance: i32) -> (i32, i32) {
        match self {
            Direction::Up    => (0, -distance),
            Direction::Down  => (0,  distance),
            Direction::Left  => (-distance, 0),
            Direction::Right => ( distance, 0),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up"    => Ok(Direction::Up),
            "down"  => Ok(Direction::Down),
            "left"  => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other   => Err(Error::InvalidAction(format!("unknown direction '{}'", other))),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Action
// ════════════════════════════════════════════════════════════════════════════

/// The input simulated when a gesture fires.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Action {
    /// Press and release the named key once.
    Keyboard(String),
    /// Click a mouse button.
    MouseClick(MouseButton),
    /// Nudge the pointer by a fixed distance.
    MouseMove(Direction),
}

impl Action {
    pub fn keyboard(key: impl Into<String>) -> Self {
        Action::Keyboard(key.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Keyboard(_)   => "keyboard",
            Action::MouseClick(_) => "mouse_click",
            Action::MouseMove(_)  => "mouse_move",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Action::Keyboard(key)    => key,
            Action::MouseClick(btn)  => btn.as_str(),
            Action::MouseMove(dir)   => dir.as_str(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.value())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let (kind, value) = s.split_once(':')
            .ok_or_else(|| Error::InvalidAction(format!("expected kind:value, got '{}'", s)))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidAction("action value must not be empty".to_string()));
        }
        match kind.trim() {
            "keyboard"    => Ok(Action::Keyboard(value.to_string())),
            "mouse_click" => Ok(Action::MouseClick(value.parse()?)),
            "mouse_move"  => Ok(Action::MouseMove(value.parse()?)),
            other => Err(Error::InvalidAction(format!("unknown action kind '{}'", other))),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
