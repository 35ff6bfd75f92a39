//! Input backends for the dispatcher.
//!
//! With the `enigo` feature the real backend runs on its own thread, owns
//! the OS input connection and is fed commands over a channel.  Without it
//! (or when the OS refuses a connection) everything falls back to the
//! logging dry-run sink.

use gesture_core::{InputSink, LogSink};
use tracing::warn;

// ════════════════════════════════════════════════════════════════════════════
// Key names
// ════════════════════════════════════════════════════════════════════════════

/// A key the real backend knows how to press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
    Meta,
    /// F1–F12.
    Function(u8),
    /// A single printable character.
    Char(char),
}

/// Resolve a key name as typed by the user (`space`, `enter`, `f5`, `a`, …).
pub fn parse_key_name(name: &str) -> Option<NamedKey> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return (!c.is_control()).then_some(NamedKey::Char(c));
    }

    let lower = name.trim().to_ascii_lowercase();
    let key = match lower.as_str() {
        "space"                 => NamedKey::Space,
        "enter" | "return"      => NamedKey::Enter,
        "tab"                   => NamedKey::Tab,
        "esc" | "escape"        => NamedKey::Escape,
        "backspace"             => NamedKey::Backspace,
        "delete" | "del"        => NamedKey::Delete,
        "up"                    => NamedKey::Up,
        "down"                  => NamedKey::Down,
        "left"                  => NamedKey::Left,
        "right"                 => NamedKey::Right,
        "home"                  => NamedKey::Home,
        "end"                   => NamedKey::End,
        "pageup" | "pgup"       => NamedKey::PageUp,
        "pagedown" | "pgdn"     => NamedKey::PageDown,
        "shift"                 => NamedKey::Shift,
        "ctrl" | "control"      => NamedKey::Control,
        "alt" | "option"        => NamedKey::Alt,
        "win" | "cmd" | "super" | "meta" => NamedKey::Meta,
        other => {
            let n: u8 = other.strip_prefix('f')?.parse().ok()?;
            if (1..=12).contains(&n) { NamedKey::Function(n) } else { return None; }
        }
    };
    Some(key)
}

// ════════════════════════════════════════════════════════════════════════════
// open_input_sink — pick the real backend or fall back
// ════════════════════════════════════════════════════════════════════════════

/// Open the OS input backend, or the dry-run [`LogSink`] when `dry_run` is
/// set or no backend is available.
pub fn open_input_sink(dry_run: bool) -> Box<dyn InputSink> {
    if dry_run {
        return Box::new(LogSink);
    }

    #[cfg(feature = "enigo")]
    {
        match os::EnigoSink::spawn() {
            Ok(sink) => return Box::new(sink),
            Err(e)   => warn!("[input] cannot open OS input: {} — actions will only be logged", e),
        }
    }
    #[cfg(not(feature = "enigo"))]
    warn!("[input] built without the `enigo` feature — actions will only be logged");

    Box::new(LogSink)
}

// ════════════════════════════════════════════════════════════════════════════
// enigo backend
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "enigo")]
pub mod os {
    use std::sync::mpsc::{self, Sender};
    use std::thread;

    use enigo::{Button, Coordinate, Direction as Press, Enigo, Key, Keyboard, Mouse, Settings};
    use tracing::warn;

    use gesture_core::{InputSink, MouseButton, SinkError};

    use super::{parse_key_name, NamedKey};

    enum InputCommand {
        Key(Key),
        Click(Button),
        Move(i32, i32),
    }

    /// Handle to the input thread.  Key names are resolved on the caller's
    /// side so unknown keys fail immediately; OS-level failures are logged
    /// by the input thread.
    pub struct EnigoSink {
        cmd_tx: Sender<InputCommand>,
    }

    impl EnigoSink {
        pub fn spawn() -> Result<Self, SinkError> {
            let (cmd_tx, cmd_rx) = mpsc::channel::<InputCommand>();
            let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

            thread::spawn(move || {
                let mut enigo = match Enigo::new(&Settings::default()) {
                    Ok(e)  => { let _ = ready_tx.send(Ok(())); e }
                    Err(e) => { let _ = ready_tx.send(Err(e.to_string())); return; }
                };
                for cmd in cmd_rx {
                    let result = match cmd {
                        InputCommand::Key(k)      => enigo.key(k, Press::Click),
                        InputCommand::Click(b)    => enigo.button(b, Press::Click),
                        InputCommand::Move(dx, dy) => enigo.move_mouse(dx, dy, Coordinate::Rel),
                    };
                    if let Err(e) = result {
                        warn!("[input] OS input failed: {}", e);
                    }
                }
            });

            match ready_rx.recv() {
                Ok(Ok(()))  => Ok(EnigoSink { cmd_tx }),
                Ok(Err(e))  => Err(SinkError::Backend(e)),
                Err(_)      => Err(SinkError::Backend("input thread exited".to_string())),
            }
        }

        fn send(&self, cmd: InputCommand) -> Result<(), SinkError> {
            self.cmd_tx.send(cmd).map_err(|_| SinkError::Backend("input thread exited".to_string()))
        }
    }

    fn to_enigo_key(key: NamedKey) -> Key {
        match key {
            NamedKey::Space      => Key::Space,
            NamedKey::Enter      => Key::Return,
            NamedKey::Tab        => Key::Tab,
            NamedKey::Escape     => Key::Escape,
            NamedKey::Backspace  => Key::Backspace,
            NamedKey::Delete     => Key::Delete,
            NamedKey::Up         => Key::UpArrow,
            NamedKey::Down       => Key::DownArrow,
            NamedKey::Left       => Key::LeftArrow,
            NamedKey::Right      => Key::RightArrow,
            NamedKey::Home       => Key::Home,
            NamedKey::End        => Key::End,
            NamedKey::PageUp     => Key::PageUp,
            NamedKey::PageDown   => Key::PageDown,
            NamedKey::Shift      => Key::Shift,
            NamedKey::Control    => Key::Control,
            NamedKey::Alt        => Key::Alt,
            NamedKey::Meta       => Key::Meta,
            NamedKey::Function(n) => match n {
                1 => Key::F1,  2 => Key::F2,  3 => Key::F3,  4 => Key::F4,
                5 => Key::F5,  6 => Key::F6,  7 => Key::F7,  8 => Key::F8,
                9 => Key::F9, 10 => Key::F10, 11 => Key::F11, _ => Key::F12,
            },
            NamedKey::Char(c)    => Key::Unicode(c),
        }
    }

    impl InputSink for EnigoSink {
        fn press_key(&mut self, key: &str) -> Result<(), SinkError> {
            let named = parse_key_name(key).ok_or_else(|| SinkError::UnsupportedKey(key.to_string()))?;
            self.send(InputCommand::Key(to_enigo_key(named)))
        }

        fn click(&mut self, button: MouseButton) -> Result<(), SinkError> {
            let b = match button {
                MouseButton::Left   => Button::Left,
                MouseButton::Right  => Button::Right,
                MouseButton::Middle => Button::Middle,
            };
            self.send(InputCommand::Click(b))
        }

        fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> {
            self.send(InputCommand::Move(dx, dy))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_resolve() {
        assert_eq!(parse_key_name("space"),  Some(NamedKey::Space));
        assert_eq!(parse_key_name("Return"), Some(NamedKey::Enter));
        assert_eq!(parse_key_name("f5"),     Some(NamedKey::Function(5)));
        assert_eq!(parse_key_name("a"),      Some(NamedKey::Char('a')));
        assert_eq!(parse_key_name("A"),      Some(NamedKey::Char('A')));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert_eq!(parse_key_name("f13"),        None);
        assert_eq!(parse_key_name("hyperspace"), None);
        assert_eq!(parse_key_name(""),           None);
        assert_eq!(parse_key_name("\n"),         None);
    }

    #[test]
    fn dry_run_sink_accepts_everything() {
        let mut sink = open_input_sink(true);
        assert!(sink.press_key("anything").is_ok());
        assert!(sink.move_relative(1, 1).is_ok());
    }
}
