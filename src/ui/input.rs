/// Keyboard input collector.
///
/// Every Press or Repeat event becomes one queued key, in arrival order, so
/// holding an arrow keeps sliding and a burst of keys between two frames is
/// never collapsed into one move. Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::direction::Direction;

pub struct InputState {
    /// Keys received during the most recent `drain_events()` call.
    pressed: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { pressed: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        self.pressed.clear();
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    self.pressed.push(key);
                }
            }
        }
        Ok(())
    }

    /// Keys pressed this frame, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.pressed.iter().map(|k| k.code)
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.pressed.iter().any(is_ctrl_c)
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, key: KeyEvent) {
        self.pressed.push(key);
    }
}

fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL)
        && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('h')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('l')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('j')];

/// Map a key to a move, if it is one.
pub fn direction_for(code: KeyCode) -> Option<Direction> {
    if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else {
        None
    }
}
