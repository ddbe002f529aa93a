//! Held-key tracking on top of terminal key events.
//!
//! Terminals that support the kitty keyboard protocol report releases, so a
//! key is down from its press until its release. Elsewhere only presses and
//! auto-repeats arrive. A fresh press then counts as held for
//! [`FIRST_REPEAT_WINDOW`], long enough to reach the first auto-repeat; once
//! repeats are flowing the key is let go after a few missed repeat gaps.

use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};

use crate::policy::{Action, KeyQuery};

/// How long a fresh press counts as held while waiting for the first
/// auto-repeat. GNOME's delay is about 500 ms; slower delays such as bare
/// X11's 660 ms leave a short stall.
pub const FIRST_REPEAT_WINDOW: Duration = Duration::from_millis(550);

/// Missed repeat gaps after which a repeating key counts as released.
const MISSED_REPEATS: u32 = 3;

const MIN_REPEAT_WINDOW: Duration = Duration::from_millis(60);

pub fn action_for(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::LeftUp),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::LeftDown),
        KeyCode::Up => Some(Action::RightUp),
        KeyCode::Down => Some(Action::RightDown),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct Held {
    last_seen: Instant,
    /// Gap between the two most recent events once the key is repeating
    repeat_gap: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct HeldKeys {
    held: [Option<Held>; 4],
    releases: bool,
    first_window: Duration,
    now: Instant,
}

impl HeldKeys {
    /// `releases` says whether the terminal reports key releases.
    pub fn new(releases: bool) -> Self {
        Self {
            held: [None; 4],
            releases,
            first_window: FIRST_REPEAT_WINDOW,
            now: Instant::now(),
        }
    }

    /// Feeds one key event. Returns true if it was one of the paddle keys.
    pub fn handle(&mut self, key: KeyEvent) -> bool {
        self.handle_at(key, Instant::now())
    }

    /// [`HeldKeys::handle`] with an explicit arrival time.
    pub fn handle_at(&mut self, key: KeyEvent, at: Instant) -> bool {
        let Some(action) = action_for(key.code) else {
            return false;
        };
        let window = self.window(action);
        let slot = &mut self.held[action.index()];
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                let repeat_gap = match *slot {
                    Some(held) => {
                        let gap = at.saturating_duration_since(held.last_seen);
                        (gap < window).then_some(gap)
                    }
                    None => None,
                };
                *slot = Some(Held {
                    last_seen: at,
                    repeat_gap,
                });
            }
            KeyEventKind::Release => *slot = None,
        }
        true
    }

    /// How long after its last event `action` still counts as down.
    fn window(&self, action: Action) -> Duration {
        match self.held[action.index()].and_then(|held| held.repeat_gap) {
            Some(gap) => (gap * MISSED_REPEATS).clamp(MIN_REPEAT_WINDOW, self.first_window),
            None => self.first_window,
        }
    }

    /// Moves the clock used by [`KeyQuery::is_down`]; call once per tick.
    pub fn advance(&mut self, now: Instant) {
        self.now = now;
    }

    pub fn clear(&mut self) {
        self.held = [None; 4];
    }
}

impl KeyQuery for HeldKeys {
    fn is_down(&self, action: Action) -> bool {
        match self.held[action.index()] {
            Some(_) if self.releases => true,
            Some(held) => self.now.saturating_duration_since(held.last_seen) < self.window(action),
            None => false,
        }
    }
}

/// Asks the terminal for release events. Returns whether it agreed.
pub fn enable_key_releases<W: Write>(out: &mut W) -> bool {
    match terminal::supports_keyboard_enhancement() {
        Ok(true) => execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok(),
        Ok(false) => false,
        Err(err) => {
            log::debug!("keyboard enhancement query failed: {err}");
            false
        }
    }
}

pub fn disable_key_releases<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, PopKeyboardEnhancementFlags)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, KeyModifiers};

    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn release_events_end_a_hold() {
        let mut keys = HeldKeys::new(true);
        assert!(keys.handle(key(KeyCode::Char('w'), KeyEventKind::Press)));
        keys.advance(Instant::now() + Duration::from_secs(5));
        assert!(keys.is_down(Action::LeftUp));
        keys.handle(key(KeyCode::Char('w'), KeyEventKind::Release));
        assert!(!keys.is_down(Action::LeftUp));
    }

    #[test]
    fn without_releases_a_press_expires() {
        let mut keys = HeldKeys::new(false);
        keys.handle(key(KeyCode::Up, KeyEventKind::Press));
        keys.advance(Instant::now());
        assert!(keys.is_down(Action::RightUp));
        assert!(!keys.is_down(Action::RightDown));
        keys.advance(Instant::now() + FIRST_REPEAT_WINDOW * 2);
        assert!(!keys.is_down(Action::RightUp));
    }

    #[test]
    fn press_survives_a_slow_auto_repeat_delay() {
        let start = Instant::now();
        let mut keys = HeldKeys::new(false);
        keys.handle_at(key(KeyCode::Char('s'), KeyEventKind::Press), start);
        // GNOME waits about 500 ms before the first repeat
        keys.advance(start + Duration::from_millis(500));
        assert!(keys.is_down(Action::LeftDown));
        keys.handle_at(
            key(KeyCode::Char('s'), KeyEventKind::Press),
            start + Duration::from_millis(500),
        );
        keys.advance(start + Duration::from_millis(530));
        assert!(keys.is_down(Action::LeftDown));
    }

    #[test]
    fn repeating_key_is_let_go_after_missed_repeats() {
        let start = Instant::now();
        let mut keys = HeldKeys::new(false);
        let w = key(KeyCode::Char('w'), KeyEventKind::Press);
        keys.handle_at(w, start);
        for i in 1..=5 {
            keys.handle_at(w, start + Duration::from_millis(400 + 30 * i));
        }
        let last = start + Duration::from_millis(550);
        keys.advance(last + Duration::from_millis(80));
        assert!(keys.is_down(Action::LeftUp));
        keys.advance(last + Duration::from_millis(200));
        assert!(!keys.is_down(Action::LeftUp));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut keys = HeldKeys::new(false);
        assert!(!keys.handle(key(KeyCode::Char('q'), KeyEventKind::Press)));
        assert_eq!(action_for(KeyCode::Char('S')), Some(Action::LeftDown));
    }
}
