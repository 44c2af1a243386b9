//! Held-key tracking for terminal environments.
//!
//! Lateral keys keep producing move intents while held (the simulation's move
//! cooldown paces them), and soft drop is reported as a press/release pair.
//! Terminals that never emit key release events are covered by a timeout: a
//! key that has not been seen for `key_release_timeout_ms` counts as released.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::KeyCode;

use crate::types::Intent;

/// Direction for horizontal movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDirection {
    Left,
    Right,
    None,
}

impl HorizontalDirection {
    fn intent(self) -> Option<Intent> {
        match self {
            HorizontalDirection::Left => Some(Intent::MoveLeft),
            HorizontalDirection::Right => Some(Intent::MoveRight),
            HorizontalDirection::None => None,
        }
    }
}

// Short enough that a tap never reads as a hold, long enough to bridge the gap
// between a terminal's auto-repeat presses.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

// Hold time before a lateral key starts repeating.
const DEFAULT_REPEAT_DELAY_MS: u32 = 170;

#[derive(Debug, Clone)]
pub struct InputHandler {
    horizontal: HorizontalDirection,
    horizontal_held_ms: u32,
    soft_drop_held: bool,
    last_horizontal_key: Instant,
    last_down_key: Instant,
    repeat_delay_ms: u32,
    key_release_timeout_ms: u32,
}

impl InputHandler {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            horizontal: HorizontalDirection::None,
            horizontal_held_ms: 0,
            soft_drop_held: false,
            last_horizontal_key: now,
            last_down_key: now,
            repeat_delay_ms: DEFAULT_REPEAT_DELAY_MS,
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_repeat_delay_ms(mut self, delay_ms: u32) -> Self {
        self.repeat_delay_ms = delay_ms;
        self
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    pub fn soft_drop_held(&self) -> bool {
        self.soft_drop_held
    }

    pub fn horizontal(&self) -> HorizontalDirection {
        self.horizontal
    }

    /// A press (or terminal auto-repeat press) of a held key.
    ///
    /// Returns an intent only on the transition into the held state.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<Intent> {
        match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.press_horizontal(HorizontalDirection::Left)
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                self.press_horizontal(HorizontalDirection::Right)
            }
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                self.last_down_key = Instant::now();
                if self.soft_drop_held {
                    None
                } else {
                    self.soft_drop_held = true;
                    Some(Intent::SoftDropHeld(true))
                }
            }
            _ => None,
        }
    }

    /// An explicit release event. Returns `SoftDropHeld(false)` when the
    /// soft drop key goes up.
    pub fn handle_key_release(&mut self, code: KeyCode) -> Option<Intent> {
        match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                if self.horizontal == HorizontalDirection::Left {
                    self.release_horizontal();
                }
                None
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                if self.horizontal == HorizontalDirection::Right {
                    self.release_horizontal();
                }
                None
            }
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => self.release_soft_drop(),
            _ => None,
        }
    }

    /// Advance by one frame and collect the intents it produces.
    pub fn update(&mut self, elapsed_ms: u32) -> ArrayVec<Intent, 4> {
        let mut intents = ArrayVec::<Intent, 4>::new();
        let timeout = Duration::from_millis(self.key_release_timeout_ms as u64);

        // Auto-release when the terminal does not emit release events.
        if self.horizontal != HorizontalDirection::None && self.last_horizontal_key.elapsed() > timeout {
            self.release_horizontal();
        }
        if self.soft_drop_held && self.last_down_key.elapsed() > timeout {
            if let Some(intent) = self.release_soft_drop() {
                intents.push(intent);
            }
        }

        if let Some(intent) = self.horizontal.intent() {
            self.horizontal_held_ms = self.horizontal_held_ms.saturating_add(elapsed_ms);
            if self.horizontal_held_ms >= self.repeat_delay_ms {
                intents.push(intent);
            }
        }

        intents
    }

    /// Drop all held state. Emits the soft drop release if it was held.
    pub fn reset(&mut self) -> Option<Intent> {
        self.release_horizontal();
        self.release_soft_drop()
    }

    fn press_horizontal(&mut self, dir: HorizontalDirection) -> Option<Intent> {
        self.last_horizontal_key = Instant::now();
        if self.horizontal == dir {
            return None;
        }
        self.horizontal = dir;
        self.horizontal_held_ms = 0;
        dir.intent()
    }

    fn release_horizontal(&mut self) {
        self.horizontal = HorizontalDirection::None;
        self.horizontal_held_ms = 0;
    }

    fn release_soft_drop(&mut self) -> Option<Intent> {
        if !self.soft_drop_held {
            return None;
        }
        self.soft_drop_held = false;
        Some(Intent::SoftDropHeld(false))
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stale(ms: u64) -> Instant {
        Instant::now() - Duration::from_millis(ms)
    }

    #[test]
    fn test_horizontal_repeats_after_delay() {
        let mut ih = InputHandler::new()
            .with_repeat_delay_ms(100)
            .with_key_release_timeout_ms(10_000);

        assert_eq!(ih.handle_key_press(KeyCode::Left), Some(Intent::MoveLeft));
        // Auto-repeat presses of the same key do not re-trigger.
        assert_eq!(ih.handle_key_press(KeyCode::Left), None);

        assert!(ih.update(99).is_empty());
        assert_eq!(ih.update(1).as_slice(), &[Intent::MoveLeft]);
        assert_eq!(ih.update(16).as_slice(), &[Intent::MoveLeft]);
    }

    #[test]
    fn test_direction_change_restarts_delay() {
        let mut ih = InputHandler::new()
            .with_repeat_delay_ms(100)
            .with_key_release_timeout_ms(10_000);
        ih.handle_key_press(KeyCode::Left);
        ih.update(150);
        assert_eq!(ih.handle_key_press(KeyCode::Right), Some(Intent::MoveRight));
        assert!(ih.update(50).is_empty());
    }

    #[test]
    fn test_soft_drop_press_and_release() {
        let mut ih = InputHandler::new().with_key_release_timeout_ms(10_000);
        assert_eq!(ih.handle_key_press(KeyCode::Down), Some(Intent::SoftDropHeld(true)));
        assert_eq!(ih.handle_key_press(KeyCode::Char('s')), None);
        assert!(ih.update(16).is_empty());
        assert_eq!(
            ih.handle_key_release(KeyCode::Down),
            Some(Intent::SoftDropHeld(false))
        );
        assert_eq!(ih.handle_key_release(KeyCode::Down), None);
    }

    #[test]
    fn test_soft_drop_auto_release_without_release_events() {
        let mut ih = InputHandler::new().with_key_release_timeout_ms(50);
        ih.handle_key_press(KeyCode::Down);
        ih.last_down_key = stale(51);

        assert_eq!(ih.update(0).as_slice(), &[Intent::SoftDropHeld(false)]);
        assert!(!ih.soft_drop_held());
    }

    #[test]
    fn test_horizontal_auto_release_without_release_events() {
        let mut ih = InputHandler::new().with_key_release_timeout_ms(50);
        ih.handle_key_press(KeyCode::Char('d'));
        ih.last_horizontal_key = stale(51);

        assert!(ih.update(500).is_empty());
        assert_eq!(ih.horizontal(), HorizontalDirection::None);
    }

    #[test]
    fn test_other_keys_do_not_extend_hold() {
        let mut ih = InputHandler::new().with_key_release_timeout_ms(50);
        ih.handle_key_press(KeyCode::Left);
        ih.last_horizontal_key = stale(51);
        assert_eq!(ih.handle_key_press(KeyCode::Char('f')), None);

        ih.update(0);
        assert_eq!(ih.horizontal(), HorizontalDirection::None);
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut ih = InputHandler::new().with_key_release_timeout_ms(10_000);
        ih.handle_key_press(KeyCode::Left);
        ih.handle_key_press(KeyCode::Down);
        assert_eq!(ih.reset(), Some(Intent::SoftDropHeld(false)));
        assert!(ih.update(1_000).is_empty());
    }
}
