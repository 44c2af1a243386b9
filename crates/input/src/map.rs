//! Key mapping from terminal events to intents.

use crate::types::Intent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to intents.
///
/// Lateral moves and soft drop are held-key intents; the runner routes those
/// keys through [`InputHandler`](crate::InputHandler) instead.
pub fn handle_key_event(key: KeyEvent) -> Option<Intent> {
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Intent::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Intent::MoveRight),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Intent::SoftDropHeld(true)),

        // Rotation
        KeyCode::Up | KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Char('x') | KeyCode::Char('X') => {
            Some(Intent::RotateRight)
        }
        KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('z') | KeyCode::Char('Z') => {
            Some(Intent::RotateLeft)
        }

        // Platform switch
        KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Char(' ') | KeyCode::Tab => {
            Some(Intent::SwitchPlatform)
        }

        _ => None,
    }
}

/// Keys whose intent depends on being held rather than pressed once.
pub fn is_held_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Left
            | KeyCode::Right
            | KeyCode::Down
            | KeyCode::Char('a' | 'A' | 'd' | 'D' | 's' | 'S')
    )
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Check if key starts a round from the idle screen.
pub fn should_start(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_movement_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(Intent::MoveLeft)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('D'))),
            Some(Intent::MoveRight)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('s'))),
            Some(Intent::SoftDropHeld(true))
        );
    }

    #[test]
    fn test_rotation_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('r'))),
            Some(Intent::RotateRight)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('L'))),
            Some(Intent::RotateLeft)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Up)),
            Some(Intent::RotateRight)
        );
    }

    #[test]
    fn test_switch_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('f'))),
            Some(Intent::SwitchPlatform)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Tab)),
            Some(Intent::SwitchPlatform)
        );
    }

    #[test]
    fn test_held_keys() {
        assert!(is_held_key(KeyCode::Char('a')));
        assert!(is_held_key(KeyCode::Down));
        assert!(!is_held_key(KeyCode::Char('f')));
        assert!(!is_held_key(KeyCode::Char('r')));
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
        assert!(should_start(KeyEvent::from(KeyCode::Enter)));
    }
}
