//! Terminal input collaborator.
//!
//! Maps `crossterm` key events to [`Intent`](crate::types::Intent)s and tracks
//! held keys, including on terminals without key-release events. The core never
//! sees a key code.

pub mod handler;
pub mod map;

pub use tui_balance_types as types;

pub use handler::{HorizontalDirection, InputHandler};
pub use map::{handle_key_event, is_held_key, should_quit, should_start};
