//! Terminal renderer for the balance game.
//!
//! A small, game-oriented rendering layer: the view renders a snapshot into a
//! plain framebuffer, and the renderer flushes only what changed to the
//! terminal. No widget toolkit in between.
//!
//! - `core` stays deterministic; the only animation state lives in [`tilt`]
//! - Board cells are 2 chars wide to keep a roughly square aspect ratio

pub mod fb;
pub mod game_view;
pub mod renderer;
pub mod tilt;

pub use tui_balance_core as core;
pub use tui_balance_types as types;

pub use fb::{CellStyle, FrameBuffer, Glyph, Rgb};
pub use game_view::{AdapterStatusView, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, FrameStats, TerminalRenderer};
pub use tilt::TiltSmoother;
