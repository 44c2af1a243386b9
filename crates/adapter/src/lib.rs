//! Adapter module - observation and control via TCP socket with JSON lines
//!
//! External renderers and agents connect over TCP, receive snapshots of the
//! board and balance, and may send intents that the game loop applies exactly
//! like keyboard input. There is no controller arbitration: every handshaken
//! client's intents go into one queue.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects (default `127.0.0.1:7878`)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//!    carrying the board layout
//! 3. **Observation Streaming**: clients that asked for it receive an
//!    `observation` whenever the game loop broadcasts
//! 4. **Commanding**: `command` carries a list of intent names; the game loop
//!    replies with an `ack` once they are applied
//!
//! # Environment Variables
//!
//! - `BALANCE_ADAPTER_HOST`: Bind address (default: "127.0.0.1")
//! - `BALANCE_ADAPTER_PORT`: Port number (default: 7878)
//! - `BALANCE_ADAPTER_MAX_PENDING`: Command queue bound (default: 16)
//! - `BALANCE_ADAPTER_DISABLED`: "1" or "true" disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! C: {"type":"hello","seq":1,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","stream_observations":true}
//! S: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"layout":{"width":26,"height":17,"left":[0,6],"right":[16,25]}}
//! S: {"type":"observation","seq":1,"ts":...,"phase":"running","board":{...},"active":{...},"balance":{"tilt":0.0,...},...}
//! C: {"type":"command","seq":2,"intents":["switchPlatform","moveLeft"]}
//! S: {"type":"ack","seq":2,"ts":...,"ack_seq":2,"applied":2}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_balance_core as core;
pub use tui_balance_types as types;

pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerStatus};
