//! TUI Balance (workspace facade crate).
//!
//! Re-exports the member crates under one roof so the binary, integration
//! tests and benches can write `tui_balance::{core,adapter,term,input,types}`.

pub use tui_balance_adapter as adapter;
pub use tui_balance_core as core;
pub use tui_balance_input as input;
pub use tui_balance_term as term;
pub use tui_balance_types as types;
