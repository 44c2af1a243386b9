//! Core simulation - pure, deterministic, and testable
//!
//! Everything the balance game decides lives here: where blocks may go, when
//! they fall and lock, which lines clear, and how the two platforms' occupancy
//! tilts the balance. There is no terminal, socket or clock in this crate;
//! time only arrives as the `elapsed_ms` passed to each tick.
//!
//! # Module Structure
//!
//! - [`grid`]: the shared board, placement validation and per-platform line clears
//! - [`pieces`]: block-group shapes and their rotation states
//! - [`piece`]: the active group and its move/rotate/switch proposals
//! - [`driver`]: gravity clock, soft drop, lateral cooldown and round phase
//! - [`balance`]: tilt ratio and the balanced-time bonus
//! - [`switch`]: atomic platform switch
//! - [`simulation`]: composition root wiring the above to its collaborators
//! - [`ports`]: collaborator traits (spawner, scores, feedback, reload)
//! - [`scoring`], [`spawner`], [`rng`]: default collaborators
//!
//! # Example
//!
//! ```
//! use tui_balance_core::{GameConfig, RandomSpawner, ScoreBoard, Simulation};
//! use tui_balance_types::{Intent, Platform, TICK_MS};
//!
//! let config = GameConfig::default();
//! let mut sim = Simulation::builder(config)
//!     .spawner(RandomSpawner::new(12345, &config))
//!     .score_keeper(ScoreBoard::new())
//!     .build()
//!     .unwrap();
//!
//! sim.start().unwrap();
//! sim.apply_intent(Intent::SwitchPlatform);
//! assert_eq!(sim.active().unwrap().platform(), Platform::Right);
//!
//! for _ in 0..100 {
//!     sim.tick(TICK_MS).unwrap();
//! }
//! assert!(sim.tilt().abs() <= 1.0);
//! ```

pub mod balance;
pub mod config;
pub mod driver;
pub mod error;
pub mod grid;
pub mod piece;
pub mod pieces;
pub mod ports;
pub mod rng;
pub mod scoring;
pub mod simulation;
pub mod snapshot;
pub mod spawner;
pub mod switch;

pub use tui_balance_types as types;

// Re-export commonly used types for convenience
pub use balance::{tilt_ratio, BalanceEngine, BalanceStep};
pub use config::{GameConfig, PlatformLayout};
pub use driver::{DropDriver, Phase};
pub use error::{ConfigError, InvalidPlacement, SpawnFailure};
pub use grid::{ClearReport, Grid, LockedGroup};
pub use piece::{Piece, Proposal};
pub use pieces::get_shape;
pub use ports::{FeedbackLog, FeedbackSink, NoFeedback, NoReload, ReloadHook, ScoreKeeper, Spawner};
pub use rng::SimpleRng;
pub use scoring::ScoreBoard;
pub use simulation::{LockEvent, Simulation, SimulationBuilder, TickOutcome};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
pub use spawner::{RandomSpawner, SequenceSpawner};
pub use switch::attempt_switch;
