//! Error types surfaced by the simulation.
//!
//! Only [`ConfigError`] and [`SpawnFailure`] ever reach the outer driver loop.
//! [`InvalidPlacement`] is recovered locally: the move is dropped and state is
//! left untouched.

use thiserror::Error;

use crate::types::{Cell, ColumnRange, PieceKind};

/// A proposed cell set failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPlacement {
    #[error("cell {cell} is outside both platforms")]
    OutOfBounds { cell: Cell },
    #[error("cell {cell} is already occupied")]
    Occupied { cell: Cell },
}

impl InvalidPlacement {
    /// The first offending cell
    pub fn cell(&self) -> Cell {
        match *self {
            InvalidPlacement::OutOfBounds { cell } | InvalidPlacement::Occupied { cell } => cell,
        }
    }
}

/// A freshly spawned group could not be placed. Ends the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("spawn blocked at {blocked}")]
pub struct SpawnFailure {
    pub blocked: Cell,
}

/// Startup-time configuration problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid height must be positive, got {0}")]
    NonPositiveHeight(i8),
    #[error("{name} platform range {start}..={end} is empty or negative")]
    InvalidPlatform { name: &'static str, start: i8, end: i8 },
    #[error("right platform must end before column {}, got {end}", i8::MAX)]
    PlatformPastGridLimit { end: i8 },
    #[error("platform ranges overlap: {left:?} and {right:?}")]
    PlatformsOverlap { left: ColumnRange, right: ColumnRange },
    #[error("platform ranges must be separated by a gap: {left:?} and {right:?}")]
    PlatformsAdjacent { left: ColumnRange, right: ColumnRange },
    #[error("left platform {left:?} must lie left of the right platform {right:?}")]
    PlatformsOutOfOrder { left: ColumnRange, right: ColumnRange },
    #[error("platform offset must be positive, got {0}")]
    NonPositiveOffset(i8),
    #[error("{name} spawn column {col} lies outside its platform")]
    SpawnColumnOutsidePlatform { name: &'static str, col: i8 },
    #[error("spawn row {row} lies outside 0..{height}")]
    SpawnRowOutOfRange { row: i8, height: i8 },
    #[error("{kind:?} spawned on the {name} platform would occupy {cell}, outside the platform")]
    SpawnFootprintOutOfRange {
        name: &'static str,
        kind: PieceKind,
        cell: Cell,
    },
    #[error("{0} must be positive")]
    ZeroDuration(&'static str),
    #[error("balance threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f32),
    #[error("required collaborator missing: {0}")]
    MissingCollaborator(&'static str),
}
