//! Drop driver - gravity clock, lateral cooldown and the move primitives
//!
//! The driver owns only timers. Every position change still goes through the
//! grid's `validate_placement` chokepoint before the piece commits it.
//!
//! Gravity: the accumulator collects elapsed time and, once it strictly exceeds
//! the current timestep, one downward step is due and the accumulator restarts
//! at zero. At most one gravity step happens per tick.
//!
//! Timestep: `(10 - level) * base_unit`, with `level` clamped to `0..=9` so the
//! interval never reaches zero. Holding soft drop replaces it with the fixed
//! soft-drop timestep until released.

use crate::config::GameConfig;
use crate::error::InvalidPlacement;
use crate::grid::{Grid, GroupId};
use crate::piece::Piece;
use crate::ports::FeedbackSink;
use crate::types::{Feedback, MAX_GRAVITY_LEVEL};

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    GameOver,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::GameOver => "gameOver",
        }
    }
}

/// Result of one downward step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDown {
    Moved,
    /// The piece could not descend; its cells now form this locked group.
    Locked(GroupId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropDriver {
    gravity_base_unit_ms: u32,
    soft_drop_timestep_ms: u32,
    move_cooldown_ms: u32,
    gravity_acc_ms: u32,
    cooldown_remaining_ms: u32,
    soft_drop: bool,
    phase: Phase,
}

impl DropDriver {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            gravity_base_unit_ms: config.gravity_base_unit_ms,
            soft_drop_timestep_ms: config.soft_drop_timestep_ms,
            move_cooldown_ms: config.move_cooldown_ms,
            gravity_acc_ms: 0,
            cooldown_remaining_ms: 0,
            soft_drop: false,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Idle -> Running. Timers restart from zero.
    pub fn start(&mut self) {
        self.phase = Phase::Running;
        self.gravity_acc_ms = 0;
        self.cooldown_remaining_ms = 0;
        self.soft_drop = false;
    }

    /// Terminal transition; no further gravity or intents are processed.
    pub fn end(&mut self) {
        self.phase = Phase::GameOver;
        self.soft_drop = false;
    }

    /// Gravity interval for `level`, honoring the soft-drop override.
    pub fn timestep_ms(&self, level: u32) -> u32 {
        if self.soft_drop {
            return self.soft_drop_timestep_ms;
        }
        let remaining = 10 - level.min(MAX_GRAVITY_LEVEL);
        remaining * self.gravity_base_unit_ms
    }

    pub fn set_soft_drop(&mut self, held: bool) {
        self.soft_drop = held;
    }

    pub fn soft_drop(&self) -> bool {
        self.soft_drop
    }

    /// Advance both timers by `elapsed_ms`; true when a gravity step is due.
    pub fn advance(&mut self, elapsed_ms: u32, level: u32) -> bool {
        if !self.is_running() {
            return false;
        }

        self.cooldown_remaining_ms = self.cooldown_remaining_ms.saturating_sub(elapsed_ms);

        self.gravity_acc_ms = self.gravity_acc_ms.saturating_add(elapsed_ms);
        if self.gravity_acc_ms > self.timestep_ms(level) {
            self.gravity_acc_ms = 0;
            return true;
        }
        false
    }

    /// Claim the lateral-move window. False while the cooldown is running;
    /// otherwise the cooldown restarts whatever the move's outcome.
    pub fn begin_lateral(&mut self) -> bool {
        if self.cooldown_remaining_ms > 0 {
            return false;
        }
        self.cooldown_remaining_ms = self.move_cooldown_ms;
        true
    }

    pub fn gravity_acc_ms(&self) -> u32 {
        self.gravity_acc_ms
    }

    pub fn cooldown_remaining_ms(&self) -> u32 {
        self.cooldown_remaining_ms
    }
}

/// One gravity step: descend if the row below is free, otherwise lock.
pub fn step_down(piece: &mut Piece, grid: &mut Grid) -> Result<StepDown, InvalidPlacement> {
    let below = piece.propose_translation(0, -1);
    if grid.is_placement_valid(below.cells()) {
        piece.commit(below);
        return Ok(StepDown::Moved);
    }
    let id = grid.lock(piece.cells(), piece.kind())?;
    piece.deactivate();
    Ok(StepDown::Locked(id))
}

/// Lateral move by `dcol`. A blocked move never locks; it signals `BlockedMove`.
pub fn try_lateral(
    piece: &mut Piece,
    grid: &Grid,
    dcol: i8,
    feedback: &mut dyn FeedbackSink,
) -> bool {
    let proposal = piece.propose_translation(dcol, 0);
    if grid.is_placement_valid(proposal.cells()) {
        piece.commit(proposal);
        true
    } else {
        feedback.signal(Feedback::BlockedMove);
        false
    }
}

/// Rotation through the same validate-then-commit path; no kicks.
pub fn try_rotate(piece: &mut Piece, grid: &Grid, clockwise: bool) -> bool {
    let proposal = piece.propose_rotation(clockwise);
    if grid.is_placement_valid(proposal.cells()) {
        piece.commit(proposal);
        true
    } else {
        false
    }
}
