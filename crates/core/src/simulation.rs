//! Simulation - the composition root
//!
//! [`SimulationBuilder`] wires the grid, drop driver, balance engine and switch
//! controller to their collaborators once, up front. Each [`Simulation::tick`]
//! then runs strictly in this order:
//!
//! 1. gravity step, locking the piece if it cannot descend
//! 2. per-platform line clear for a lock
//! 3. spawn of the next piece on the platform the last one locked on
//! 4. balance recompute and bonus scoring
//!
//! Intents are applied between ticks and never overlap one.

use tracing::{debug, info, warn};

use crate::balance::{BalanceEngine, BalanceStep};
use crate::config::GameConfig;
use crate::driver::{step_down, try_lateral, try_rotate, DropDriver, Phase, StepDown};
use crate::error::{ConfigError, SpawnFailure};
use crate::grid::{Grid, GroupId};
use crate::piece::Piece;
use crate::ports::{FeedbackSink, NoFeedback, NoReload, ReloadHook, ScoreKeeper, Spawner};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::switch::attempt_switch;
use crate::types::{Feedback, Intent, PieceKind, Platform};

/// Emitted when a piece locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub group: GroupId,
    pub kind: PieceKind,
    pub platform: Platform,
    pub lines_left: u32,
    pub lines_right: u32,
}

impl LockEvent {
    pub fn lines_cleared(&self) -> u32 {
        self.lines_left + self.lines_right
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// The active piece moved down one row
    pub dropped: bool,
    pub locked: Option<LockEvent>,
    pub balance: BalanceStep,
}

impl TickOutcome {
    fn idle(tilt: f32) -> Self {
        Self {
            dropped: false,
            locked: None,
            balance: BalanceStep {
                tilt,
                balanced: false,
                bonuses: 0,
            },
        }
    }
}

/// Assembles a [`Simulation`]. Spawner and score keeper are mandatory.
pub struct SimulationBuilder {
    config: GameConfig,
    spawner: Option<Box<dyn Spawner>>,
    scores: Option<Box<dyn ScoreKeeper>>,
    feedback: Box<dyn FeedbackSink>,
    reload: Box<dyn ReloadHook>,
}

impl SimulationBuilder {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            spawner: None,
            scores: None,
            feedback: Box::new(NoFeedback),
            reload: Box::new(NoReload),
        }
    }

    pub fn spawner(mut self, spawner: impl Spawner + 'static) -> Self {
        self.spawner = Some(Box::new(spawner));
        self
    }

    pub fn score_keeper(mut self, scores: impl ScoreKeeper + 'static) -> Self {
        self.scores = Some(Box::new(scores));
        self
    }

    pub fn feedback(mut self, feedback: impl FeedbackSink + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn reload_hook(mut self, reload: impl ReloadHook + 'static) -> Self {
        self.reload = Box::new(reload);
        self
    }

    /// Validate the configuration and collaborators; nothing ticks before this succeeds.
    pub fn build(self) -> Result<Simulation, ConfigError> {
        if let Err(e) = self.config.validate() {
            warn!(error = %e, "rejecting configuration");
            return Err(e);
        }
        let spawner = self
            .spawner
            .ok_or(ConfigError::MissingCollaborator("spawner"))?;
        let scores = self
            .scores
            .ok_or(ConfigError::MissingCollaborator("score keeper"))?;
        let grid = Grid::new(self.config.layout)?;

        Ok(Simulation {
            driver: DropDriver::new(&self.config),
            balance: BalanceEngine::new(self.config.balance_threshold, self.config.balance_unit_ms),
            config: self.config,
            grid,
            active: None,
            spawner,
            scores,
            feedback: self.feedback,
            reload: self.reload,
            last_event: None,
            board_id: 0,
        })
    }
}

/// One round of the two-platform balance game.
pub struct Simulation {
    config: GameConfig,
    grid: Grid,
    active: Option<Piece>,
    driver: DropDriver,
    balance: BalanceEngine,
    spawner: Box<dyn Spawner>,
    scores: Box<dyn ScoreKeeper>,
    feedback: Box<dyn FeedbackSink>,
    reload: Box<dyn ReloadHook>,
    last_event: Option<LockEvent>,
    board_id: u32,
}

impl Simulation {
    pub fn builder(config: GameConfig) -> SimulationBuilder {
        SimulationBuilder::new(config)
    }

    /// Idle -> Running with the first piece on the left platform.
    /// Calling it again after the round started is a no-op.
    pub fn start(&mut self) -> Result<(), SpawnFailure> {
        if self.driver.phase() != Phase::Idle {
            return Ok(());
        }
        self.driver.start();
        info!("round started");
        self.spawn(Platform::Left)
    }

    /// Advance the simulation by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) -> Result<TickOutcome, SpawnFailure> {
        if !self.driver.is_running() {
            return Ok(TickOutcome::idle(self.balance.tilt()));
        }

        let mut dropped = false;
        let mut locked = None;

        let gravity_due = self.driver.advance(elapsed_ms, self.scores.level());
        if gravity_due {
            if let Some(piece) = self.active.as_mut() {
                match step_down(piece, &mut self.grid) {
                    Ok(StepDown::Moved) => dropped = true,
                    Ok(StepDown::Locked(group)) => {
                        let platform = piece.platform();
                        let kind = piece.kind();
                        self.active = None;

                        let event = self.clear_lines(group, kind, platform);
                        locked = Some(event);
                        self.last_event = Some(event);
                        self.board_id = self.board_id.wrapping_add(1);

                        self.spawn(platform)?;
                    }
                    Err(e) => {
                        // The active piece's cells were validated when they were
                        // committed, so this only happens if the grid changed under it.
                        warn!(error = %e, "active piece could not lock");
                        return Err(self.end_round(e.cell()));
                    }
                }
            }
        }

        let balance = self.balance.step(
            self.grid.platform_count(Platform::Left),
            self.grid.platform_count(Platform::Right),
            elapsed_ms,
        );
        for _ in 0..balance.bonuses {
            self.scores.add_points_for_balance();
        }
        if balance.bonuses > 0 {
            debug!(bonuses = balance.bonuses, score = self.scores.score(), "balance bonus");
        }

        Ok(TickOutcome {
            dropped,
            locked,
            balance,
        })
    }

    /// Apply one player intent. Returns whether it changed anything.
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        if !self.driver.is_running() {
            return false;
        }
        if let Intent::SoftDropHeld(held) = intent {
            self.driver.set_soft_drop(held);
            return true;
        }
        let Some(piece) = self.active.as_mut() else {
            return false;
        };

        match intent {
            Intent::MoveLeft | Intent::MoveRight => {
                if !self.driver.begin_lateral() {
                    return false;
                }
                let dcol = if intent == Intent::MoveLeft { -1 } else { 1 };
                try_lateral(piece, &self.grid, dcol, &mut *self.feedback)
            }
            Intent::RotateLeft => try_rotate(piece, &self.grid, false),
            Intent::RotateRight => try_rotate(piece, &self.grid, true),
            Intent::SwitchPlatform => attempt_switch(
                piece,
                &self.grid,
                self.config.platform_offset,
                &mut *self.feedback,
            ),
            Intent::SoftDropHeld(_) => false,
        }
    }

    /// Last lock event, consumed.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Fill `out` in place, reusing its board buffer.
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.layout = *self.grid.layout();
        out.width = self.grid.width();
        self.grid.occupancy_snapshot(&mut out.board);
        out.active = self.active.as_ref().map(|p| ActiveSnapshot {
            kind: p.kind(),
            rotation: p.rotation(),
            anchor: p.anchor(),
            platform: p.platform(),
            cells: p.cells().iter().copied().collect(),
        });
        out.tilt = self.balance.tilt();
        out.left_count = self.grid.platform_count(Platform::Left);
        out.right_count = self.grid.platform_count(Platform::Right);
        out.balanced_ms = self.balance.accumulator_ms();
        out.balance_unit_ms = self.config.balance_unit_ms;
        out.phase = self.driver.phase();
        out.score = self.scores.score();
        out.level = self.scores.level();
        out.lines = self.scores.lines();
        out.board_id = self.board_id;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.driver.phase()
    }

    pub fn is_game_over(&self) -> bool {
        self.driver.phase() == Phase::GameOver
    }

    pub fn tilt(&self) -> f32 {
        self.balance.tilt()
    }

    pub fn balance(&self) -> &BalanceEngine {
        &self.balance
    }

    pub fn score(&self) -> u32 {
        self.scores.score()
    }

    pub fn level(&self) -> u32 {
        self.scores.level()
    }

    pub fn lines(&self) -> u32 {
        self.scores.lines()
    }

    fn clear_lines(&mut self, group: GroupId, kind: PieceKind, platform: Platform) -> LockEvent {
        let [left, right] = self.grid.check_all_lines();
        for report in [&left, &right] {
            let lines = report.lines();
            if lines > 0 {
                self.scores.add_points_for_lines(lines);
                self.feedback.signal(Feedback::LineCleared(lines));
            }
        }
        LockEvent {
            group,
            kind,
            platform,
            lines_left: left.lines(),
            lines_right: right.lines(),
        }
    }

    fn spawn(&mut self, platform: Platform) -> Result<(), SpawnFailure> {
        let piece = self.spawner.spawn_next(platform);
        match self.grid.validate_placement(piece.cells()) {
            Ok(()) => {
                debug!(kind = piece.kind().as_str(), platform = platform.as_str(), "spawned");
                self.active = Some(piece);
                Ok(())
            }
            Err(e) => Err(self.end_round(e.cell())),
        }
    }

    fn end_round(&mut self, blocked: crate::types::Cell) -> SpawnFailure {
        self.active = None;
        if self.driver.phase() != Phase::GameOver {
            self.driver.end();
            info!(score = self.scores.score(), lines = self.scores.lines(), %blocked, "game over");
            self.reload.reload();
        }
        SpawnFailure { blocked }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("phase", &self.driver.phase())
            .field("active", &self.active)
            .field("tilt", &self.balance.tilt())
            .field("score", &self.scores.score())
            .finish_non_exhaustive()
    }
}
