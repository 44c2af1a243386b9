//! Read-only view of a simulation for renderers and the observation adapter.

use arrayvec::ArrayVec;

use crate::config::PlatformLayout;
use crate::driver::Phase;
use crate::types::{Cell, PieceKind, Platform, Rotation, BALANCE_UNIT_MS, MAX_PIECE_CELLS};

/// Board cell code for a kind: 0 is empty, kinds count from 1 in catalog order.
pub fn kind_code(kind: PieceKind) -> u8 {
    PieceKind::ALL
        .iter()
        .position(|&k| k == kind)
        .map(|i| i as u8 + 1)
        .unwrap_or(0)
}

/// Inverse of [`kind_code`]
pub fn kind_from_code(code: u8) -> Option<PieceKind> {
    if code == 0 {
        return None;
    }
    PieceKind::ALL.get(code as usize - 1).copied()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub anchor: Cell,
    pub platform: Platform,
    pub cells: ArrayVec<Cell, MAX_PIECE_CELLS>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub layout: PlatformLayout,
    pub width: i8,
    /// Row-major kind codes, row 0 (bottom) first
    pub board: Vec<u8>,
    pub active: Option<ActiveSnapshot>,
    pub tilt: f32,
    pub left_count: usize,
    pub right_count: usize,
    pub balanced_ms: u32,
    /// Balanced time that earns one bonus
    pub balance_unit_ms: u32,
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    /// Increments once per lock; lets consumers skip unchanged boards.
    pub board_id: u32,
}

impl GameSnapshot {
    /// Kind code at `(col, row)`; 0 when empty or outside the grid.
    pub fn cell(&self, col: i8, row: i8) -> u8 {
        if col < 0 || row < 0 || col >= self.width || row >= self.layout.height {
            return 0;
        }
        let i = row as usize * self.width as usize + col as usize;
        self.board.get(i).copied().unwrap_or(0)
    }

    pub fn playable(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn clear(&mut self) {
        self.board.fill(0);
        self.active = None;
        self.tilt = 0.0;
        self.left_count = 0;
        self.right_count = 0;
        self.balanced_ms = 0;
        self.phase = Phase::Idle;
        self.score = 0;
        self.level = 0;
        self.lines = 0;
        self.board_id = 0;
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let layout = PlatformLayout::default();
        let width = layout.width();
        Self {
            layout,
            width,
            board: vec![0; width as usize * layout.height as usize],
            active: None,
            tilt: 0.0,
            left_count: 0,
            right_count: 0,
            balanced_ms: 0,
            balance_unit_ms: BALANCE_UNIT_MS,
            phase: Phase::Idle,
            score: 0,
            level: 0,
            lines: 0,
            board_id: 0,
        }
    }
}
