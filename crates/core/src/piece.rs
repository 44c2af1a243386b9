//! Piece module - the active falling block-group
//!
//! A piece never validates itself. It only builds [`Proposal`]s (candidate
//! anchor, rotation, platform and the resulting absolute cells); the grid
//! validates them and the caller commits the accepted one. Committing replaces
//! every field at once, so a piece can never report a platform that disagrees
//! with where its cells are.

use arrayvec::ArrayVec;

use crate::pieces::get_shape;
use crate::types::{Cell, PieceKind, Platform, Rotation, MAX_PIECE_CELLS};

/// Absolute cells of one block-group
pub type CellSet = ArrayVec<Cell, MAX_PIECE_CELLS>;

/// A candidate position for the active piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub anchor: Cell,
    pub rotation: Rotation,
    pub platform: Platform,
    cells: CellSet,
}

impl Proposal {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: Rotation,
    anchor: Cell,
    platform: Platform,
    active: bool,
    cells: CellSet,
}

impl Piece {
    /// Create a piece with its anchor at `anchor`, belonging to `platform`
    pub fn new(kind: PieceKind, rotation: Rotation, anchor: Cell, platform: Platform) -> Self {
        Self {
            kind,
            rotation,
            anchor,
            platform,
            active: true,
            cells: cells_at(kind, rotation, anchor),
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn anchor(&self) -> Cell {
        self.anchor
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Live absolute cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The piece as it currently stands, for validating a fresh spawn.
    pub fn current(&self) -> Proposal {
        Proposal {
            anchor: self.anchor,
            rotation: self.rotation,
            platform: self.platform,
            cells: self.cells.clone(),
        }
    }

    /// Candidate cells after shifting by `(dcol, drow)`; the piece is untouched.
    pub fn propose_translation(&self, dcol: i8, drow: i8) -> Proposal {
        let anchor = self.anchor.offset(dcol, drow);
        Proposal {
            anchor,
            rotation: self.rotation,
            platform: self.platform,
            cells: self.cells.iter().map(|c| c.offset(dcol, drow)).collect(),
        }
    }

    /// Candidate cells after one rotation step about the anchor.
    pub fn propose_rotation(&self, clockwise: bool) -> Proposal {
        let rotation = if clockwise {
            self.rotation.rotate_cw()
        } else {
            self.rotation.rotate_ccw()
        };
        Proposal {
            anchor: self.anchor,
            rotation,
            platform: self.platform,
            cells: cells_at(self.kind, rotation, self.anchor),
        }
    }

    /// Candidate for moving to the other platform: the anchor shifts by
    /// `offset` columns toward it and the platform assignment flips.
    pub fn propose_switch(&self, offset: i8) -> Proposal {
        let dcol = offset.saturating_mul(self.platform.switch_direction());
        let anchor = self.anchor.offset(dcol, 0);
        Proposal {
            anchor,
            rotation: self.rotation,
            platform: self.platform.opposite(),
            cells: cells_at(self.kind, self.rotation, anchor),
        }
    }

    /// Replace position, rotation, platform and cells with a validated proposal.
    pub fn commit(&mut self, proposal: Proposal) {
        self.anchor = proposal.anchor;
        self.rotation = proposal.rotation;
        self.platform = proposal.platform;
        self.cells = proposal.cells;
    }

    /// Mark the piece as locked; its cells now belong to the grid.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

fn cells_at(kind: PieceKind, rotation: Rotation, anchor: Cell) -> CellSet {
    get_shape(kind, rotation)
        .iter()
        .map(|&(dc, dr)| anchor.offset(dc, dr))
        .collect()
}
