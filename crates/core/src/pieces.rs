//! Pieces module - block-group shapes and their rotation states
//!
//! Offsets are `(dcol, drow)` from the piece anchor with rows growing upward.
//! Every kind defines its own four rotation states; the North state always has
//! its lowest cell on the anchor row so a spawned group rests exactly
//! `spawn_row` steps above the floor. Rotation has no wall kicks: a rotated
//! state is either valid where it stands or rejected.

use crate::types::{PieceKind, Rotation};

/// Offset of a single cell relative to the piece anchor
pub type CellOffset = (i8, i8);

/// Shape of a piece in one rotation state
pub type PieceShape = &'static [CellOffset];

/// Get the cell offsets for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    let table = match kind {
        PieceKind::I => &I_SHAPES,
        PieceKind::O => &O_SHAPES,
        PieceKind::T => &T_SHAPES,
        PieceKind::S => &S_SHAPES,
        PieceKind::Z => &Z_SHAPES,
        PieceKind::J => &J_SHAPES,
        PieceKind::L => &L_SHAPES,
        PieceKind::Domino => return domino_shape(rotation),
        PieceKind::Mono => return &[(0, 0)],
    };
    &table[rotation_index(rotation)]
}

/// Orientation a freshly spawned group starts in
pub fn spawn_rotation(_kind: PieceKind) -> Rotation {
    Rotation::North
}

fn rotation_index(rotation: Rotation) -> usize {
    match rotation {
        Rotation::North => 0,
        Rotation::East => 1,
        Rotation::South => 2,
        Rotation::West => 3,
    }
}

type ShapeTable = [[CellOffset; 4]; 4];

/// I: horizontal bar on the anchor row, vertical states hang below it
const I_SHAPES: ShapeTable = [
    [(0, 0), (1, 0), (2, 0), (3, 0)],
    [(2, 1), (2, 0), (2, -1), (2, -2)],
    [(0, -1), (1, -1), (2, -1), (3, -1)],
    [(1, 1), (1, 0), (1, -1), (1, -2)],
];

/// O: identical in every state
const O_SHAPES: ShapeTable = [[(0, 0), (1, 0), (0, 1), (1, 1)]; 4];

const T_SHAPES: ShapeTable = [
    [(1, 1), (0, 0), (1, 0), (2, 0)],
    [(1, 1), (1, 0), (2, 0), (1, -1)],
    [(0, 0), (1, 0), (2, 0), (1, -1)],
    [(1, 1), (0, 0), (1, 0), (1, -1)],
];

const S_SHAPES: ShapeTable = [
    [(1, 1), (2, 1), (0, 0), (1, 0)],
    [(1, 1), (1, 0), (2, 0), (2, -1)],
    [(1, 0), (2, 0), (0, -1), (1, -1)],
    [(0, 1), (0, 0), (1, 0), (1, -1)],
];

const Z_SHAPES: ShapeTable = [
    [(0, 1), (1, 1), (1, 0), (2, 0)],
    [(2, 1), (1, 0), (2, 0), (1, -1)],
    [(0, 0), (1, 0), (1, -1), (2, -1)],
    [(1, 1), (0, 0), (1, 0), (0, -1)],
];

const J_SHAPES: ShapeTable = [
    [(0, 1), (0, 0), (1, 0), (2, 0)],
    [(1, 1), (2, 1), (1, 0), (1, -1)],
    [(0, 0), (1, 0), (2, 0), (2, -1)],
    [(1, 1), (1, 0), (0, -1), (1, -1)],
];

const L_SHAPES: ShapeTable = [
    [(2, 1), (0, 0), (1, 0), (2, 0)],
    [(1, 1), (1, 0), (1, -1), (2, -1)],
    [(0, 0), (1, 0), (2, 0), (0, -1)],
    [(0, 1), (1, 1), (1, 0), (1, -1)],
];

/// Domino pivots on its anchor cell.
fn domino_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => &[(0, 0), (1, 0)],
        Rotation::East => &[(0, 0), (0, -1)],
        Rotation::South => &[(0, 0), (-1, 0)],
        Rotation::West => &[(0, 0), (0, 1)],
    }
}
