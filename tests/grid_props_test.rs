//! Property tests for the grid and piece invariants.

use std::collections::HashSet;

use proptest::prelude::*;

use tui_balance::core::{attempt_switch, GameConfig, Grid, NoFeedback, Piece, PlatformLayout};
use tui_balance::types::{Cell, PieceKind, Platform, Rotation};

const ROTATIONS: [Rotation; 4] = [
    Rotation::North,
    Rotation::East,
    Rotation::South,
    Rotation::West,
];

fn kind_strategy() -> impl Strategy<Value = PieceKind> {
    prop::sample::select(PieceKind::ALL.to_vec())
}

fn rotation_strategy() -> impl Strategy<Value = Rotation> {
    prop::sample::select(ROTATIONS.to_vec())
}

/// One lock attempt anywhere on (or just off) the board.
fn placement_strategy() -> impl Strategy<Value = (PieceKind, Rotation, i8, i8)> {
    (kind_strategy(), rotation_strategy(), -2i8..28, -2i8..19)
}

fn assert_grid_invariants(grid: &Grid) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    let layout = *grid.layout();
    let (mut left, mut right) = (0usize, 0usize);
    for cell in grid.locked_cells() {
        prop_assert!(seen.insert(cell), "duplicate locked cell {}", cell);
        prop_assert!(grid.is_cell_in_bounds(cell.col, cell.row), "cell {} out of bounds", cell);
        prop_assert!(grid.is_occupied(cell.col, cell.row));
        match layout.platform_of(cell.col) {
            Some(Platform::Left) => left += 1,
            Some(Platform::Right) => right += 1,
            None => prop_assert!(false, "cell {} sits in the gap", cell),
        }
    }
    prop_assert_eq!(grid.platform_count(Platform::Left), left);
    prop_assert_eq!(grid.platform_count(Platform::Right), right);
    prop_assert_eq!(grid.occupancy().iter().filter(|&&o| o).count(), seen.len());
    Ok(())
}

proptest! {
    #[test]
    fn random_locks_and_clears_keep_grid_consistent(
        placements in prop::collection::vec(placement_strategy(), 1..120)
    ) {
        let mut grid = Grid::new(PlatformLayout::default()).unwrap();
        for (kind, rotation, col, row) in placements {
            let platform = grid.layout().platform_of(col).unwrap_or(Platform::Left);
            let piece = Piece::new(kind, rotation, Cell::new(col, row), platform);
            let before = grid.clone();
            match grid.lock(piece.cells(), kind) {
                Ok(_) => {}
                Err(_) => prop_assert_eq!(&grid, &before, "rejected lock changed the grid"),
            }
            grid.check_all_lines();
            assert_grid_invariants(&grid)?;
        }
    }

    #[test]
    fn rebuild_occupancy_is_idempotent(
        placements in prop::collection::vec(placement_strategy(), 1..60)
    ) {
        let mut grid = Grid::new(PlatformLayout::default()).unwrap();
        for (kind, rotation, col, row) in placements {
            let platform = grid.layout().platform_of(col).unwrap_or(Platform::Left);
            let piece = Piece::new(kind, rotation, Cell::new(col, row), platform);
            let _ = grid.lock(piece.cells(), kind);
        }
        let occupancy = grid.occupancy().to_vec();
        let counts = (grid.platform_count(Platform::Left), grid.platform_count(Platform::Right));

        prop_assert!(grid.rebuild_occupancy().is_ok());
        prop_assert!(grid.rebuild_occupancy().is_ok());
        prop_assert_eq!(grid.occupancy(), occupancy.as_slice());
        prop_assert_eq!(
            (grid.platform_count(Platform::Left), grid.platform_count(Platform::Right)),
            counts
        );
    }

    #[test]
    fn translation_round_trip_restores_cells(
        kind in kind_strategy(),
        rotation in rotation_strategy(),
        col in 0i8..26,
        row in 0i8..17,
        dcol in -5i8..=5,
        drow in -5i8..=5,
    ) {
        let mut piece = Piece::new(kind, rotation, Cell::new(col, row), Platform::Left);
        let original = piece.clone();
        let there = piece.propose_translation(dcol, drow);
        piece.commit(there);
        let back = piece.propose_translation(-dcol, -drow);
        piece.commit(back);
        prop_assert_eq!(piece, original);
    }

    #[test]
    fn accepted_switches_round_trip(
        kind in kind_strategy(),
        rotation in rotation_strategy(),
        col in 0i8..=6,
        row in 2i8..14,
    ) {
        let config = GameConfig::default();
        let grid = Grid::new(config.layout).unwrap();
        let mut piece = Piece::new(kind, rotation, Cell::new(col, row), Platform::Left);
        prop_assume!(grid.is_placement_valid(piece.cells()));
        let original = piece.clone();

        if attempt_switch(&mut piece, &grid, config.platform_offset, &mut NoFeedback) {
            prop_assert_eq!(piece.platform(), Platform::Right);
            prop_assert!(grid.is_placement_valid(piece.cells()));
            prop_assert!(attempt_switch(&mut piece, &grid, config.platform_offset, &mut NoFeedback));
            prop_assert_eq!(piece, original);
        } else {
            prop_assert_eq!(piece, original);
        }
    }
}
