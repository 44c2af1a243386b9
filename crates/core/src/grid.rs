//! Grid module - sole owner of the locked blocks for both platforms
//!
//! The authoritative state is the list of locked block-groups. The boolean
//! occupancy field is a derived view: it is rebuilt from the groups after every
//! mutation (lock or line clear), so it can never go stale between queries.
//! Per-platform cell counts are kept alongside so the balance engine reads them
//! in O(1).
//!
//! Coordinates: `(col, row)` with row 0 at the bottom. A cell is in bounds only
//! when its row lies in `0..height` and its column lies on one of the two
//! platforms; the gap between them is never a legal position.

use tracing::{debug, info};

use crate::config::PlatformLayout;
use crate::error::{ConfigError, InvalidPlacement};
use crate::snapshot::kind_code;
use crate::types::{Cell, ColumnRange, PieceKind, Platform};

/// Identifier of a locked block-group
pub type GroupId = u32;

/// Cells that locked together and still remain on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedGroup {
    pub id: GroupId,
    pub kind: PieceKind,
    cells: Vec<Cell>,
}

impl LockedGroup {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Result of one platform's full-line pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearReport {
    pub platform: Platform,
    /// Cleared rows in ascending order, as they were numbered before the clear
    pub rows: Vec<i8>,
}

impl ClearReport {
    pub fn lines(&self) -> u32 {
        self.rows.len() as u32
    }
}

/// The shared board for both platforms
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    layout: PlatformLayout,
    width: i8,
    groups: Vec<LockedGroup>,
    next_group_id: GroupId,
    /// Row-major occupancy view (row * width + col)
    occupied: Vec<bool>,
    left_count: usize,
    right_count: usize,
}

impl Grid {
    /// Create an empty grid. Fails if the layout is malformed.
    pub fn new(layout: PlatformLayout) -> Result<Self, ConfigError> {
        layout.validate()?;
        let width = layout.width();
        let size = (width as usize) * (layout.height as usize);
        Ok(Self {
            layout,
            width,
            groups: Vec::new(),
            next_group_id: 1,
            occupied: vec![false; size],
            left_count: 0,
            right_count: 0,
        })
    }

    pub fn layout(&self) -> &PlatformLayout {
        &self.layout
    }

    pub fn width(&self) -> i8 {
        self.width
    }

    pub fn height(&self) -> i8 {
        self.layout.height
    }

    /// Flat index into the full rectangle, gap included.
    #[inline(always)]
    fn index(&self, col: i8, row: i8) -> Option<usize> {
        if col < 0 || col >= self.width || row < 0 || row >= self.layout.height {
            return None;
        }
        Some((row as usize) * (self.width as usize) + (col as usize))
    }

    /// True iff `row` is inside the grid and `col` lies on either platform.
    pub fn is_cell_in_bounds(&self, col: i8, row: i8) -> bool {
        row >= 0
            && row < self.layout.height
            && (self.layout.left.contains(col) || self.layout.right.contains(col))
    }

    /// Check if a cell holds a locked block
    pub fn is_occupied(&self, col: i8, row: i8) -> bool {
        self.index(col, row)
            .map(|i| self.occupied[i])
            .unwrap_or(false)
    }

    /// Recompute the occupancy view and platform counts from the locked groups.
    ///
    /// Fails if the locked set itself breaks the bounds or uniqueness invariant,
    /// which only a bug in this module could cause.
    pub fn rebuild_occupancy(&mut self) -> Result<(), InvalidPlacement> {
        self.occupied.fill(false);
        self.left_count = 0;
        self.right_count = 0;

        for group in &self.groups {
            for &cell in &group.cells {
                if !self.is_cell_in_bounds(cell.col, cell.row) {
                    return Err(InvalidPlacement::OutOfBounds { cell });
                }
                let Some(i) = self.index(cell.col, cell.row) else {
                    return Err(InvalidPlacement::OutOfBounds { cell });
                };
                if self.occupied[i] {
                    return Err(InvalidPlacement::Occupied { cell });
                }
                self.occupied[i] = true;
                match self.layout.platform_of(cell.col) {
                    Some(Platform::Left) => self.left_count += 1,
                    Some(Platform::Right) => self.right_count += 1,
                    None => {}
                }
            }
        }

        Ok(())
    }

    /// Single chokepoint for every move, rotation, switch and spawn.
    pub fn validate_placement(&self, cells: &[Cell]) -> Result<(), InvalidPlacement> {
        for &cell in cells {
            if !self.is_cell_in_bounds(cell.col, cell.row) {
                return Err(InvalidPlacement::OutOfBounds { cell });
            }
            if self.is_occupied(cell.col, cell.row) {
                return Err(InvalidPlacement::Occupied { cell });
            }
        }
        Ok(())
    }

    pub fn is_placement_valid(&self, cells: &[Cell]) -> bool {
        self.validate_placement(cells).is_ok()
    }

    /// Make `cells` permanent board state as one block-group.
    pub fn lock(&mut self, cells: &[Cell], kind: PieceKind) -> Result<GroupId, InvalidPlacement> {
        self.validate_placement(cells)?;
        // Reject duplicates inside the group itself.
        for (i, a) in cells.iter().enumerate() {
            if cells[i + 1..].contains(a) {
                return Err(InvalidPlacement::Occupied { cell: *a });
            }
        }

        let id = self.next_group_id;
        self.next_group_id = self.next_group_id.wrapping_add(1);

        for &cell in cells {
            if let Some(i) = self.index(cell.col, cell.row) {
                self.occupied[i] = true;
            }
            match self.layout.platform_of(cell.col) {
                Some(Platform::Left) => self.left_count += 1,
                Some(Platform::Right) => self.right_count += 1,
                None => {}
            }
        }
        self.groups.push(LockedGroup {
            id,
            kind,
            cells: cells.to_vec(),
        });

        debug!(group = id, kind = kind.as_str(), cells = cells.len(), "locked block-group");
        Ok(id)
    }

    /// Check if every column of `range` is occupied on `row`
    pub fn is_row_full(&self, row: i8, range: ColumnRange) -> bool {
        if row < 0 || row >= self.layout.height || range.is_empty() {
            return false;
        }
        range.iter().all(|col| self.is_occupied(col, row))
    }

    /// Rows (ascending) where every column in `range` is occupied.
    pub fn find_full_rows(&self, range: ColumnRange) -> Vec<i8> {
        (0..self.layout.height)
            .filter(|&row| self.is_row_full(row, range))
            .collect()
    }

    /// Clear `rows` inside `range` and collapse the cells above them.
    ///
    /// Rows are handled in ascending order. Each earlier clear has already
    /// pulled everything above it down one row, so the k-th cleared row (0-based)
    /// is found at `row - k` when its turn comes. Columns outside `range` are
    /// never touched. Groups left without cells are discarded.
    ///
    /// Returns the number of rows cleared.
    pub fn clear_rows_and_collapse(&mut self, rows: &[i8], range: ColumnRange) -> usize {
        let mut ordered: Vec<i8> = rows
            .iter()
            .copied()
            .filter(|&r| r >= 0 && r < self.layout.height)
            .collect();
        ordered.sort_unstable();
        ordered.dedup();

        for (already_cleared, &row) in ordered.iter().enumerate() {
            let target = row - already_cleared as i8;
            for group in &mut self.groups {
                group
                    .cells
                    .retain(|c| !(range.contains(c.col) && c.row == target));
                for cell in &mut group.cells {
                    if range.contains(cell.col) && cell.row > target {
                        cell.row -= 1;
                    }
                }
            }
        }

        self.groups.retain(|g| !g.cells.is_empty());

        // Collapsing only moves cells down into rows it just emptied.
        let rebuilt = self.rebuild_occupancy();
        debug_assert!(rebuilt.is_ok(), "occupancy broken after clear: {rebuilt:?}");

        ordered.len()
    }

    /// Find and clear the full lines of one platform.
    pub fn check_platform_lines(&mut self, platform: Platform) -> ClearReport {
        let range = self.layout.range(platform);
        let rows = self.find_full_rows(range);
        if !rows.is_empty() {
            self.clear_rows_and_collapse(&rows, range);
            info!(platform = platform.as_str(), lines = rows.len(), "cleared full lines");
        }
        ClearReport { platform, rows }
    }

    /// Left then right, each platform judged on its own columns only.
    pub fn check_all_lines(&mut self) -> [ClearReport; 2] {
        [
            self.check_platform_lines(Platform::Left),
            self.check_platform_lines(Platform::Right),
        ]
    }

    /// Number of locked cells on a platform
    pub fn platform_count(&self, platform: Platform) -> usize {
        match platform {
            Platform::Left => self.left_count,
            Platform::Right => self.right_count,
        }
    }

    pub fn groups(&self) -> &[LockedGroup] {
        &self.groups
    }

    /// Every locked cell, group by group
    pub fn locked_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.groups.iter().flat_map(|g| g.cells.iter().copied())
    }

    pub fn locked_count(&self) -> usize {
        self.left_count + self.right_count
    }

    /// Row-major occupancy view (row 0 first)
    pub fn occupancy(&self) -> &[bool] {
        &self.occupied
    }

    /// Write row-major kind codes (0 = empty) into `out`, resizing it to fit.
    pub fn occupancy_snapshot(&self, out: &mut Vec<u8>) {
        out.clear();
        out.resize(self.occupied.len(), 0);
        let w = self.width as usize;
        for group in &self.groups {
            let code = kind_code(group.kind);
            for cell in &group.cells {
                out[cell.row as usize * w + cell.col as usize] = code;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(PlatformLayout::default()).unwrap()
    }

    fn fill_row(grid: &mut Grid, row: i8, range: ColumnRange) {
        let cells: Vec<Cell> = range.iter().map(|c| Cell::new(c, row)).collect();
        grid.lock(&cells, PieceKind::I).unwrap();
    }

    #[test]
    fn test_grid_index_calculation() {
        let g = grid();
        assert_eq!(g.index(0, 0), Some(0));
        assert_eq!(g.index(25, 0), Some(25));
        assert_eq!(g.index(0, 1), Some(26));
        assert_eq!(g.index(25, 16), Some(26 * 17 - 1));
        assert_eq!(g.index(-1, 0), None);
        assert_eq!(g.index(26, 0), None);
        assert_eq!(g.index(0, 17), None);
    }

    #[test]
    fn gap_columns_are_out_of_bounds() {
        let g = grid();
        for col in 7..16 {
            assert!(!g.is_cell_in_bounds(col, 0), "gap column {} accepted", col);
        }
        assert!(g.is_cell_in_bounds(6, 0));
        assert!(g.is_cell_in_bounds(16, 16));
        assert!(!g.is_cell_in_bounds(16, 17));
        assert!(!g.is_cell_in_bounds(0, -1));
    }

    #[test]
    fn lock_rejects_gap_and_collisions() {
        let mut g = grid();
        assert_eq!(
            g.lock(&[Cell::new(8, 0)], PieceKind::Mono),
            Err(InvalidPlacement::OutOfBounds {
                cell: Cell::new(8, 0)
            })
        );
        g.lock(&[Cell::new(1, 0)], PieceKind::Mono).unwrap();
        assert_eq!(
            g.lock(&[Cell::new(1, 0)], PieceKind::Mono),
            Err(InvalidPlacement::Occupied {
                cell: Cell::new(1, 0)
            })
        );
        assert_eq!(g.locked_count(), 1);
    }

    #[test]
    fn counts_follow_platforms() {
        let mut g = grid();
        g.lock(&[Cell::new(0, 0), Cell::new(1, 0)], PieceKind::Domino)
            .unwrap();
        g.lock(&[Cell::new(20, 0)], PieceKind::Mono).unwrap();
        assert_eq!(g.platform_count(Platform::Left), 2);
        assert_eq!(g.platform_count(Platform::Right), 1);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut g = grid();
        g.lock(&[Cell::new(3, 0), Cell::new(3, 1)], PieceKind::Domino)
            .unwrap();
        g.rebuild_occupancy().unwrap();
        let first = g.clone();
        g.rebuild_occupancy().unwrap();
        assert_eq!(g, first);
    }

    #[test]
    fn rows_are_full_per_platform() {
        let mut g = grid();
        let left = g.layout().left;
        fill_row(&mut g, 0, left);
        assert_eq!(g.find_full_rows(left), vec![0]);
        assert!(g.find_full_rows(g.layout().right).is_empty());
    }

    #[test]
    fn clear_two_rows_drops_third_to_floor() {
        let mut g = grid();
        let left = ColumnRange::new(0, 6);
        fill_row(&mut g, 0, left);
        fill_row(&mut g, 1, left);
        let half: Vec<Cell> = (0..3).map(|c| Cell::new(c, 2)).collect();
        g.lock(&half, PieceKind::I).unwrap();

        let rows = g.find_full_rows(left);
        assert_eq!(rows, vec![0, 1]);
        assert_eq!(g.clear_rows_and_collapse(&rows, left), 2);

        for col in 0..3 {
            assert!(g.is_occupied(col, 0));
        }
        for col in 3..7 {
            assert!(!g.is_occupied(col, 0));
        }
        for row in 1..17 {
            for col in 0..7 {
                assert!(!g.is_occupied(col, row), "({}, {}) should be empty", col, row);
            }
        }
        assert_eq!(g.platform_count(Platform::Left), 3);
        assert_eq!(g.groups().len(), 1);
    }

    #[test]
    fn clear_leaves_other_platform_untouched() {
        let mut g = grid();
        let left = g.layout().left;
        fill_row(&mut g, 0, left);
        g.lock(&[Cell::new(16, 0), Cell::new(16, 1)], PieceKind::Domino)
            .unwrap();
        let report = g.check_platform_lines(Platform::Left);
        assert_eq!(report.lines(), 1);
        assert!(g.is_occupied(16, 0));
        assert!(g.is_occupied(16, 1));
        assert_eq!(g.platform_count(Platform::Right), 2);
    }

    #[test]
    fn non_contiguous_rows_collapse_correctly() {
        let mut g = grid();
        let left = g.layout().left;
        fill_row(&mut g, 0, left);
        g.lock(&[Cell::new(0, 1)], PieceKind::Mono).unwrap();
        fill_row(&mut g, 2, left);
        g.lock(&[Cell::new(4, 3)], PieceKind::Mono).unwrap();

        assert_eq!(g.clear_rows_and_collapse(&[0, 2], left), 2);
        assert!(g.is_occupied(0, 0));
        assert!(g.is_occupied(4, 1));
        assert_eq!(g.platform_count(Platform::Left), 2);
    }

    #[test]
    fn occupancy_snapshot_writes_kind_codes() {
        let mut g = grid();
        g.lock(&[Cell::new(16, 0)], PieceKind::Mono).unwrap();
        let mut out = Vec::new();
        g.occupancy_snapshot(&mut out);
        assert_eq!(out.len(), 26 * 17);
        assert_eq!(out[16], kind_code(PieceKind::Mono));
        assert_eq!(out.iter().filter(|&&c| c != 0).count(), 1);
    }

    #[test]
    fn partially_cleared_group_keeps_remaining_cells() {
        let mut g = grid();
        let partial: Vec<Cell> = (0..6).map(|c| Cell::new(c, 0)).collect();
        g.lock(&partial, PieceKind::I).unwrap();
        g.lock(&[Cell::new(6, 0), Cell::new(6, 1)], PieceKind::Domino)
            .unwrap();

        g.check_platform_lines(Platform::Left);
        assert_eq!(g.groups().len(), 1);
        assert_eq!(g.groups()[0].cells(), &[Cell::new(6, 0)]);
    }
}
