//! Scoring module - default score collaborator
//!
//! Line clears are scored per platform pass with the classic table, and every
//! full unit of sustained balance earns a flat bonus. Both scale with
//! `level + 1`; the level rises every [`LINES_PER_LEVEL`] cleared lines.

use crate::ports::ScoreKeeper;
use crate::types::{BALANCE_BONUS, LINES_PER_LEVEL, LINE_SCORES};

/// Calculate line clear score
/// lines: rows cleared in one platform pass (clamped to 4)
/// level: current level (0-based)
pub fn calculate_line_score(lines: u32, level: u32) -> u32 {
    let idx = (lines as usize).min(LINE_SCORES.len() - 1);
    LINE_SCORES[idx].saturating_mul(level + 1)
}

/// Calculate the bonus for one balanced time unit
pub fn calculate_balance_score(level: u32) -> u32 {
    BALANCE_BONUS.saturating_mul(level + 1)
}

/// Running score, cleared lines and level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    score: u32,
    lines: u32,
    balance_bonuses: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn balance_bonuses(&self) -> u32 {
        self.balance_bonuses
    }
}

impl ScoreKeeper for ScoreBoard {
    fn add_points_for_lines(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        // Points use the level the clear happened at.
        let points = calculate_line_score(count, self.level());
        self.score = self.score.saturating_add(points);
        self.lines = self.lines.saturating_add(count);
    }

    fn add_points_for_balance(&mut self) {
        let points = calculate_balance_score(self.level());
        self.score = self.score.saturating_add(points);
        self.balance_bonuses = self.balance_bonuses.saturating_add(1);
    }

    fn level(&self) -> u32 {
        self.lines / LINES_PER_LEVEL
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn lines(&self) -> u32 {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_scores() {
        assert_eq!(calculate_line_score(0, 0), 0);
        assert_eq!(calculate_line_score(1, 0), 40);
        assert_eq!(calculate_line_score(2, 0), 100);
        assert_eq!(calculate_line_score(3, 0), 300);
        assert_eq!(calculate_line_score(4, 0), 1200);
        assert_eq!(calculate_line_score(1, 1), 80);
        assert_eq!(calculate_line_score(4, 9), 12000);
    }

    #[test]
    fn more_than_four_lines_uses_top_entry() {
        assert_eq!(calculate_line_score(7, 0), 1200);
    }

    #[test]
    fn zero_lines_awards_nothing() {
        let mut board = ScoreBoard::new();
        board.add_points_for_lines(0);
        assert_eq!(ScoreKeeper::score(&board), 0);
        assert_eq!(ScoreKeeper::lines(&board), 0);
    }

    #[test]
    fn level_rises_every_ten_lines() {
        let mut board = ScoreBoard::new();
        for _ in 0..9 {
            board.add_points_for_lines(1);
        }
        assert_eq!(board.level(), 0);
        board.add_points_for_lines(1);
        assert_eq!(board.level(), 1);
        assert_eq!(board.score(), 400);

        board.add_points_for_lines(1);
        assert_eq!(board.score(), 480);
    }

    #[test]
    fn balance_bonus_scales_with_level() {
        let mut board = ScoreBoard::new();
        board.add_points_for_balance();
        assert_eq!(board.score(), 10);
        for _ in 0..5 {
            board.add_points_for_lines(4);
        }
        let before = board.score();
        board.add_points_for_balance();
        assert_eq!(board.score() - before, 30);
        assert_eq!(board.balance_bonuses(), 2);
    }
}
