//! Balance engine - couples the two platforms' occupancy into a tilt value
//!
//! `tilt = (left - right) / max(left + right, 1)`, so an empty board reads as
//! perfectly balanced. While `|tilt|` stays within the threshold the engine
//! accumulates elapsed time and emits a bonus once it reaches a full balance
//! unit, at most one per step; any imbalance drops the accumulator back to zero.

use crate::types::{BALANCE_UNIT_MS, DEFAULT_BALANCE_THRESHOLD};

/// Normalized occupancy imbalance in `[-1, 1]`. Positive leans left.
pub fn tilt_ratio(left_count: usize, right_count: usize) -> f32 {
    let total = (left_count + right_count).max(1) as f32;
    (left_count as f32 - right_count as f32) / total
}

/// Outcome of one balance step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceStep {
    pub tilt: f32,
    pub balanced: bool,
    /// Balance bonuses earned during this step, 0 or 1
    pub bonuses: u32,
}

/// Balanced-time integrator
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEngine {
    threshold: f32,
    unit_ms: u32,
    accumulator_ms: u32,
    tilt: f32,
}

impl BalanceEngine {
    pub fn new(threshold: f32, unit_ms: u32) -> Self {
        Self {
            threshold,
            unit_ms: unit_ms.max(1),
            accumulator_ms: 0,
            tilt: 0.0,
        }
    }

    /// Recompute tilt from the platform counts and integrate `elapsed_ms`.
    pub fn step(&mut self, left_count: usize, right_count: usize, elapsed_ms: u32) -> BalanceStep {
        self.tilt = tilt_ratio(left_count, right_count);
        let balanced = self.tilt.abs() <= self.threshold;

        let mut bonuses = 0;
        if balanced {
            self.accumulator_ms = self.accumulator_ms.saturating_add(elapsed_ms);
            // Each bonus starts a fresh unit.
            if self.accumulator_ms >= self.unit_ms {
                bonuses = 1;
                self.accumulator_ms = 0;
            }
        } else {
            self.accumulator_ms = 0;
        }

        BalanceStep {
            tilt: self.tilt,
            balanced,
            bonuses,
        }
    }

    /// Instantaneous tilt from the last step
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub fn accumulator_ms(&self) -> u32 {
        self.accumulator_ms
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for BalanceEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BALANCE_THRESHOLD, BALANCE_UNIT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilt_boundaries() {
        assert_eq!(tilt_ratio(5, 5), 0.0);
        assert_eq!(tilt_ratio(0, 0), 0.0);
        assert_eq!(tilt_ratio(10, 0), 1.0);
        assert_eq!(tilt_ratio(0, 4), -1.0);
        assert_eq!(tilt_ratio(3, 1), 0.5);
    }

    #[test]
    fn balanced_time_emits_once_per_unit() {
        let mut engine = BalanceEngine::default();
        let mut total = 0;
        // 62 ticks of 16ms = 992ms: not yet a full unit.
        for _ in 0..62 {
            total += engine.step(4, 4, 16).bonuses;
        }
        assert_eq!(total, 0);
        assert_eq!(engine.accumulator_ms(), 992);

        total += engine.step(4, 4, 16).bonuses;
        assert_eq!(total, 1);
        assert_eq!(engine.accumulator_ms(), 0);
    }

    #[test]
    fn sustained_balance_fires_repeatedly() {
        let mut engine = BalanceEngine::default();
        let mut total = 0;
        for _ in 0..10 {
            total += engine.step(0, 0, 250).bonuses;
        }
        assert_eq!(total, 2);
    }

    #[test]
    fn long_step_awards_a_single_bonus() {
        let mut engine = BalanceEngine::default();
        let step = engine.step(3, 3, 3500);
        assert_eq!(step.bonuses, 1);
        assert_eq!(engine.accumulator_ms(), 0);
        assert_eq!(engine.step(3, 3, 999).bonuses, 0);
    }

    #[test]
    fn imbalance_resets_accumulator() {
        let mut engine = BalanceEngine::default();
        engine.step(2, 2, 900);
        assert_eq!(engine.accumulator_ms(), 900);

        let step = engine.step(3, 1, 16);
        assert!(!step.balanced);
        assert_eq!(step.bonuses, 0);
        assert_eq!(engine.accumulator_ms(), 0);

        assert_eq!(engine.step(2, 2, 900).bonuses, 0);
    }

    #[test]
    fn threshold_is_inclusive() {
        // 21 vs 19 -> 2/40 = 0.05
        let mut engine = BalanceEngine::new(0.05, 1000);
        assert!(engine.step(21, 19, 16).balanced);
        assert!(!engine.step(22, 18, 16).balanced);
    }
}
