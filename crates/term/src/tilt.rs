//! Visual easing of the balance tilt.
//!
//! The simulation only reports the instantaneous tilt ratio. On screen each
//! platform eases toward a target depth: the heavier platform sinks, the
//! lighter one rises, both by `ratio * weight * max_depth` cells.

/// Fraction of the maximum depth a full tilt reaches
pub const PLATFORM_WEIGHT: f32 = 0.2;

/// Maximum platform travel, in board cells
pub const MAX_PLATFORM_DEPTH: f32 = 5.0;

/// Easing rate per second
pub const EASE_SPEED: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltSmoother {
    /// Displayed tilt ratio
    ratio: f32,
    /// Downward displacement of the left platform in cells (negative rises)
    left_depth: f32,
    right_depth: f32,
    speed: f32,
}

impl TiltSmoother {
    pub fn new() -> Self {
        Self {
            ratio: 0.0,
            left_depth: 0.0,
            right_depth: 0.0,
            speed: EASE_SPEED,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    /// Ease toward `target_ratio` over `elapsed_ms`.
    pub fn update(&mut self, target_ratio: f32, elapsed_ms: u32) {
        let target_ratio = target_ratio.clamp(-1.0, 1.0);
        let t = (elapsed_ms as f32 / 1000.0 * self.speed).min(1.0);

        // Left heavier (positive ratio) sinks the left pan.
        let target_left = target_ratio * PLATFORM_WEIGHT * MAX_PLATFORM_DEPTH;
        let target_right = -target_left;

        self.ratio = lerp(self.ratio, target_ratio, t);
        self.left_depth = lerp(self.left_depth, target_left, t);
        self.right_depth = lerp(self.right_depth, target_right, t);
    }

    /// Jump straight to `ratio`, e.g. on a fresh round.
    pub fn snap_to(&mut self, ratio: f32) {
        let ratio = ratio.clamp(-1.0, 1.0);
        self.ratio = ratio;
        self.left_depth = ratio * PLATFORM_WEIGHT * MAX_PLATFORM_DEPTH;
        self.right_depth = -self.left_depth;
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn left_depth(&self) -> f32 {
        self.left_depth
    }

    pub fn right_depth(&self) -> f32 {
        self.right_depth
    }

    /// Depth of a platform rounded to whole terminal rows (positive = down).
    pub fn row_offset(&self, left: bool, rows_per_cell: u16) -> i16 {
        let depth = if left { self.left_depth } else { self.right_depth };
        (depth * rows_per_cell as f32).round() as i16
    }

    /// Largest row offset [`row_offset`](Self::row_offset) can ever return.
    pub fn max_row_offset(rows_per_cell: u16) -> u16 {
        (PLATFORM_WEIGHT * MAX_PLATFORM_DEPTH * rows_per_cell as f32).ceil() as u16
    }
}

impl Default for TiltSmoother {
    fn default() -> Self {
        Self::new()
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
