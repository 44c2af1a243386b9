//! Game configuration
//!
//! Defaults mirror the balance scene: a 26x17 grid, left platform `0..=6`,
//! right platform `16..=25`. Any field can be overridden through `BALANCE_*`
//! environment variables. The simulation builder always runs [`GameConfig::validate`]
//! so a bad layout fails before the first tick.

use std::env;

use tracing::warn;

use crate::error::ConfigError;
use crate::pieces::{get_shape, spawn_rotation};
use crate::types::*;

/// Board geometry: two platforms separated by a gap, sharing one height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformLayout {
    pub left: ColumnRange,
    pub right: ColumnRange,
    pub height: i8,
}

impl PlatformLayout {
    pub fn range(&self, platform: Platform) -> ColumnRange {
        match platform {
            Platform::Left => self.left,
            Platform::Right => self.right,
        }
    }

    /// Grid width: one past the right platform's last column. [`validate`]
    /// keeps that column representable.
    ///
    /// [`validate`]: PlatformLayout::validate
    pub fn width(&self) -> i8 {
        self.right.end.saturating_add(1)
    }

    /// Platform owning `col`, or `None` for the gap and anything outside.
    pub fn platform_of(&self, col: i8) -> Option<Platform> {
        if self.left.contains(col) {
            Some(Platform::Left)
        } else if self.right.contains(col) {
            Some(Platform::Right)
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height <= 0 {
            return Err(ConfigError::NonPositiveHeight(self.height));
        }
        for (name, r) in [("left", self.left), ("right", self.right)] {
            if r.is_empty() || r.start < 0 {
                return Err(ConfigError::InvalidPlatform {
                    name,
                    start: r.start,
                    end: r.end,
                });
            }
        }
        if self.right.end == i8::MAX {
            return Err(ConfigError::PlatformPastGridLimit { end: self.right.end });
        }
        if self.left.overlaps(self.right) {
            return Err(ConfigError::PlatformsOverlap {
                left: self.left,
                right: self.right,
            });
        }
        if self.left.is_adjacent(self.right) {
            return Err(ConfigError::PlatformsAdjacent {
                left: self.left,
                right: self.right,
            });
        }
        if self.left.start > self.right.start {
            return Err(ConfigError::PlatformsOutOfOrder {
                left: self.left,
                right: self.right,
            });
        }
        Ok(())
    }
}

impl Default for PlatformLayout {
    fn default() -> Self {
        Self {
            left: DEFAULT_LEFT_PLATFORM,
            right: DEFAULT_RIGHT_PLATFORM,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Complete tunable configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub layout: PlatformLayout,
    pub platform_offset: i8,
    pub left_spawn_col: i8,
    pub right_spawn_col: i8,
    pub spawn_row: i8,
    pub gravity_base_unit_ms: u32,
    pub soft_drop_timestep_ms: u32,
    pub move_cooldown_ms: u32,
    pub balance_threshold: f32,
    pub balance_unit_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            layout: PlatformLayout::default(),
            platform_offset: DEFAULT_PLATFORM_OFFSET,
            left_spawn_col: DEFAULT_LEFT_SPAWN_COL,
            right_spawn_col: DEFAULT_RIGHT_SPAWN_COL,
            spawn_row: DEFAULT_SPAWN_ROW,
            gravity_base_unit_ms: GRAVITY_BASE_UNIT_MS,
            soft_drop_timestep_ms: SOFT_DROP_TIMESTEP_MS,
            move_cooldown_ms: MOVE_COOLDOWN_MS,
            balance_threshold: DEFAULT_BALANCE_THRESHOLD,
            balance_unit_ms: BALANCE_UNIT_MS,
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with `BALANCE_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning and keep the default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            layout: PlatformLayout {
                left: ColumnRange::new(
                    env_or("BALANCE_LEFT_START", d.layout.left.start),
                    env_or("BALANCE_LEFT_END", d.layout.left.end),
                ),
                right: ColumnRange::new(
                    env_or("BALANCE_RIGHT_START", d.layout.right.start),
                    env_or("BALANCE_RIGHT_END", d.layout.right.end),
                ),
                height: env_or("BALANCE_HEIGHT", d.layout.height),
            },
            platform_offset: env_or("BALANCE_PLATFORM_OFFSET", d.platform_offset),
            left_spawn_col: env_or("BALANCE_LEFT_SPAWN_COL", d.left_spawn_col),
            right_spawn_col: env_or("BALANCE_RIGHT_SPAWN_COL", d.right_spawn_col),
            spawn_row: env_or("BALANCE_SPAWN_ROW", d.spawn_row),
            gravity_base_unit_ms: env_or("BALANCE_GRAVITY_UNIT_MS", d.gravity_base_unit_ms),
            soft_drop_timestep_ms: env_or("BALANCE_SOFT_DROP_MS", d.soft_drop_timestep_ms),
            move_cooldown_ms: env_or("BALANCE_MOVE_COOLDOWN_MS", d.move_cooldown_ms),
            balance_threshold: env_or("BALANCE_THRESHOLD", d.balance_threshold),
            balance_unit_ms: env_or("BALANCE_UNIT_MS", d.balance_unit_ms),
        }
    }

    pub fn spawn_col(&self, platform: Platform) -> i8 {
        match platform {
            Platform::Left => self.left_spawn_col,
            Platform::Right => self.right_spawn_col,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        if self.platform_offset <= 0 {
            return Err(ConfigError::NonPositiveOffset(self.platform_offset));
        }
        for (name, platform) in [("left", Platform::Left), ("right", Platform::Right)] {
            let col = self.spawn_col(platform);
            if !self.layout.range(platform).contains(col) {
                return Err(ConfigError::SpawnColumnOutsidePlatform { name, col });
            }
        }
        if self.spawn_row < 0 || self.spawn_row >= self.layout.height {
            return Err(ConfigError::SpawnRowOutOfRange {
                row: self.spawn_row,
                height: self.layout.height,
            });
        }
        for (name, platform) in [("left", Platform::Left), ("right", Platform::Right)] {
            self.check_spawn_footprint(name, platform)?;
        }
        for (name, ms) in [
            ("gravity base unit", self.gravity_base_unit_ms),
            ("soft drop timestep", self.soft_drop_timestep_ms),
            ("balance unit", self.balance_unit_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        if !(0.0..=1.0).contains(&self.balance_threshold) {
            return Err(ConfigError::InvalidThreshold(self.balance_threshold));
        }
        Ok(())
    }

    /// Every catalog kind must fit on the platform in its spawn orientation,
    /// otherwise the first spawn there always fails.
    fn check_spawn_footprint(&self, name: &'static str, platform: Platform) -> Result<(), ConfigError> {
        let range = self.layout.range(platform);
        let anchor = Cell::new(self.spawn_col(platform), self.spawn_row);
        for kind in PieceKind::ALL {
            for &(dc, dr) in get_shape(kind, spawn_rotation(kind)) {
                let cell = anchor.offset(dc, dr);
                if !range.contains(cell.col) || cell.row < 0 || cell.row >= self.layout.height {
                    return Err(ConfigError::SpawnFootprintOutOfRange { name, kind, cell });
                }
            }
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %raw, "ignoring unparseable config override");
                default
            }
        },
        Err(_) => default,
    }
}
