//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (simulation, terminal rendering, observation adapter).
//!
//! # Board Layout
//!
//! The board is one grid split into two platforms (the pans of a balance)
//! separated by an unusable gap:
//!
//! - **Width**: 26 columns (indexed 0-25)
//! - **Height**: 17 rows (indexed 0-16, row 0 is the bottom)
//! - **Left platform**: columns 0-6
//! - **Gap**: columns 7-15 (never occupied)
//! - **Right platform**: columns 16-25
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `GRAVITY_BASE_UNIT_MS` | 50 | Gravity step per remaining level |
//! | `SOFT_DROP_TIMESTEP_MS` | 50 | Gravity while soft drop is held |
//! | `MOVE_COOLDOWN_MS` | 100 | Lockout after a lateral move |
//! | `BALANCE_UNIT_MS` | 1000 | Balanced time needed for one bonus |
//!
//! # Examples
//!
//! ```
//! use tui_balance_types::{Intent, Platform, Rotation, DEFAULT_WIDTH, DEFAULT_HEIGHT};
//!
//! assert_eq!(Platform::Left.opposite(), Platform::Right);
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Intent::from_str("switchPlatform"), Some(Intent::SwitchPlatform));
//! assert_eq!(DEFAULT_WIDTH, 26);
//! assert_eq!(DEFAULT_HEIGHT, 17);
//! ```

/// Total board width in columns (right platform end + 1)
pub const DEFAULT_WIDTH: i8 = 26;

/// Board height in rows
pub const DEFAULT_HEIGHT: i8 = 17;

/// Default left platform columns (inclusive)
pub const DEFAULT_LEFT_PLATFORM: ColumnRange = ColumnRange::new(0, 6);

/// Default right platform columns (inclusive)
pub const DEFAULT_RIGHT_PLATFORM: ColumnRange = ColumnRange::new(16, 25);

/// Column distance applied when a piece switches platform
pub const DEFAULT_PLATFORM_OFFSET: i8 = 16;

/// Anchor column for pieces spawned on the left platform
pub const DEFAULT_LEFT_SPAWN_COL: i8 = 2;

/// Anchor column for pieces spawned on the right platform
pub const DEFAULT_RIGHT_SPAWN_COL: i8 = 20;

/// Anchor row for freshly spawned pieces
pub const DEFAULT_SPAWN_ROW: i8 = 14;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity interval per remaining level: `timestep = (10 - level) * unit`
pub const GRAVITY_BASE_UNIT_MS: u32 = 50;

/// Highest level that still shortens the gravity timestep
pub const MAX_GRAVITY_LEVEL: u32 = 9;

/// Gravity interval while soft drop is held
pub const SOFT_DROP_TIMESTEP_MS: u32 = 50;

/// Lateral move lockout
pub const MOVE_COOLDOWN_MS: u32 = 100;

/// Maximum |tilt| still counted as balanced
pub const DEFAULT_BALANCE_THRESHOLD: f32 = 0.05;

/// Balanced time that earns one balance bonus
pub const BALANCE_UNIT_MS: u32 = 1000;

/// Maximum cells in one block-group
pub const MAX_PIECE_CELLS: usize = 4;

/// Line clear scoring table, indexed by lines cleared on one platform (clamped to 4).
///
/// Points are multiplied by (level + 1).
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Points for one full unit of sustained balance, multiplied by (level + 1)
pub const BALANCE_BONUS: u32 = 10;

/// Cleared lines per level
pub const LINES_PER_LEVEL: u32 = 10;


/// A board coordinate. `row` 0 is the bottom row and grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub col: i8,
    pub row: i8,
}

impl Cell {
    pub const fn new(col: i8, row: i8) -> Self {
        Self { col, row }
    }

    /// Shift by `(dcol, drow)`, saturating at the i8 limits.
    pub fn offset(self, dcol: i8, drow: i8) -> Self {
        Self {
            col: self.col.saturating_add(dcol),
            row: self.row.saturating_add(drow),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Inclusive column interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRange {
    pub start: i8,
    pub end: i8,
}

impl ColumnRange {
    pub const fn new(start: i8, end: i8) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, col: i8) -> bool {
        col >= self.start && col <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Number of columns in the range
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end as i16 - self.start as i16 + 1) as usize
        }
    }

    pub fn overlaps(&self, other: ColumnRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.start <= other.end && other.start <= self.end
    }

    /// True when the two ranges touch without a gap column between them.
    pub fn is_adjacent(&self, other: ColumnRange) -> bool {
        self.end as i16 + 1 == other.start as i16 || other.end as i16 + 1 == self.start as i16
    }

    pub fn iter(&self) -> impl Iterator<Item = i8> {
        self.start..=self.end
    }
}

/// One pan of the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Left,
    Right,
}

impl Platform {
    pub fn opposite(&self) -> Self {
        match self {
            Platform::Left => Platform::Right,
            Platform::Right => Platform::Left,
        }
    }

    /// Sign of the column shift when switching away from this platform.
    pub fn switch_direction(&self) -> i8 {
        match self {
            Platform::Left => 1,
            Platform::Right => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Left => "left",
            Platform::Right => "right",
        }
    }
}

/// Block-group kinds in the spawn catalog
///
/// The seven tetrominoes plus two small groups:
/// - **Domino**: two cells side by side
/// - **Mono**: a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
    Domino,
    Mono,
}

impl PieceKind {
    /// Every kind, in catalog order
    pub const ALL: [PieceKind; 9] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::Domino,
        PieceKind::Mono,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::Domino => "domino",
            PieceKind::Mono => "mono",
        }
    }
}

/// Rotation states of a block-group
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// ```
    /// use tui_balance_types::Rotation;
    ///
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Discrete player intents consumed by the simulation
///
/// These are produced by keyboard input and by the observation adapter alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Move the active group one column left
    MoveLeft,
    /// Move the active group one column right
    MoveRight,
    /// Rotate the active group counter-clockwise
    RotateLeft,
    /// Rotate the active group clockwise
    RotateRight,
    /// Move the active group to the other platform
    SwitchPlatform,
    /// Soft drop input pressed (`true`) or released (`false`)
    SoftDropHeld(bool),
}

impl Intent {
    /// Parse intent from its camelCase wire name
    ///
    /// ```
    /// use tui_balance_types::Intent;
    ///
    /// assert_eq!(Intent::from_str("moveLeft"), Some(Intent::MoveLeft));
    /// assert_eq!(Intent::from_str("softDropOn"), Some(Intent::SoftDropHeld(true)));
    /// assert_eq!(Intent::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Intent::MoveLeft),
            "moveright" => Some(Intent::MoveRight),
            "rotateleft" => Some(Intent::RotateLeft),
            "rotateright" => Some(Intent::RotateRight),
            "switchplatform" => Some(Intent::SwitchPlatform),
            "softdropon" => Some(Intent::SoftDropHeld(true)),
            "softdropoff" => Some(Intent::SoftDropHeld(false)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::MoveLeft => "moveLeft",
            Intent::MoveRight => "moveRight",
            Intent::RotateLeft => "rotateLeft",
            Intent::RotateRight => "rotateRight",
            Intent::SwitchPlatform => "switchPlatform",
            Intent::SoftDropHeld(true) => "softDropOn",
            Intent::SoftDropHeld(false) => "softDropOff",
        }
    }

    /// Lateral intents share the move cooldown.
    pub fn is_lateral(&self) -> bool {
        matches!(self, Intent::MoveLeft | Intent::MoveRight)
    }
}

/// Fire-and-forget signals for the audio/feedback collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    BlockedMove,
    SwitchRejected,
    LineCleared(u32),
}
