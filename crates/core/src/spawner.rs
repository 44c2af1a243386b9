//! Default spawner - uniform random block-groups at the platform spawn point

use crate::config::GameConfig;
use crate::piece::Piece;
use crate::pieces::spawn_rotation;
use crate::ports::Spawner;
use crate::rng::SimpleRng;
use crate::types::{Cell, PieceKind, Platform};

/// Picks uniformly from a catalog with a seeded [`SimpleRng`].
#[derive(Debug, Clone)]
pub struct RandomSpawner {
    rng: SimpleRng,
    catalog: Vec<PieceKind>,
    left_col: i8,
    right_col: i8,
    row: i8,
}

impl RandomSpawner {
    /// Spawner over the full catalog
    pub fn new(seed: u32, config: &GameConfig) -> Self {
        Self::with_catalog(seed, config, &PieceKind::ALL)
    }

    /// Spawner restricted to `catalog`. An empty catalog falls back to
    /// single cells so spawning never fails for lack of shapes.
    pub fn with_catalog(seed: u32, config: &GameConfig, catalog: &[PieceKind]) -> Self {
        let catalog = if catalog.is_empty() {
            vec![PieceKind::Mono]
        } else {
            catalog.to_vec()
        };
        Self {
            rng: SimpleRng::new(seed),
            catalog,
            left_col: config.left_spawn_col,
            right_col: config.right_spawn_col,
            row: config.spawn_row,
        }
    }

    fn draw(&mut self) -> PieceKind {
        self.rng.pick(&self.catalog).unwrap_or(PieceKind::Mono)
    }
}

impl Spawner for RandomSpawner {
    fn spawn_next(&mut self, platform: Platform) -> Piece {
        let kind = self.draw();
        let col = match platform {
            Platform::Left => self.left_col,
            Platform::Right => self.right_col,
        };
        Piece::new(kind, spawn_rotation(kind), Cell::new(col, self.row), platform)
    }
}

/// Replays a fixed sequence of kinds, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequenceSpawner {
    kinds: Vec<PieceKind>,
    cursor: usize,
    left_col: i8,
    right_col: i8,
    row: i8,
}

impl SequenceSpawner {
    pub fn new(kinds: &[PieceKind], config: &GameConfig) -> Self {
        Self {
            kinds: if kinds.is_empty() {
                vec![PieceKind::Mono]
            } else {
                kinds.to_vec()
            },
            cursor: 0,
            left_col: config.left_spawn_col,
            right_col: config.right_spawn_col,
            row: config.spawn_row,
        }
    }
}

impl Spawner for SequenceSpawner {
    fn spawn_next(&mut self, platform: Platform) -> Piece {
        let kind = self.kinds[self.cursor % self.kinds.len()];
        self.cursor = self.cursor.wrapping_add(1);
        let col = match platform {
            Platform::Left => self.left_col,
            Platform::Right => self.right_col,
        };
        Piece::new(kind, spawn_rotation(kind), Cell::new(col, self.row), platform)
    }
}
