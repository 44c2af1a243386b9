use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_balance::core::{
    attempt_switch, GameConfig, GameSnapshot, Grid, NoFeedback, Piece, RandomSpawner, ScoreBoard,
    Simulation,
};
use tui_balance::types::{Cell, Intent, PieceKind, Platform, Rotation};

fn new_sim() -> Simulation {
    let config = GameConfig::default();
    let mut sim = Simulation::builder(config)
        .spawner(RandomSpawner::new(12345, &config))
        .score_keeper(ScoreBoard::new())
        .build()
        .unwrap();
    sim.start().unwrap();
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut sim = new_sim();

    c.bench_function("sim_tick_16ms", |b| {
        b.iter(|| {
            let _ = sim.tick(black_box(16));
            if sim.is_game_over() {
                sim = new_sim();
            }
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    let config = GameConfig::default();
    c.bench_function("clear_4_lines_right", |b| {
        b.iter(|| {
            let mut grid = Grid::new(config.layout).unwrap();
            for row in 0..4 {
                let cells: Vec<Cell> = config.layout.right.iter().map(|col| Cell::new(col, row)).collect();
                grid.lock(&cells, PieceKind::I).unwrap();
            }
            black_box(grid.check_all_lines());
        })
    });
}

fn bench_switch(c: &mut Criterion) {
    let config = GameConfig::default();
    let grid = Grid::new(config.layout).unwrap();
    let mut piece = Piece::new(PieceKind::T, Rotation::North, Cell::new(2, 10), Platform::Left);

    c.bench_function("switch_platform", |b| {
        b.iter(|| {
            black_box(attempt_switch(&mut piece, &grid, config.platform_offset, &mut NoFeedback));
        })
    });
}

fn bench_apply_intent(c: &mut Criterion) {
    let mut sim = new_sim();

    c.bench_function("apply_rotate", |b| {
        b.iter(|| {
            black_box(sim.apply_intent(Intent::RotateRight));
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let sim = new_sim();
    let mut snap = GameSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            sim.snapshot_into(&mut snap);
            black_box(&snap);
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_switch,
    bench_apply_intent,
    bench_snapshot
);
criterion_main!(benches);
