//! Integration tests for the main game loop

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tui_balance::core::{
    GameConfig, Phase, RandomSpawner, ScoreBoard, SequenceSpawner, Simulation,
};
use tui_balance::input::InputHandler;
use tui_balance::types::{Feedback, Intent, PieceKind, Platform, TICK_MS};

fn mono_sim() -> Simulation {
    let config = GameConfig::default();
    Simulation::builder(config)
        .spawner(SequenceSpawner::new(&[PieceKind::Mono], &config))
        .score_keeper(ScoreBoard::new())
        .build()
        .unwrap()
}

#[test]
fn unattended_round_ends_once_and_reloads_once() {
    let config = GameConfig::default();
    let reloads = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&reloads);
    let mut sim = Simulation::builder(config)
        .spawner(RandomSpawner::new(7, &config))
        .score_keeper(ScoreBoard::new())
        .reload_hook(move || counter.set(counter.get() + 1))
        .build()
        .unwrap();

    sim.start().unwrap();
    sim.apply_intent(Intent::SoftDropHeld(true));

    // Nothing ever leaves the left platform's middle columns, so the stack
    // reaches the spawn row without clearing a line.
    let mut failures = 0;
    for _ in 0..200_000 {
        if sim.tick(TICK_MS).is_err() {
            failures += 1;
        }
        if sim.is_game_over() {
            break;
        }
    }
    assert!(sim.is_game_over());
    assert_eq!(failures, 1);
    assert_eq!(reloads.get(), 1);
    assert!(sim.active().is_none());
    assert_eq!(sim.grid().platform_count(Platform::Right), 0);
    assert!(sim.tilt() > 0.9, "left-heavy board should tilt left, got {}", sim.tilt());

    // A finished round stays finished.
    let score = sim.score();
    for _ in 0..100 {
        assert!(sim.tick(TICK_MS).is_ok());
    }
    assert!(!sim.apply_intent(Intent::MoveLeft));
    assert_eq!(sim.score(), score);
    assert_eq!(reloads.get(), 1);
}

#[test]
fn alternating_platforms_stays_balanced_and_earns_bonuses() {
    let mut sim = mono_sim();
    sim.start().unwrap();

    let mut locks = 0;
    let mut ticks = 0;
    while locks < 10 {
        let outcome = sim.tick(TICK_MS).unwrap();
        ticks += 1;
        assert!(ticks < 20_000, "pieces stopped locking");
        if outcome.locked.is_some() {
            locks += 1;
            // New pieces spawn on the platform that just locked; send them across.
            assert!(sim.apply_intent(Intent::SwitchPlatform));
        }
    }

    assert_eq!(sim.grid().platform_count(Platform::Left), 5);
    assert_eq!(sim.grid().platform_count(Platform::Right), 5);
    assert_eq!(sim.tilt(), 0.0);
    assert_eq!(sim.lines(), 0);
    assert!(sim.score() >= 10, "no balance bonus after {ticks} ticks");
    assert_eq!(sim.score() % 10, 0);
}

#[test]
fn lopsided_board_earns_nothing() {
    let mut sim = mono_sim();
    sim.start().unwrap();

    // Lock a single block on the left, then keep the next piece falling.
    while sim.tick(TICK_MS).unwrap().locked.is_none() {}
    let after_first_lock = sim.score();
    for _ in 0..(3000 / TICK_MS) {
        sim.tick(TICK_MS).unwrap();
    }
    assert_eq!(sim.grid().platform_count(Platform::Left), 1);
    assert_eq!(sim.tilt(), 1.0);
    assert_eq!(sim.score(), after_first_lock);
    assert_eq!(sim.balance().accumulator_ms(), 0);
}

#[test]
fn held_key_input_drives_the_active_piece() {
    let mut sim = mono_sim();
    sim.start().unwrap();
    let mut input = InputHandler::new().with_key_release_timeout_ms(10_000);

    use crossterm::event::KeyCode;
    let intent = input.handle_key_press(KeyCode::Left).unwrap();
    assert!(sim.apply_intent(intent));
    assert_eq!(sim.active().unwrap().anchor().col, 1);

    // Held past the repeat delay: one more step once the cooldown allows it.
    let mut moved = 0;
    for _ in 0..20 {
        for intent in input.update(TICK_MS) {
            if sim.apply_intent(intent) {
                moved += 1;
            }
        }
        sim.tick(TICK_MS).unwrap();
    }
    assert_eq!(moved, 1);
    assert_eq!(sim.active().unwrap().anchor().col, 0);

    let release = input.handle_key_release(KeyCode::Left);
    assert!(release.is_none());
    assert!(input.update(TICK_MS).is_empty());
}

#[test]
fn feedback_reaches_the_collaborator() {
    let config = GameConfig::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let mut sim = Simulation::builder(config)
        .spawner(SequenceSpawner::new(&[PieceKind::I], &config))
        .score_keeper(ScoreBoard::new())
        .feedback(move |f: Feedback| sink.borrow_mut().push(f))
        .build()
        .unwrap();
    sim.start().unwrap();

    // The I bar spans columns 2..=5 and column 6 ends the left platform.
    assert!(sim.apply_intent(Intent::MoveRight));
    for _ in 0..(config.move_cooldown_ms / TICK_MS + 1) {
        sim.tick(TICK_MS).unwrap();
    }
    assert!(!sim.apply_intent(Intent::MoveRight));
    assert_eq!(log.borrow().as_slice(), &[Feedback::BlockedMove]);
}

#[test]
fn game_phase_lifecycle() {
    let mut sim = mono_sim();
    assert_eq!(sim.phase(), Phase::Idle);
    assert!(sim.tick(TICK_MS).unwrap().locked.is_none());
    sim.start().unwrap();
    assert_eq!(sim.phase(), Phase::Running);
    let anchor = sim.active().unwrap().anchor();
    sim.start().unwrap();
    assert_eq!(sim.active().unwrap().anchor(), anchor);
}
