use tui_balance::core::{GameConfig, ScoreBoard, SequenceSpawner, Simulation};
use tui_balance::term::{
    AdapterStatusView, FrameBuffer, GameView, TerminalRenderer, TiltSmoother, Viewport,
};
use tui_balance::types::{Intent, PieceKind, TICK_MS};

fn running_sim(kind: PieceKind) -> Simulation {
    let config = GameConfig::default();
    let mut sim = Simulation::builder(config)
        .spawner(SequenceSpawner::new(&[kind], &config))
        .score_keeper(ScoreBoard::new())
        .build()
        .unwrap();
    sim.start().unwrap();
    sim
}

fn find(fb: &FrameBuffer, needle: &str) -> Option<(u16, u16)> {
    (0..fb.height()).find_map(|y| {
        let row = fb.row_text(y);
        row.find(needle)
            .map(|byte_idx| (row[..byte_idx].chars().count() as u16, y))
    })
}

fn count(fb: &FrameBuffer, ch: char) -> usize {
    fb.glyphs().iter().filter(|g| g.ch == ch).count()
}

#[test]
fn active_piece_is_drawn_two_chars_wide() {
    let sim = running_sim(PieceKind::O);
    let view = GameView::default();
    let fb = view.render(&sim.snapshot(), &TiltSmoother::new(), Viewport::new(100, 30));
    // O piece: four cells, each 2x1.
    assert_eq!(count(&fb, '█'), 8);
}

#[test]
fn switched_piece_moves_to_the_right_frame() {
    let mut sim = running_sim(PieceKind::Mono);
    let view = GameView::default();
    let vp = Viewport::new(100, 30);

    let before = view.render(&sim.snapshot(), &TiltSmoother::new(), vp);
    let (x_left, _) = find(&before, "█").unwrap();

    assert!(sim.apply_intent(Intent::SwitchPlatform));
    let after = view.render(&sim.snapshot(), &TiltSmoother::new(), vp);
    let (x_right, _) = find(&after, "█").unwrap();

    // 16 columns, 2 chars each.
    assert_eq!(x_right - x_left, 32);
}

#[test]
fn side_panel_shows_score_and_adapter_status() {
    let mut sim = running_sim(PieceKind::Mono);
    // Empty board is balanced; one second earns a bonus.
    for _ in 0..70 {
        sim.tick(TICK_MS).unwrap();
    }
    assert_eq!(sim.score(), 10);

    let view = GameView::default();
    let vp = Viewport::new(100, 30);
    let mut fb = FrameBuffer::new(0, 0);
    let status = AdapterStatusView {
        enabled: true,
        client_count: 2,
        streaming_count: 1,
    };
    view.render_into(&sim.snapshot(), &TiltSmoother::new(), Some(&status), vp, &mut fb);

    let (x, y) = find(&fb, "SCORE").unwrap();
    assert!(fb.row_text(y + 1).contains("10"));
    assert!(find(&fb, "BALANCE").is_some());
    assert!(find(&fb, "ON").is_some());
    assert_eq!(fb.get(x, y).unwrap().ch, 'S');
}

#[test]
fn narrow_terminal_skips_side_panel() {
    let sim = running_sim(PieceKind::Mono);
    let view = GameView::default();
    let (w, h) = view.board_size(&sim.snapshot());
    let fb = view.render(&sim.snapshot(), &TiltSmoother::new(), Viewport::new(w, h));
    assert!(find(&fb, "SCORE").is_none());
    assert_eq!(count(&fb, '█'), 2);
}

#[test]
fn rendered_frame_diffs_are_small() {
    let mut sim = running_sim(PieceKind::Mono);
    let view = GameView::default();
    let vp = Viewport::new(100, 30);
    let tilt = TiltSmoother::new();
    let mut term = TerminalRenderer::with_writer(Vec::new());
    let mut fb = FrameBuffer::new(0, 0);

    view.render_into(&sim.snapshot(), &tilt, None, vp, &mut fb);
    term.draw_swap(&mut fb).unwrap();
    let full = term.stats().last_bytes;

    assert!(sim.apply_intent(Intent::MoveLeft));
    view.render_into(&sim.snapshot(), &tilt, None, vp, &mut fb);
    term.draw_swap(&mut fb).unwrap();
    let stats = term.stats();
    assert!(!stats.last_full);
    assert!(stats.last_bytes > 0);
    assert!(stats.last_bytes < full / 10);
}
