//! Terminal balance runner (default binary).
//!
//! Uses crossterm for input and the framebuffer-based renderer in
//! `tui_balance::term`. The optional TCP adapter streams observations to
//! external clients and feeds their intents into the same loop.

use std::cell::Cell;
use std::fs::File;
use std::io::Write;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tracing::{debug, info, warn};

use tui_balance::adapter::{Adapter, InboundPayload, LayoutInfo};
use tui_balance::core::{GameConfig, GameSnapshot, Phase, RandomSpawner, ScoreBoard, Simulation};
use tui_balance::input::{handle_key_event, is_held_key, should_quit, should_start, InputHandler};
use tui_balance::term::{AdapterStatusView, FrameBuffer, GameView, TerminalRenderer, TiltSmoother, Viewport};
use tui_balance::types::{Feedback, TICK_MS};

/// Observations go out at least this often while clients are streaming.
const BROADCAST_EVERY_TICKS: u32 = 6;

fn main() -> Result<()> {
    init_tracing()?;

    let config = GameConfig::from_env();
    config.validate().context("invalid BALANCE_* configuration")?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Logs go to `BALANCE_LOG_PATH`; the terminal belongs to the renderer.
fn init_tracing() -> Result<()> {
    let Some(path) = std::env::var_os("BALANCE_LOG_PATH") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {path:?}"))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .compact()
            .init();
    }
    Ok(())
}

fn seed_from_env() -> u32 {
    std::env::var("BALANCE_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
}

/// A fresh idle round. The reload hook flags that the next start must rebuild.
fn new_round(config: GameConfig, seed: u32, reload_requested: &Rc<Cell<bool>>) -> Result<Simulation> {
    let reload = Rc::clone(reload_requested);
    let sim = Simulation::builder(config)
        .spawner(RandomSpawner::new(seed, &config))
        .score_keeper(ScoreBoard::new())
        .feedback(|signal: Feedback| {
            debug!(?signal, "feedback");
            if matches!(signal, Feedback::BlockedMove | Feedback::SwitchRejected) {
                // Terminal bell as the "can't move" cue.
                let mut out = std::io::stdout();
                let _ = out.write_all(b"\x07");
                let _ = out.flush();
            }
        })
        .reload_hook(move || reload.set(true))
        .build()?;
    info!(seed, "new round");
    Ok(sim)
}

struct Runner {
    config: GameConfig,
    sim: Simulation,
    input: InputHandler,
    adapter: Option<Adapter>,
    reload_requested: Rc<Cell<bool>>,
    snap: GameSnapshot,
    tilt: TiltSmoother,
    ticks: u32,
}

impl Runner {
    fn on_key_press(&mut self, key: KeyEvent) -> Result<()> {
        if self.sim.phase() != Phase::Running {
            if should_start(key) {
                self.start_round()?;
            }
            return Ok(());
        }

        if is_held_key(key.code) {
            if let Some(intent) = self.input.handle_key_press(key.code) {
                self.sim.apply_intent(intent);
            }
        } else if let Some(intent) = handle_key_event(key) {
            self.sim.apply_intent(intent);
        }
        Ok(())
    }

    fn start_round(&mut self) -> Result<()> {
        if self.reload_requested.replace(false) || self.sim.phase() == Phase::GameOver {
            self.sim = new_round(self.config, seed_from_env(), &self.reload_requested)?;
        }
        self.input.reset();
        self.tilt.snap_to(0.0);
        if let Err(failure) = self.sim.start() {
            // Same as a blocked spawn mid-round: game over, Enter rebuilds.
            warn!(%failure, "round over on its first spawn");
        }
        Ok(())
    }

    fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        let mut changed = false;

        for intent in self.input.update(TICK_MS) {
            changed |= self.sim.apply_intent(intent);
        }
        changed |= self.poll_adapter();

        match self.sim.tick(TICK_MS) {
            Ok(outcome) => changed |= outcome.dropped || outcome.locked.is_some(),
            Err(failure) => {
                info!(%failure, score = self.sim.score(), "round over");
                if let Some(intent) = self.input.reset() {
                    self.sim.apply_intent(intent);
                }
                changed = true;
            }
        }
        self.tilt.update(self.sim.tilt(), TICK_MS);

        if changed || self.ticks % BROADCAST_EVERY_TICKS == 0 {
            if let Some(adapter) = self.adapter.as_mut() {
                self.sim.snapshot_into(&mut self.snap);
                adapter.broadcast_snapshot(&self.snap);
            }
        }
    }

    /// Apply queued adapter commands. Returns whether any intent changed the game.
    fn poll_adapter(&mut self) -> bool {
        let Some(adapter) = self.adapter.as_mut() else {
            return false;
        };
        let mut changed = false;
        while let Some(cmd) = adapter.try_recv() {
            match cmd.payload {
                InboundPayload::Intents(intents) => {
                    let applied = intents.into_iter().filter(|&i| self.sim.apply_intent(i)).count();
                    changed |= applied > 0;
                    adapter.ack(cmd.client_id, cmd.seq, applied);
                }
                InboundPayload::SnapshotRequest => {
                    self.sim.snapshot_into(&mut self.snap);
                    adapter.send_snapshot(cmd.client_id, &self.snap);
                }
            }
        }
        changed
    }

    fn adapter_status(&self) -> Option<AdapterStatusView> {
        self.adapter.as_ref().map(|a| AdapterStatusView {
            enabled: true,
            client_count: a.client_count().min(u16::MAX as usize) as u16,
            streaming_count: a.streaming_count().min(u16::MAX as usize) as u16,
        })
    }
}

fn run(term: &mut TerminalRenderer, config: GameConfig) -> Result<()> {
    let reload_requested = Rc::new(Cell::new(false));
    let sim = new_round(config, seed_from_env(), &reload_requested)?;

    let layout = LayoutInfo::from_snapshot(&sim.snapshot());
    let adapter = match Adapter::start_from_env(layout) {
        Ok(adapter) => adapter,
        Err(e) => {
            warn!(error = %e, "adapter unavailable, continuing without it");
            None
        }
    };

    let mut runner = Runner {
        config,
        sim,
        input: InputHandler::new(),
        adapter,
        reload_requested,
        snap: GameSnapshot::default(),
        tilt: TiltSmoother::new(),
        ticks: 0,
    };

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        runner.sim.snapshot_into(&mut runner.snap);
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let status = runner.adapter_status();
        view.render_into(&runner.snap, &runner.tilt, status.as_ref(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press => {
                        if should_quit(key) {
                            return Ok(());
                        }
                        runner.on_key_press(key)?;
                    }
                    KeyEventKind::Repeat => {
                        // Refreshes the held-key timer; the move cooldown paces repeats.
                        if is_held_key(key.code) {
                            runner.input.handle_key_press(key.code);
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(intent) = runner.input.handle_key_release(key.code) {
                            runner.sim.apply_intent(intent);
                        }
                    }
                },
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            runner.tick();
        }
    }
}
