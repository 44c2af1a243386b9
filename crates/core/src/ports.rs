//! Collaborator seams
//!
//! The simulation reaches everything outside the rules (shape choice, score
//! keeping, audio/UX feedback, scene reload) through these traits. They are
//! handed to [`SimulationBuilder`](crate::simulation::SimulationBuilder) once
//! and never looked up at call time.

use crate::piece::Piece;
use crate::types::{Feedback, Platform};

/// Produces the next active piece
pub trait Spawner {
    /// A piece positioned at the platform's spawn column.
    fn spawn_next(&mut self, platform: Platform) -> Piece;
}

/// Receives scoring events and reports the level that drives gravity.
pub trait ScoreKeeper {
    fn add_points_for_lines(&mut self, count: u32);
    fn add_points_for_balance(&mut self);
    fn level(&self) -> u32;
    fn score(&self) -> u32;
    fn lines(&self) -> u32;
}

/// Fire-and-forget feedback (audio cues, flashes)
pub trait FeedbackSink {
    fn signal(&mut self, feedback: Feedback);
}

/// Called exactly once when the round ends.
pub trait ReloadHook {
    fn reload(&mut self);
}

/// Feedback sink that drops every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn signal(&mut self, _feedback: Feedback) {}
}

/// Reload hook that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReload;

impl ReloadHook for NoReload {
    fn reload(&mut self) {}
}

/// Collects feedback in memory; handy for tests and headless drivers.
#[derive(Debug, Default, Clone)]
pub struct FeedbackLog {
    pub signals: Vec<Feedback>,
}

impl FeedbackSink for FeedbackLog {
    fn signal(&mut self, feedback: Feedback) {
        self.signals.push(feedback);
    }
}

impl<F: FnMut(Feedback)> FeedbackSink for F {
    fn signal(&mut self, feedback: Feedback) {
        self(feedback)
    }
}

impl<F: FnMut()> ReloadHook for F {
    fn reload(&mut self) {
        self()
    }
}
