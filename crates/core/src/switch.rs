//! Platform switch controller
//!
//! Moves the active piece across the gap as one trial: shift the anchor by
//! `±offset`, flip the platform, validate through the grid, then commit both
//! or neither.

use tracing::debug;

use crate::grid::Grid;
use crate::piece::Piece;
use crate::ports::FeedbackSink;
use crate::types::Feedback;

/// Try to move `piece` to the opposite platform.
///
/// On success position and platform change together. On failure the piece is
/// left untouched and `SwitchRejected` is signalled.
pub fn attempt_switch(
    piece: &mut Piece,
    grid: &Grid,
    offset: i8,
    feedback: &mut dyn FeedbackSink,
) -> bool {
    let proposal = piece.propose_switch(offset);
    match grid.validate_placement(proposal.cells()) {
        Ok(()) => {
            piece.commit(proposal);
            true
        }
        Err(reason) => {
            debug!(%reason, from = piece.platform().as_str(), "platform switch rejected");
            feedback.signal(Feedback::SwitchRejected);
            false
        }
    }
}
