//! Presentation callbacks the engine invokes. The engine never draws anything
//! itself; front ends implement [`Renderer`] and pass it in at construction.

use crate::common::{Coord, ShotResult};
use crate::grid::PieceColor;
use crate::stats::MatchStats;

/// Which grid a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardSide {
    /// The local player's airplanes.
    Own,
    /// The opponent's hidden grid.
    Target,
}

/// What a single cell should look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    Piece(PieceColor),
    Flag,
    Shot(ShotResult),
}

/// Candidate airplane shown while hovering during placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Cells of the candidate that land on the grid.
    pub cells: Vec<Coord>,
    /// Whether placing here would succeed.
    pub valid: bool,
}

pub trait Renderer {
    fn on_cell_state_changed(&mut self, side: BoardSide, at: Coord, state: CellView);

    fn on_status_changed(&mut self, text: &str);

    fn on_score_changed(&mut self, heads_hit: u32, opponent_heads_hit: u32);

    fn on_match_ended(&mut self, did_win: bool, stats: &MatchStats);

    /// `None` clears any preview currently shown.
    fn on_preview(&mut self, _preview: Option<&Preview>) {}
}
