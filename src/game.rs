//! Match state machine: placement, battle, and the end of the match.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::{
    airplane::{Airplane, Orientation},
    common::{Coord, PlacementError, ShotError, ShotResult},
    config::{PlayerConfig, MAX_AIRPLANES},
    grid::{Cell, OwnGrid, PieceColor, TargetGrid},
    ledger::{MergeReport, ShotLedger},
    protocol::{GameStateMessage, PlacementStatus, Update},
    renderer::{CellView, Preview},
    stats::MatchStats,
    victory::{Outcome, VictoryDetector},
};

/// Stage of the match. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Placement,
    Battle,
    Ended,
}

/// Who may fire next. Only meaningful during battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Me,
    Opponent,
}

/// Observable changes caused by one server update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateEffects {
    /// The update arrived after the match ended and was not applied.
    pub ignored: bool,
    pub phase_changed: bool,
    pub merged: MergeReport,
    /// Opponent shots seen for the first time, with the marker for our grid.
    pub new_opponent_shots: Vec<(Coord, ShotResult)>,
    /// Set only on the update that ends the match.
    pub outcome: Option<Outcome>,
}

/// All state of one match, owned by a single client.
///
/// Created fresh per match and reset in one step on restart; grids, ledger
/// and stats never outlive it.
#[derive(Debug, Clone)]
pub struct GameSession {
    player: PlayerConfig,
    phase: Phase,
    turn: Option<Turn>,
    orientation: Orientation,
    own: OwnGrid,
    target: TargetGrid,
    heads: Vec<Coord>,
    opponent_shots: BTreeSet<Coord>,
    ledger: ShotLedger,
    stats: MatchStats,
    victory: VictoryDetector,
    heads_hit: u32,
    opponent_heads_hit: u32,
    placement_status: Option<PlacementStatus>,
    notice: Option<String>,
    rng: SmallRng,
}

impl GameSession {
    /// Create a session in the placement phase with an empty grid.
    pub fn new(player: PlayerConfig) -> Self {
        let mut seed_rng = rand::rng();
        Self::with_rng(player, SmallRng::from_rng(&mut seed_rng))
    }

    /// Like [`GameSession::new`] with reproducible airplane colours.
    pub fn with_seed(player: PlayerConfig, seed: u64) -> Self {
        Self::with_rng(player, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(player: PlayerConfig, rng: SmallRng) -> Self {
        Self {
            player,
            phase: Phase::Placement,
            turn: None,
            orientation: Orientation::default(),
            own: OwnGrid::new(),
            target: TargetGrid::new(),
            heads: Vec::new(),
            opponent_shots: BTreeSet::new(),
            ledger: ShotLedger::new(),
            stats: MatchStats::new(),
            victory: VictoryDetector::new(),
            heads_hit: 0,
            opponent_heads_hit: 0,
            placement_status: None,
            notice: None,
            rng,
        }
    }

    /// Start over with the same player configuration.
    pub fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Self::with_rng(self.player.clone(), rng);
        info!("session reset");
    }

    pub fn player(&self) -> &PlayerConfig {
        &self.player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Option<Turn> {
        self.turn
    }

    pub fn is_my_turn(&self) -> bool {
        self.phase == Phase::Battle && self.turn == Some(Turn::Me)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn own_grid(&self) -> &OwnGrid {
        &self.own
    }

    pub fn target_grid(&self) -> &TargetGrid {
        &self.target
    }

    pub fn ledger(&self) -> &ShotLedger {
        &self.ledger
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    /// Our head cells, in placement order.
    pub fn heads(&self) -> &[Coord] {
        &self.heads
    }

    pub fn planes_placed(&self) -> usize {
        self.heads.len()
    }

    pub fn opponent_shots(&self) -> &BTreeSet<Coord> {
        &self.opponent_shots
    }

    pub fn heads_hit(&self) -> u32 {
        self.heads_hit
    }

    pub fn opponent_heads_hit(&self) -> u32 {
        self.opponent_heads_hit
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.victory.outcome()
    }

    fn placement_open(&self) -> Result<(), PlacementError> {
        if self.phase != Phase::Placement {
            return Err(PlacementError::WrongPhase);
        }
        if self.heads.len() >= MAX_AIRPLANES {
            return Err(PlacementError::AllPlaced);
        }
        Ok(())
    }

    /// Non-committing placement check for hover feedback.
    ///
    /// Runs the same legality check as [`GameSession::place_airplane`].
    pub fn preview(&self, anchor: Coord) -> Option<Preview> {
        self.placement_open().ok()?;
        let plane = Airplane::new(anchor, self.orientation);
        Some(Preview {
            cells: plane.in_bounds_cells().collect(),
            valid: self.own.is_legal(&plane),
        })
    }

    /// Place an airplane with its head at `anchor`, using the selected orientation.
    pub fn place_airplane(&mut self, anchor: Coord) -> Result<Airplane, PlacementError> {
        let plane = Airplane::new(anchor, self.orientation);
        self.place(plane)?;
        Ok(plane)
    }

    /// Commit an already built airplane.
    pub fn place(&mut self, plane: Airplane) -> Result<(), PlacementError> {
        self.placement_open()?;
        let color = PieceColor::random(&mut self.rng);
        self.own.place(&plane, color)?;
        self.heads.push(plane.head());
        self.notice = None;
        info!(
            "placed airplane {}/{} at {} facing {}",
            self.heads.len(),
            MAX_AIRPLANES,
            plane.head(),
            plane.orientation()
        );
        Ok(())
    }

    /// Place one airplane at a random legal spot.
    pub fn auto_place(&mut self) -> Result<Airplane, PlacementError> {
        self.placement_open()?;
        let plane = self.own.random_placement(&mut self.rng, None)?;
        self.place(plane)?;
        Ok(plane)
    }

    /// Fire at `target`. Accepted only on our turn during battle and on a
    /// cell not fired upon before. Hands the turn to the opponent until the
    /// server says otherwise.
    pub fn fire(&mut self, target: Coord) -> Result<(), ShotError> {
        if !target.in_bounds() {
            return Err(ShotError::OutOfBounds);
        }
        if self.phase != Phase::Battle {
            return Err(ShotError::WrongPhase);
        }
        if self.turn != Some(Turn::Me) {
            return Err(ShotError::NotYourTurn);
        }
        if !self.target.mark_shot(target) {
            return Err(ShotError::AlreadyShot);
        }
        self.stats.record_shot();
        self.turn = Some(Turn::Opponent);
        self.notice = None;
        debug!("fired at {}", target);
        Ok(())
    }

    /// Toggle a flag on an unshot target cell; returns the new flag state.
    pub fn toggle_flag(&mut self, target: Coord) -> Result<bool, ShotError> {
        if !target.in_bounds() {
            return Err(ShotError::OutOfBounds);
        }
        if self.phase == Phase::Placement {
            return Err(ShotError::WrongPhase);
        }
        self.target.toggle_flag(target).ok_or(ShotError::AlreadyShot)
    }

    /// Apply a server update. Server values win over local guesses.
    pub fn apply_update(&mut self, update: &Update) -> UpdateEffects {
        let mut fx = UpdateEffects::default();
        if self.phase == Phase::Ended {
            debug!("match already ended; ignoring update");
            fx.ignored = true;
            return fx;
        }

        self.notice = update.message.clone();
        if let Some(status) = update.placement_status {
            self.placement_status = Some(status);
        }

        match (self.phase, update.placement_phase) {
            (Phase::Placement, Some(false)) => {
                self.phase = Phase::Battle;
                fx.phase_changed = true;
                info!("placement finished, battle begins");
            }
            (Phase::Battle, Some(true)) => {
                warn!("server reported placement phase during battle; keeping battle");
            }
            _ => {}
        }

        if self.phase == Phase::Battle {
            if let Some(mine) = update.your_turn {
                let turn = if mine { Turn::Me } else { Turn::Opponent };
                if self.turn.is_some() && self.turn != Some(turn) {
                    debug!("server turn {:?} replaces local {:?}", turn, self.turn);
                }
                self.turn = Some(turn);
            } else if self.turn.is_none() {
                self.turn = Some(Turn::Opponent);
            }
        }

        fx.merged = self.ledger.merge(update.shot_results());
        self.stats.record_hits(fx.merged.new_hits);

        for at in update.opponent_shots() {
            if self.opponent_shots.insert(at) {
                fx.new_opponent_shots.push((at, self.marker_for_opponent_shot(at)));
            }
        }

        self.heads_hit = update.heads_hit;
        self.opponent_heads_hit = update.opponent_heads_hit;

        if self.phase == Phase::Battle {
            if let Some(outcome) = self.victory.observe(self.heads_hit, self.opponent_heads_hit) {
                info!("match over: {:?}", outcome);
                self.phase = Phase::Ended;
                self.turn = None;
                fx.phase_changed = true;
                fx.outcome = Some(outcome);
            }
        }
        fx
    }

    /// How an opponent shot on our grid should be marked.
    fn marker_for_opponent_shot(&self, at: Coord) -> ShotResult {
        if self.heads.contains(&at) {
            ShotResult::Head
        } else if self.own.cell(at) != Cell::Empty {
            ShotResult::Hit
        } else {
            ShotResult::Miss
        }
    }

    pub fn own_view(&self, at: Coord) -> CellView {
        if self.opponent_shots.contains(&at) {
            return CellView::Shot(self.marker_for_opponent_shot(at));
        }
        match self.own.cell(at) {
            Cell::Empty => CellView::Empty,
            Cell::Piece(color) => CellView::Piece(color),
        }
    }

    pub fn target_view(&self, at: Coord) -> CellView {
        if self.target.is_shot(at) {
            CellView::Shot(self.ledger.result_or_miss(at))
        } else if self.target.is_flagged(at) {
            CellView::Flag
        } else {
            CellView::Empty
        }
    }

    /// Status line for the current state.
    pub fn status_text(&self) -> String {
        if self.phase != Phase::Ended {
            if let Some(notice) = &self.notice {
                return notice.clone();
            }
        }
        match self.phase {
            Phase::Placement => {
                let status = self.placement_status.unwrap_or_default();
                let mine = if status.your_planes > 0 {
                    status.your_planes
                } else {
                    self.heads.len()
                };
                if mine < MAX_AIRPLANES {
                    format!("Place your planes: {}/{}", mine, MAX_AIRPLANES)
                } else if status.opponent_planes < MAX_AIRPLANES {
                    "Waiting for opponent to finish placing planes...".to_string()
                } else {
                    "Game starting...".to_string()
                }
            }
            Phase::Battle => match self.turn {
                Some(Turn::Me) => "Your turn!".to_string(),
                _ => "Opponent's turn...".to_string(),
            },
            Phase::Ended => match self.victory.outcome() {
                Some(Outcome::Win) => "You win!".to_string(),
                _ => "Opponent wins!".to_string(),
            },
        }
    }

    /// Full state snapshot for the server.
    pub fn outbound(&self) -> GameStateMessage {
        GameStateMessage {
            grid: self.own.snapshot(),
            shots: self.target.snapshot(),
            head_positions: self.heads.clone(),
        }
    }
}
