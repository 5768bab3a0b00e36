//! JSON messages exchanged with the game server.
//!
//! The client pushes its full state after every accepted action; the server
//! answers with `update` messages that the session applies. Inbound decoding
//! never panics and never touches state: a payload that fails to parse is
//! logged and dropped by [`decode`].

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::common::{Coord, ProtocolError, ShotResult};
use crate::config::GRID_SIZE;
use crate::grid::Cell;

/// Full client state, sent after each placement or shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateMessage {
    pub grid: [[Cell; GRID_SIZE]; GRID_SIZE],
    pub shots: [[bool; GRID_SIZE]; GRID_SIZE],
    pub head_positions: Vec<Coord>,
}

impl GameStateMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

/// Airplane counts reported while both players are placing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlacementStatus {
    pub your_planes: usize,
    pub opponent_planes: usize,
}

/// Payload of `update` and `opponent_update`.
///
/// Absent flags mean "unchanged"; absent counters read as zero. Fields the
/// client has no use for, such as `opponent_ready`, are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Update {
    pub placement_phase: Option<bool>,
    pub your_turn: Option<bool>,
    pub shot_results: Option<BTreeMap<String, ShotResult>>,
    pub placement_status: Option<PlacementStatus>,
    pub heads_hit: u32,
    pub opponent_heads_hit: u32,
    pub opponent_shots: Option<Vec<Coord>>,
    /// Free-form notice, e.g. when the opponent drops out.
    pub message: Option<String>,
}

impl Update {
    /// Shot results with valid keys; malformed keys are skipped.
    pub fn shot_results(&self) -> impl Iterator<Item = (Coord, ShotResult)> + '_ {
        self.shot_results
            .iter()
            .flatten()
            .filter_map(|(key, result)| match key.parse::<Coord>() {
                Ok(at) => Some((at, *result)),
                Err(e) => {
                    warn!("skipping shot result: {}", e);
                    None
                }
            })
    }

    /// Opponent shots that land on the grid.
    pub fn opponent_shots(&self) -> impl Iterator<Item = Coord> + '_ {
        self.opponent_shots
            .iter()
            .flatten()
            .copied()
            .filter(Coord::in_bounds)
    }
}

/// Messages sent by the server, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session acknowledged.
    Init {
        #[serde(default)]
        player_id: Option<String>,
        #[serde(default)]
        game_id: Option<String>,
    },
    Update(Update),
    OpponentUpdate(Update),
}

impl ServerMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// The update payload, if this message carries one.
    pub fn update(&self) -> Option<&Update> {
        match self {
            ServerMessage::Update(u) | ServerMessage::OpponentUpdate(u) => Some(u),
            ServerMessage::Init { .. } => None,
        }
    }
}

/// Decode a frame, logging and discarding anything unparseable.
pub fn decode(text: &str) -> Option<ServerMessage> {
    match ServerMessage::from_json(text) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!("dropping server frame: {}", e);
            None
        }
    }
}
