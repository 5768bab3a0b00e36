//! Common types for the airplane game: coordinates, shot results and errors.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::GRID_SIZE;

/// A cell on either grid, addressed by `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Build a coordinate from signed offsets, or `None` when it falls off the grid.
    pub fn from_signed(row: i32, col: i32) -> Option<Self> {
        let size = GRID_SIZE as i32;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Self::new(row as usize, col as usize))
        } else {
            None
        }
    }

    pub fn in_bounds(&self) -> bool {
        self.row < GRID_SIZE && self.col < GRID_SIZE
    }

    /// Ledger key used on the wire: `"row,col"`.
    pub fn key(&self) -> String {
        format!("{},{}", self.row, self.col)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl From<Coord> for (usize, usize) {
    fn from(c: Coord) -> Self {
        (c.row, c.col)
    }
}

impl FromStr for Coord {
    type Err = ProtocolError;

    /// Parse a `"row,col"` ledger key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ProtocolError::BadKey(s.to_string());
        let (r, c) = s.split_once(',').ok_or_else(bad)?;
        let row = r.trim().parse().map_err(|_| bad())?;
        let col = c.trim().parse().map_err(|_| bad())?;
        let coord = Coord::new(row, col);
        if coord.in_bounds() {
            Ok(coord)
        } else {
            Err(bad())
        }
    }
}

impl fmt::Display for Coord {
    /// Human form, column letter then 1-based row (`A1`..`J10`). Cells past
    /// column `Z` fall back to `(row,col)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = u8::try_from(self.col)
            .ok()
            .filter(|&c| c < 26)
            .map(|c| char::from(b'A' + c));
        match letter {
            Some(col) => write!(f, "{}{}", col, self.row.saturating_add(1)),
            None => write!(f, "({},{})", self.row, self.col),
        }
    }
}

/// Outcome of a shot as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotResult {
    /// Shot landed on an airplane body.
    Hit,
    /// Shot landed on an airplane head.
    Head,
    /// Shot landed on open sky.
    Miss,
}

impl ShotResult {
    /// Hits and heads both count toward accuracy stats.
    pub fn is_hit(&self) -> bool {
        matches!(self, ShotResult::Hit | ShotResult::Head)
    }
}

impl fmt::Display for ShotResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotResult::Hit => write!(f, "hit"),
            ShotResult::Head => write!(f, "head"),
            ShotResult::Miss => write!(f, "miss"),
        }
    }
}

/// Errors returned when placing an airplane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Placement is only allowed during the placement phase.
    WrongPhase,
    /// All airplanes are already on the grid.
    AllPlaced,
    /// At least one cell of the airplane falls outside the grid.
    OutOfBounds,
    /// At least one cell is already occupied by another airplane.
    Overlaps,
    /// Random placement found no legal spot.
    NoLegalPlacement,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::WrongPhase => write!(f, "Airplanes can only be placed during placement"),
            PlacementError::AllPlaced => write!(f, "All airplanes have already been placed"),
            PlacementError::OutOfBounds => write!(f, "Airplane placement is out of bounds"),
            PlacementError::Overlaps => write!(f, "Airplane placement overlaps another airplane"),
            PlacementError::NoLegalPlacement => write!(f, "Unable to find a legal placement"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Errors returned when firing at (or flagging) the opponent grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotError {
    /// Shots are only allowed during battle.
    WrongPhase,
    /// It is the opponent's turn.
    NotYourTurn,
    /// This cell has already been fired upon.
    AlreadyShot,
    /// Target lies outside the grid.
    OutOfBounds,
}

impl fmt::Display for ShotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotError::WrongPhase => write!(f, "Cannot shoot outside of battle"),
            ShotError::NotYourTurn => write!(f, "It is not your turn"),
            ShotError::AlreadyShot => write!(f, "Cell was already fired upon"),
            ShotError::OutOfBounds => write!(f, "Target is out of bounds"),
        }
    }
}

impl std::error::Error for ShotError {}

/// Errors from the player configuration collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    EmptyName,
    EmptyTheme,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyName => write!(f, "Player name must not be empty"),
            ConfigError::EmptyTheme => write!(f, "Theme id must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors produced while decoding server payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload was not valid JSON or did not match any known message.
    Malformed(String),
    /// A shot-result key was not a `"row,col"` pair inside the grid.
    BadKey(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(e) => write!(f, "Malformed server message: {}", e),
            ProtocolError::BadKey(k) => write!(f, "Invalid coordinate key: {:?}", k),
        }
    }
}

impl std::error::Error for ProtocolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_roundtrips_through_from_str() {
        let c = Coord::new(3, 7);
        assert_eq!(c.key(), "3,7");
        assert_eq!("3,7".parse::<Coord>().unwrap(), c);
        assert_eq!(" 9 , 0".parse::<Coord>().unwrap(), Coord::new(9, 0));
    }

    #[test]
    fn bad_keys_are_rejected() {
        assert!("3;7".parse::<Coord>().is_err());
        assert!("10,1".parse::<Coord>().is_err());
        assert!("a,b".parse::<Coord>().is_err());
    }

    #[test]
    fn signed_coordinates_off_grid() {
        assert_eq!(Coord::from_signed(-1, 4), None);
        assert_eq!(Coord::from_signed(4, 10), None);
        assert_eq!(Coord::from_signed(0, 9), Some(Coord::new(0, 9)));
    }

    #[test]
    fn display_uses_letter_and_row() {
        assert_eq!(Coord::new(0, 0).to_string(), "A1");
        assert_eq!(Coord::new(9, 9).to_string(), "J10");
    }

    #[test]
    fn display_of_far_off_cell_is_numeric() {
        assert_eq!(Coord::new(3, 191).to_string(), "(3,191)");
        assert_eq!(Coord::new(usize::MAX, 26).to_string(), format!("({},26)", usize::MAX));
        assert_eq!(Coord::new(usize::MAX, 0).to_string(), format!("A{}", usize::MAX));
    }
}
