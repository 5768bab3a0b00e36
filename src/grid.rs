//! Own grid (airplane placement) and target grid (shots and flags).

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::airplane::{Airplane, Orientation};
use crate::common::{Coord, PlacementError};
use crate::config::{EMPTY_CELL, GRID_SIZE};

/// Colour tag shared by every cell of one airplane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceColor(pub [u8; 3]);

impl PieceColor {
    /// Random colour that never collides with the empty sentinel.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        loop {
            let rgb: [u8; 3] = [rng.random(), rng.random(), rng.random()];
            if rgb != EMPTY_CELL {
                return PieceColor(rgb);
            }
        }
    }
}

/// One own-grid cell. Serialized as an RGB triple; empty is white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Piece(PieceColor),
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => EMPTY_CELL.serialize(serializer),
            Cell::Piece(PieceColor(rgb)) => rgb.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rgb = <[u8; 3]>::deserialize(deserializer)?;
        Ok(if rgb == EMPTY_CELL {
            Cell::Empty
        } else {
            Cell::Piece(PieceColor(rgb))
        })
    }
}

/// Coarse occupancy of an own-grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Occupied,
}

/// The player's private grid.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OwnGrid {
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
}

impl OwnGrid {
    /// Create an empty grid (no airplanes placed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Cell::Empty` for coordinates off the grid.
    pub fn cell(&self, at: Coord) -> Cell {
        if at.in_bounds() {
            self.cells[at.row][at.col]
        } else {
            Cell::Empty
        }
    }

    pub fn cell_state(&self, at: Coord) -> CellState {
        match self.cell(at) {
            Cell::Empty => CellState::Empty,
            Cell::Piece(_) => CellState::Occupied,
        }
    }

    /// Legality check shared by preview and placement.
    pub fn can_place(&self, plane: &Airplane) -> Result<(), PlacementError> {
        let mut overlaps = false;
        for &(r, c) in plane.cells() {
            let at = Coord::from_signed(r, c).ok_or(PlacementError::OutOfBounds)?;
            if self.cell_state(at) == CellState::Occupied {
                overlaps = true;
            }
        }
        if overlaps {
            Err(PlacementError::Overlaps)
        } else {
            Ok(())
        }
    }

    pub fn is_legal(&self, plane: &Airplane) -> bool {
        self.can_place(plane).is_ok()
    }

    /// Write all ten cells, or none when the placement is illegal.
    pub fn place(&mut self, plane: &Airplane, color: PieceColor) -> Result<(), PlacementError> {
        self.can_place(plane)?;
        for at in plane.in_bounds_cells() {
            self.cells[at.row][at.col] = Cell::Piece(color);
        }
        Ok(())
    }

    /// Returns a random legal airplane, optionally fixing its orientation.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        orientation: Option<Orientation>,
    ) -> Result<Airplane, PlacementError> {
        for _ in 0..200 {
            let orient = orientation
                .unwrap_or_else(|| Orientation::ALL[rng.random_range(0..Orientation::ALL.len())]);
            let anchor = Coord::new(rng.random_range(0..GRID_SIZE), rng.random_range(0..GRID_SIZE));
            let plane = Airplane::new(anchor, orient);
            if self.is_legal(&plane) {
                return Ok(plane);
            }
        }
        // Sampling gave up; sweep every anchor before reporting failure.
        let orients: &[Orientation] = match &orientation {
            Some(o) => core::slice::from_ref(o),
            None => &Orientation::ALL,
        };
        for &o in orients {
            for row in 0..GRID_SIZE {
                for col in 0..GRID_SIZE {
                    let plane = Airplane::new(Coord::new(row, col), o);
                    if self.is_legal(&plane) {
                        return Ok(plane);
                    }
                }
            }
        }
        Err(PlacementError::NoLegalPlacement)
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| matches!(c, Cell::Piece(_)))
            .count()
    }

    /// Full copy for the outbound state message.
    pub fn snapshot(&self) -> [[Cell; GRID_SIZE]; GRID_SIZE] {
        self.cells
    }
}

/// The player's view of the opponent grid: shots fired and flag annotations.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TargetGrid {
    shots: [[bool; GRID_SIZE]; GRID_SIZE],
    flags: [[bool; GRID_SIZE]; GRID_SIZE],
}

impl TargetGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_shot(&self, at: Coord) -> bool {
        at.in_bounds() && self.shots[at.row][at.col]
    }

    pub fn is_flagged(&self, at: Coord) -> bool {
        at.in_bounds() && self.flags[at.row][at.col]
    }

    /// Marks `at` as fired upon and drops any flag there.
    /// Returns `false` if the cell was already shot or is off the grid.
    pub fn mark_shot(&mut self, at: Coord) -> bool {
        if !at.in_bounds() || self.shots[at.row][at.col] {
            return false;
        }
        self.shots[at.row][at.col] = true;
        self.flags[at.row][at.col] = false;
        true
    }

    /// Flip the flag on an unshot cell; returns the new flag value.
    pub fn toggle_flag(&mut self, at: Coord) -> Option<bool> {
        if !at.in_bounds() || self.shots[at.row][at.col] {
            return None;
        }
        let flag = &mut self.flags[at.row][at.col];
        *flag = !*flag;
        Some(*flag)
    }

    pub fn shot_count(&self) -> usize {
        self.shots.iter().flatten().filter(|s| **s).count()
    }

    pub fn snapshot(&self) -> [[bool; GRID_SIZE]; GRID_SIZE] {
        self.shots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn cell_serializes_as_rgb() {
        let json = serde_json::to_string(&[Cell::Empty, Cell::Piece(PieceColor([1, 2, 3]))]).unwrap();
        assert_eq!(json, "[[255,255,255],[1,2,3]]");
        let back: Vec<Cell> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Cell::Empty, Cell::Piece(PieceColor([1, 2, 3]))]);
    }

    #[test]
    fn random_color_is_never_empty_sentinel() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_ne!(PieceColor::random(&mut rng).0, EMPTY_CELL);
        }
    }

    #[test]
    fn out_of_bounds_reported_before_overlap() {
        let mut grid = OwnGrid::new();
        let first = Airplane::new(Coord::new(0, 2), Orientation::Up);
        grid.place(&first, PieceColor([9, 9, 9])).unwrap();
        // Hangs off the left edge and overlaps the first plane.
        let second = Airplane::new(Coord::new(1, 0), Orientation::Up);
        assert_eq!(grid.can_place(&second), Err(PlacementError::OutOfBounds));
    }

    #[test]
    fn flags_and_shots_are_exclusive() {
        let mut target = TargetGrid::new();
        let at = Coord::new(4, 4);
        assert_eq!(target.toggle_flag(at), Some(true));
        assert!(target.mark_shot(at));
        assert!(!target.is_flagged(at));
        assert_eq!(target.toggle_flag(at), None);
        assert!(!target.mark_shot(at));
        assert_eq!(target.shot_count(), 1);
    }

    #[test]
    fn random_placement_fills_three_planes() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut grid = OwnGrid::new();
        for _ in 0..3 {
            let plane = grid.random_placement(&mut rng, None).unwrap();
            grid.place(&plane, PieceColor::random(&mut rng)).unwrap();
        }
        assert_eq!(grid.occupied(), 30);
    }
}
