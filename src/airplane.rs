//! Airplane footprints and orientation templates.

use core::fmt;
use core::str::FromStr;

use crate::common::Coord;
use crate::config::AIRPLANE_CELLS;

/// Direction the airplane's nose points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Up,
        Orientation::Right,
        Orientation::Down,
        Orientation::Left,
    ];

    /// `(drow, dcol)` offsets from the anchor. Index 0 is the head.
    pub const fn template(self) -> [(i32, i32); AIRPLANE_CELLS] {
        match self {
            Orientation::Up => [
                (0, 0),
                (1, 0),
                (1, -2),
                (1, -1),
                (1, 1),
                (1, 2),
                (2, 0),
                (3, 0),
                (3, -1),
                (3, 1),
            ],
            Orientation::Down => [
                (0, 0),
                (-1, 0),
                (-1, -2),
                (-1, -1),
                (-1, 1),
                (-1, 2),
                (-2, 0),
                (-3, 0),
                (-3, -1),
                (-3, 1),
            ],
            Orientation::Right => [
                (0, 0),
                (0, -1),
                (-2, -1),
                (-1, -1),
                (1, -1),
                (2, -1),
                (0, -2),
                (0, -3),
                (-1, -3),
                (1, -3),
            ],
            Orientation::Left => [
                (0, 0),
                (0, 1),
                (-2, 1),
                (-1, 1),
                (1, 1),
                (2, 1),
                (0, 2),
                (0, 3),
                (-1, 3),
                (1, 3),
            ],
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::Up => "up",
            Orientation::Down => "down",
            Orientation::Left => "left",
            Orientation::Right => "right",
        };
        f.write_str(s)
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Orientation::Up),
            "down" | "d" => Ok(Orientation::Down),
            "left" | "l" => Ok(Orientation::Left),
            "right" | "r" => Ok(Orientation::Right),
            other => Err(format!("unknown orientation {:?}", other)),
        }
    }
}

/// An airplane anchored at its head cell.
///
/// Cells are kept as signed offsets so a candidate that hangs off the grid can
/// still be previewed and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Airplane {
    anchor: Coord,
    orientation: Orientation,
    cells: [(i32, i32); AIRPLANE_CELLS],
}

impl Airplane {
    pub fn new(anchor: Coord, orientation: Orientation) -> Self {
        // Anchors past i32 saturate, which keeps every cell off the grid.
        let r = i32::try_from(anchor.row).unwrap_or(i32::MAX);
        let c = i32::try_from(anchor.col).unwrap_or(i32::MAX);
        let cells = orientation
            .template()
            .map(|(dr, dc)| (r.saturating_add(dr), c.saturating_add(dc)));
        Self {
            anchor,
            orientation,
            cells,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The single critical cell; always the anchor.
    pub fn head(&self) -> Coord {
        self.anchor
    }

    /// All ten cells, possibly off-grid.
    pub fn cells(&self) -> &[(i32, i32); AIRPLANE_CELLS] {
        &self.cells
    }

    /// Cells that land on the grid.
    pub fn in_bounds_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .filter_map(|&(r, c)| Coord::from_signed(r, c))
    }

    /// `true` when every cell is on the grid.
    pub fn fits(&self) -> bool {
        self.in_bounds_cells().count() == AIRPLANE_CELLS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn templates_have_distinct_cells() {
        for o in Orientation::ALL {
            let set: HashSet<_> = o.template().iter().copied().collect();
            assert_eq!(set.len(), AIRPLANE_CELLS, "{} template repeats a cell", o);
        }
    }

    #[test]
    fn templates_are_rotations_of_up() {
        // Down mirrors rows, Left transposes Up, Right mirrors Left.
        let up = Orientation::Up.template();
        let down: Vec<_> = up.iter().map(|&(r, c)| (-r, c)).collect();
        let left: Vec<_> = up.iter().map(|&(r, c)| (c, r)).collect();
        let right: Vec<_> = up.iter().map(|&(r, c)| (c, -r)).collect();
        assert_eq!(Orientation::Down.template().to_vec(), down);
        assert_eq!(Orientation::Left.template().to_vec(), left);
        assert_eq!(Orientation::Right.template().to_vec(), right);
    }

    #[test]
    fn head_near_edge_hangs_off_grid() {
        let plane = Airplane::new(Coord::new(0, 0), Orientation::Up);
        assert!(!plane.fits());
        assert_eq!(plane.head(), Coord::new(0, 0));
        assert!(plane.in_bounds_cells().count() < AIRPLANE_CELLS);
    }

    #[test]
    fn huge_anchor_stays_off_grid() {
        for o in Orientation::ALL {
            let plane = Airplane::new(Coord::new((1 << 32) + 5, 5), o);
            assert!(!plane.fits());
            assert_eq!(plane.in_bounds_cells().count(), 0);
        }
    }

    #[test]
    fn orientation_parses_short_and_long_forms() {
        assert_eq!("LEFT".parse::<Orientation>(), Ok(Orientation::Left));
        assert_eq!("r".parse::<Orientation>(), Ok(Orientation::Right));
        assert!("sideways".parse::<Orientation>().is_err());
    }
}
