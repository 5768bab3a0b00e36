//! Text commands for the console front end.
//!
//! Coordinates are written column letter first, then the 1-based row:
//! `A1` is the top-left cell and `J10` the bottom-right.

use core::fmt;

use crate::airplane::Orientation;
use crate::common::Coord;
use crate::config::GRID_SIZE;

/// A user action read from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Place(Coord),
    /// `None` clears the preview.
    Preview(Option<Coord>),
    Rotate(Orientation),
    Fire(Coord),
    Flag(Coord),
    AutoPlace,
    Restart,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    BadCoord(String),
    BadOrientation(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(cmd) => write!(f, "unknown command {:?}", cmd),
            CommandError::MissingArgument(what) => write!(f, "missing {}", what),
            CommandError::BadCoord(s) => write!(f, "invalid coordinate {:?} (use A1..J10)", s),
            CommandError::BadOrientation(s) => {
                write!(f, "invalid orientation {:?} (use up/down/left/right)", s)
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
commands:
  place A5       place an airplane with its nose at A5
  rotate left    set orientation (up, down, left, right)
  preview A5     show where an airplane would go; `preview` alone clears it
  auto           place the next airplane at random
  fire B7        shoot at B7 on the opponent grid
  flag B7        toggle a flag on B7
  restart        start a new match
  quit";

/// Parse `A5`-style coordinates.
pub fn parse_coord(input: &str) -> Option<Coord> {
    let input = input.trim();
    if input.len() < 2 {
        return None;
    }
    let mut chars = input.chars();
    let col_ch = chars.next()?.to_ascii_uppercase();
    if !col_ch.is_ascii_uppercase() {
        return None;
    }
    let col = (col_ch as u8 - b'A') as usize;
    let row: usize = chars.as_str().parse().ok()?;
    if row == 0 {
        return None;
    }
    let at = Coord::new(row - 1, col);
    (at.row < GRID_SIZE && at.col < GRID_SIZE).then_some(at)
}

fn coord_arg(arg: Option<&str>) -> Result<Coord, CommandError> {
    let arg = arg.ok_or(CommandError::MissingArgument("coordinate"))?;
    parse_coord(arg).ok_or_else(|| CommandError::BadCoord(arg.to_string()))
}

/// Parse one console line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
    let arg = words.next();
    match verb.as_str() {
        "place" | "p" => coord_arg(arg).map(Command::Place),
        "preview" | "hover" => match arg {
            None => Ok(Command::Preview(None)),
            Some(_) => coord_arg(arg).map(|at| Command::Preview(Some(at))),
        },
        "rotate" | "r" => {
            let arg = arg.ok_or(CommandError::MissingArgument("orientation"))?;
            arg.parse()
                .map(Command::Rotate)
                .map_err(|_| CommandError::BadOrientation(arg.to_string()))
        }
        "fire" | "f" | "shoot" => coord_arg(arg).map(Command::Fire),
        "flag" => coord_arg(arg).map(Command::Flag),
        "auto" => Ok(Command::AutoPlace),
        "restart" => Ok(Command::Restart),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_are_column_then_row() {
        assert_eq!(parse_coord("A1"), Some(Coord::new(0, 0)));
        assert_eq!(parse_coord("j10"), Some(Coord::new(9, 9)));
        assert_eq!(parse_coord("B7"), Some(Coord::new(6, 1)));
        assert_eq!(parse_coord("K1"), None);
        assert_eq!(parse_coord("A0"), None);
        assert_eq!(parse_coord("A11"), None);
        assert_eq!(parse_coord("5A"), None);
        assert_eq!(parse_coord("A"), None);
    }

    #[test]
    fn coord_display_round_trips_through_parser() {
        let at = Coord::new(4, 7);
        assert_eq!(parse_coord(&at.to_string()), Some(at));
    }
}
