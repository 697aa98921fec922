//! Grid model for a crossword session.
//!
//! The grid is a square of cells addressed by `(row, col)`. Blocked cells are
//! voids: they never belong to a word and never hold a value. Geometry,
//! completion detection and the cursor engine all read cells through the
//! accessors in this crate; writes go through `Grid::set_value` or
//! `Grid::cell_mut` from the action layer.
//!
//! Invariants (must hold after every public call):
//! * `cells.len() == dimensions * dimensions`, stored row-major.
//! * A blocked cell's value is always empty and its `locked` / `wrong` flags
//!   are always clear.
//! * Solutions are uppercased when the grid is built, so completion compares
//!   an uppercased value against the stored solution directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod geometry;
pub mod letter;
pub mod puzzle;

pub use geometry::{
    WordCells, WordCoords, WordSpan, shift, should_alternate, step, word_answer, word_cells,
    word_coords, word_span, word_text,
};
pub use puzzle::{Clue, DEFAULT_EMPTY, Puzzle, PuzzleError};

/// Cell address, 0-indexed. Serialized as a `[row, col]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<[usize; 2]> for Coord {
    fn from([row, col]: [usize; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Coord> for [usize; 2] {
    fn from(c: Coord) -> Self {
        [c.row, c.col]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Word axis. ACROSS words keep the row fixed; DOWN words keep the column fixed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Across,
    Down,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Across => "ACROSS",
            Direction::Down => "DOWN",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction {0:?} (expected across or down)")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "across" | "a" => Ok(Direction::Across),
            "down" | "d" => Ok(Direction::Down),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

/// One step along an axis: `Forward` is the typing direction (right / down),
/// `Backward` the deletion direction (left / up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Forward,
    Backward,
}

/// Anything with a square layout of possibly blocked cells. Geometry is
/// generic over this so it runs against both the immutable puzzle (while
/// deriving clues) and the live grid.
pub trait Board {
    fn dimensions(&self) -> usize;
    /// Out-of-bounds coordinates report as blocked.
    fn is_blocked(&self, coord: Coord) -> bool;

    fn contains(&self, coord: Coord) -> bool {
        coord.row < self.dimensions() && coord.col < self.dimensions()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Current user value; empty string is the empty sentinel.
    pub value: String,
    /// Uppercased ground truth. Empty for blocked cells.
    pub solution: String,
    pub blocked: bool,
    /// Verified correct; typing no longer changes the value.
    pub locked: bool,
    /// Last check failed.
    pub wrong: bool,
}

impl Cell {
    fn open(solution: &str) -> Self {
        Self {
            value: String::new(),
            solution: solution.to_uppercase(),
            blocked: false,
            locked: false,
            wrong: false,
        }
    }

    fn void() -> Self {
        Self {
            value: String::new(),
            solution: String::new(),
            blocked: true,
            locked: false,
            wrong: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn is_correct(&self) -> bool {
        is_correct(&self.value, &self.solution)
    }
}

/// Case-insensitive comparison of a typed value against its solution. An
/// empty value is never correct.
pub fn is_correct(value: &str, solution: &str) -> bool {
    !value.is_empty() && value.to_uppercase() == solution.to_uppercase()
}

#[derive(Debug, Clone)]
pub struct Grid {
    dimensions: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build an empty (unfilled) grid from a validated puzzle.
    pub fn from_puzzle(puzzle: &Puzzle) -> Self {
        let n = puzzle.dimensions();
        let mut cells = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                match puzzle.solution_at(Coord::new(row, col)) {
                    Some(sol) => cells.push(Cell::open(sol)),
                    None => cells.push(Cell::void()),
                }
            }
        }
        tracing::debug!(target: "grid", dimensions = n, open = cells.iter().filter(|c| !c.blocked).count(), "grid_built");
        Self {
            dimensions: n,
            cells,
        }
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.row * self.dimensions + coord.col)
        } else {
            None
        }
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        match self.index(coord) {
            Some(i) => Some(&mut self.cells[i]),
            None => None,
        }
    }

    /// True iff the cell holds the empty sentinel. Out-of-bounds and blocked
    /// coordinates count as empty.
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.cell(coord).is_none_or(Cell::is_empty)
    }

    pub fn is_locked(&self, coord: Coord) -> bool {
        self.cell(coord).is_some_and(|c| c.locked)
    }

    /// Write a value into an open cell. Returns false (and writes nothing) for
    /// blocked or out-of-bounds coordinates.
    pub fn set_value(&mut self, coord: Coord, value: &str) -> bool {
        match self.cell_mut(coord) {
            Some(cell) if !cell.blocked => {
                cell.value.clear();
                cell.value.push_str(value);
                tracing::trace!(target: "grid", row = coord.row, col = coord.col, value, "set_value");
                true
            }
            _ => false,
        }
    }

    /// Completion predicate: every open cell's uppercased value equals its
    /// solution. Full scan, O(dimensions²).
    pub fn cells_equal_grid(&self) -> bool {
        self.cells
            .iter()
            .filter(|c| !c.blocked)
            .all(|c| c.value.to_uppercase() == c.solution)
    }

    /// Row-major iterator over every open cell coordinate.
    pub fn open_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter().filter(|(_, c)| !c.blocked).map(|(coord, _)| coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        let n = self.dimensions;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Coord::new(i / n, i % n), cell))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.dimensions.max(1))
    }
}

impl Board for Grid {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn is_blocked(&self, coord: Coord) -> bool {
        self.cell(coord).is_none_or(|c| c.blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_puzzle(&Puzzle::from_rows("t", rows).unwrap())
    }

    #[test]
    fn coord_serializes_as_pair() {
        let json = serde_json::to_string(&Coord::new(2, 5)).unwrap();
        assert_eq!(json, "[2,5]");
        let back: Coord = serde_json::from_str("[4,1]").unwrap();
        assert_eq!(back, Coord::new(4, 1));
    }

    #[test]
    fn direction_parse_and_flip() {
        assert_eq!("down".parse::<Direction>().unwrap(), Direction::Down);
        assert_eq!("ACROSS".parse::<Direction>().unwrap(), Direction::Across);
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::Across.flip(), Direction::Down);
        assert_eq!(serde_json::to_string(&Direction::Down).unwrap(), "\"DOWN\"");
    }

    #[test]
    fn set_value_refuses_blocked_and_out_of_bounds() {
        let mut g = grid(&["AB", "#C"]);
        assert!(g.set_value(Coord::new(0, 0), "a"));
        assert!(!g.set_value(Coord::new(1, 0), "x"));
        assert!(!g.set_value(Coord::new(5, 5), "x"));
        assert_eq!(g.cell(Coord::new(0, 0)).unwrap().value, "a");
        assert!(g.cell(Coord::new(1, 0)).unwrap().value.is_empty());
    }

    #[test]
    fn is_empty_treats_missing_cells_as_empty() {
        let g = grid(&["AB", "#C"]);
        assert!(g.is_empty(Coord::new(0, 1)));
        assert!(g.is_empty(Coord::new(9, 9)));
        assert!(g.is_blocked(Coord::new(9, 9)));
    }

    #[test]
    fn completion_is_case_insensitive() {
        let mut g = grid(&["AB", "#C"]);
        assert!(!g.cells_equal_grid());
        g.set_value(Coord::new(0, 0), "a");
        g.set_value(Coord::new(0, 1), "B");
        assert!(!g.cells_equal_grid());
        g.set_value(Coord::new(1, 1), "c");
        assert!(g.cells_equal_grid());
    }

    #[test]
    fn is_correct_rejects_empty() {
        assert!(!is_correct("", "A"));
        assert!(is_correct("ä", "Ä"));
        assert!(!is_correct("B", "A"));
    }

    #[test]
    fn open_cells_skip_voids() {
        let g = grid(&["A#", "BC"]);
        let open: Vec<_> = g.open_cells().collect();
        assert_eq!(
            open,
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(1, 1)]
        );
    }
}
