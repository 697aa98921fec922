//! Puzzle data contract: the immutable solution grid, intersections and clue
//! list supplied when a session starts.
//!
//! Payloads arrive as JSON and are validated before any grid is built; a
//! malformed payload is rejected with a typed `PuzzleError` rather than
//! surfacing later as an out-of-bounds access. Optional sections are derived
//! from the grid when absent:
//! * `intersections` become every open cell belonging to both an ACROSS and
//!   a DOWN word of length >= 2.
//! * `clues` are numbered row-major with standard crossword numbering and
//!   carry empty text.

use crate::geometry::word_span;
use crate::{Board, Coord, Direction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Marker used by the generator for void cells.
pub const DEFAULT_EMPTY: &str = "▮";

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("malformed puzzle payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("puzzle dimensions must be positive")]
    ZeroDimensions,
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell {coord} holds {value:?}, expected a single grapheme")]
    NotAGrapheme { coord: Coord, value: String },
    #[error("{what} {coord} lies outside the grid")]
    OutOfBounds { what: &'static str, coord: Coord },
    #[error("{what} {coord} is a blocked cell")]
    Blocked { what: &'static str, coord: Coord },
    #[error("clue {number} {direction} is declared more than once")]
    DuplicateClue { number: u32, direction: Direction },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub number: u32,
    pub direction: Direction,
    pub start: Coord,
    #[serde(default)]
    pub text: String,
}

fn default_empty() -> String {
    DEFAULT_EMPTY.to_string()
}

#[derive(Debug, Deserialize)]
struct RawPuzzle {
    id: String,
    dimensions: usize,
    #[serde(default = "default_empty")]
    empty: String,
    grid: Vec<Vec<String>>,
    #[serde(default)]
    intersections: Option<Vec<Coord>>,
    #[serde(default)]
    clues: Option<Vec<Clue>>,
}

#[derive(Debug, Clone)]
pub struct Puzzle {
    id: String,
    dimensions: usize,
    empty: String,
    /// Row-major; `None` marks a blocked cell.
    solution: Vec<Option<String>>,
    intersections: BTreeSet<Coord>,
    /// Sorted ACROSS before DOWN, then by number.
    clues: Vec<Clue>,
}

impl Puzzle {
    pub fn from_json(payload: &str) -> Result<Self, PuzzleError> {
        let raw: RawPuzzle = serde_json::from_str(payload)?;
        Self::build(raw)
    }

    /// Compact constructor used by tests and fixtures: one string per row,
    /// one character per cell, `#` for a blocked cell. Intersections and clues
    /// are derived.
    pub fn from_rows(id: &str, rows: &[&str]) -> Result<Self, PuzzleError> {
        let grid = rows
            .iter()
            .map(|r| {
                r.chars()
                    .map(|ch| {
                        if ch == '#' {
                            DEFAULT_EMPTY.to_string()
                        } else {
                            ch.to_string()
                        }
                    })
                    .collect()
            })
            .collect();
        Self::build(RawPuzzle {
            id: id.to_string(),
            dimensions: rows.len(),
            empty: default_empty(),
            grid,
            intersections: None,
            clues: None,
        })
    }

    fn build(raw: RawPuzzle) -> Result<Self, PuzzleError> {
        let n = raw.dimensions;
        if n == 0 {
            return Err(PuzzleError::ZeroDimensions);
        }
        if raw.grid.len() != n {
            return Err(PuzzleError::RowCount {
                expected: n,
                found: raw.grid.len(),
            });
        }
        let mut solution = Vec::with_capacity(n * n);
        for (row, cells) in raw.grid.into_iter().enumerate() {
            if cells.len() != n {
                return Err(PuzzleError::RowWidth {
                    row,
                    expected: n,
                    found: cells.len(),
                });
            }
            for (col, value) in cells.into_iter().enumerate() {
                if value == raw.empty {
                    solution.push(None);
                    continue;
                }
                if value.graphemes(true).count() != 1 {
                    return Err(PuzzleError::NotAGrapheme {
                        coord: Coord::new(row, col),
                        value,
                    });
                }
                solution.push(Some(value.to_uppercase()));
            }
        }

        let mut puzzle = Self {
            id: raw.id,
            dimensions: n,
            empty: raw.empty,
            solution,
            intersections: BTreeSet::new(),
            clues: Vec::new(),
        };

        puzzle.intersections = match raw.intersections {
            Some(list) => {
                for &coord in &list {
                    puzzle.require_open("intersection", coord)?;
                }
                list.into_iter().collect()
            }
            None => puzzle.derive_intersections(),
        };

        let mut clues = match raw.clues {
            Some(list) => {
                let mut seen = HashSet::new();
                for clue in &list {
                    puzzle.require_open("clue start", clue.start)?;
                    if !seen.insert((clue.number, clue.direction)) {
                        return Err(PuzzleError::DuplicateClue {
                            number: clue.number,
                            direction: clue.direction,
                        });
                    }
                }
                list
            }
            None => puzzle.derive_clues(),
        };
        clues.sort_by_key(|c| (c.direction, c.number));
        puzzle.clues = clues;

        tracing::debug!(
            target: "grid",
            id = puzzle.id.as_str(),
            dimensions = n,
            intersections = puzzle.intersections.len(),
            clues = puzzle.clues.len(),
            "puzzle_loaded"
        );
        Ok(puzzle)
    }

    fn require_open(&self, what: &'static str, coord: Coord) -> Result<(), PuzzleError> {
        if !self.contains(coord) {
            return Err(PuzzleError::OutOfBounds { what, coord });
        }
        if self.is_blocked(coord) {
            return Err(PuzzleError::Blocked { what, coord });
        }
        Ok(())
    }

    fn open_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let n = self.dimensions;
        (0..n * n)
            .map(move |i| Coord::new(i / n, i % n))
            .filter(|&c| !self.is_blocked(c))
    }

    fn derive_intersections(&self) -> BTreeSet<Coord> {
        self.open_coords()
            .filter(|&c| {
                word_span(self, c, Direction::Across).len() >= 2
                    && word_span(self, c, Direction::Down).len() >= 2
            })
            .collect()
    }

    fn derive_clues(&self) -> Vec<Clue> {
        let mut clues = Vec::new();
        let mut number = 0;
        for coord in self.open_coords() {
            let starts: Vec<Direction> = [Direction::Across, Direction::Down]
                .into_iter()
                .filter(|&d| {
                    let span = word_span(self, coord, d);
                    span.first() == coord && span.len() >= 2
                })
                .collect();
            if starts.is_empty() {
                continue;
            }
            number += 1;
            for direction in starts {
                clues.push(Clue {
                    number,
                    direction,
                    start: coord,
                    text: String::new(),
                });
            }
        }
        clues
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn empty(&self) -> &str {
        &self.empty
    }

    /// Uppercased solution at `coord`, `None` for blocked or out-of-bounds.
    pub fn solution_at(&self, coord: Coord) -> Option<&str> {
        if !self.contains(coord) {
            return None;
        }
        self.solution[coord.row * self.dimensions + coord.col].as_deref()
    }

    pub fn intersections(&self) -> &BTreeSet<Coord> {
        &self.intersections
    }

    pub fn is_intersection(&self, coord: Coord) -> bool {
        self.intersections.contains(&coord)
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn clue(&self, number: u32, direction: Direction) -> Option<&Clue> {
        self.clues
            .iter()
            .find(|c| c.number == number && c.direction == direction)
    }

    pub fn clue_index(&self, number: u32, direction: Direction) -> Option<usize> {
        self.clues
            .iter()
            .position(|c| c.number == number && c.direction == direction)
    }
}

impl Board for Puzzle {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn is_blocked(&self, coord: Coord) -> bool {
        self.solution_at(coord).is_none()
    }
}
