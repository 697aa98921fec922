//! Word geometry: word spans, word cell enumeration and single-cell shifts.
//!
//! A word is never stored. It is recomputed on demand by scanning outward
//! from a cell along the moving axis until a blocked cell or the grid edge is
//! hit, so it must be recomputed after every cursor or direction change.
//! All scans are O(word length).

use crate::{Board, Coord, Direction, Grid, Heading};
use smallvec::SmallVec;

/// Inline storage sized for typical crossword words (grids rarely exceed 25).
pub type WordCoords = SmallVec<[Coord; 16]>;

/// Inclusive `[start, end]` range along the moving axis of a word.
/// `fixed` is the row for ACROSS words and the column for DOWN words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub direction: Direction,
    pub fixed: usize,
    pub start: usize,
    pub end: usize,
}

impl WordSpan {
    /// Number of cells; a span always covers at least its origin cell.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn coord_at(&self, moving: usize) -> Coord {
        match self.direction {
            Direction::Across => Coord::new(self.fixed, moving),
            Direction::Down => Coord::new(moving, self.fixed),
        }
    }

    pub fn first(&self) -> Coord {
        self.coord_at(self.start)
    }

    pub fn last(&self) -> Coord {
        self.coord_at(self.end)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        let (fixed, moving) = split(coord, self.direction);
        fixed == self.fixed && (self.start..=self.end).contains(&moving)
    }

    pub fn cells(&self) -> WordCells {
        WordCells {
            span: *self,
            next: self.start,
        }
    }
}

/// Ordered, finite iterator over a word's cells. Restartable by asking for a
/// fresh one; it carries no state beyond its own position.
#[derive(Debug, Clone)]
pub struct WordCells {
    span: WordSpan,
    next: usize,
}

impl Iterator for WordCells {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.next > self.span.end {
            return None;
        }
        let c = self.span.coord_at(self.next);
        self.next += 1;
        Some(c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.span.end + 1).saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for WordCells {}

/// `(fixed, moving)` indices of a coordinate for the given axis.
fn split(coord: Coord, direction: Direction) -> (usize, usize) {
    match direction {
        Direction::Across => (coord.row, coord.col),
        Direction::Down => (coord.col, coord.row),
    }
}

/// Raw neighbour one step along `direction`, ignoring whether it is blocked.
/// `None` when the step leaves the grid.
pub fn step<B: Board + ?Sized>(
    board: &B,
    coord: Coord,
    direction: Direction,
    heading: Heading,
) -> Option<Coord> {
    let (row, col) = (coord.row, coord.col);
    let next = match (direction, heading) {
        (Direction::Across, Heading::Forward) => Coord::new(row, col.checked_add(1)?),
        (Direction::Across, Heading::Backward) => Coord::new(row, col.checked_sub(1)?),
        (Direction::Down, Heading::Forward) => Coord::new(row.checked_add(1)?, col),
        (Direction::Down, Heading::Backward) => Coord::new(row.checked_sub(1)?, col),
    };
    board.contains(next).then_some(next)
}

/// Neighbour one step along `direction`, clamped to the current word: if the
/// neighbour is blocked or off-grid the original coordinate comes back
/// unchanged. This is how movement silently stops at word boundaries.
pub fn shift<B: Board + ?Sized>(
    board: &B,
    coord: Coord,
    direction: Direction,
    heading: Heading,
) -> Coord {
    match step(board, coord, direction, heading) {
        Some(next) if !board.is_blocked(next) => next,
        _ => coord,
    }
}

/// True iff `coord` has no open neighbour on either side along `direction`,
/// meaning the perpendicular axis must be used instead.
pub fn should_alternate<B: Board + ?Sized>(board: &B, coord: Coord, direction: Direction) -> bool {
    shift(board, coord, direction, Heading::Forward) == coord
        && shift(board, coord, direction, Heading::Backward) == coord
}

/// Span of the word containing `coord` along `direction`.
pub fn word_span<B: Board + ?Sized>(board: &B, coord: Coord, direction: Direction) -> WordSpan {
    let (fixed, moving) = split(coord, direction);
    let mut span = WordSpan {
        direction,
        fixed,
        start: moving,
        end: moving,
    };
    while span.start > 0 && !board.is_blocked(span.coord_at(span.start - 1)) {
        span.start -= 1;
    }
    let last = board.dimensions().saturating_sub(1);
    while span.end < last && !board.is_blocked(span.coord_at(span.end + 1)) {
        span.end += 1;
    }
    span
}

pub fn word_cells<B: Board + ?Sized>(board: &B, coord: Coord, direction: Direction) -> WordCells {
    word_span(board, coord, direction).cells()
}

pub fn word_coords<B: Board + ?Sized>(board: &B, coord: Coord, direction: Direction) -> WordCoords {
    word_cells(board, coord, direction).collect()
}

/// Uppercased concatenation of the word's current values. Empty cells add
/// nothing.
pub fn word_text(grid: &Grid, coord: Coord, direction: Direction) -> String {
    word_cells(grid, coord, direction)
        .filter_map(|c| grid.cell(c))
        .map(|cell| cell.value.to_uppercase())
        .collect()
}

/// Uppercased solution of the word containing `coord`; identifies the word
/// independently of what has been typed.
pub fn word_answer(grid: &Grid, coord: Coord, direction: Direction) -> String {
    word_cells(grid, coord, direction)
        .filter_map(|c| grid.cell(c))
        .map(|cell| cell.solution.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Puzzle;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_puzzle(&Puzzle::from_rows("geom", rows).unwrap())
    }

    #[test]
    fn span_stops_at_blocked_cells() {
        let g = grid(&["AB#C", "D##E", "FGHI", "J#KL"]);
        let s = word_span(&g, Coord::new(0, 0), Direction::Across);
        assert_eq!((s.start, s.end), (0, 1));
        let s = word_span(&g, Coord::new(0, 3), Direction::Across);
        assert_eq!((s.start, s.end), (3, 3));
    }

    #[test]
    fn span_down_uses_column_as_fixed_index() {
        let g = grid(&["AB#C", "D##E", "FGHI", "J#KL"]);
        let s = word_span(&g, Coord::new(2, 0), Direction::Down);
        assert_eq!(s.fixed, 0);
        assert_eq!((s.start, s.end), (0, 3));
        let cells: Vec<_> = s.cells().collect();
        assert_eq!(cells.first(), Some(&Coord::new(0, 0)));
        assert_eq!(cells.last(), Some(&Coord::new(3, 0)));
    }

    #[test]
    fn word_cells_is_restartable() {
        let g = grid(&["ABC", "###", "DEF"]);
        let first: Vec<_> = word_cells(&g, Coord::new(0, 1), Direction::Across).collect();
        let second: Vec<_> = word_cells(&g, Coord::new(0, 1), Direction::Across).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(word_cells(&g, Coord::new(2, 2), Direction::Across).len(), 3);
    }

    #[test]
    fn shift_clamps_and_step_does_not() {
        let g = grid(&["AB#C", "####", "####", "####"]);
        let end = Coord::new(0, 1);
        assert_eq!(shift(&g, end, Direction::Across, Heading::Forward), end);
        assert_eq!(
            step(&g, end, Direction::Across, Heading::Forward),
            Some(Coord::new(0, 2))
        );
        assert_eq!(
            step(&g, Coord::new(0, 0), Direction::Across, Heading::Backward),
            None
        );
        assert_eq!(
            step(&g, Coord::new(0, 3), Direction::Across, Heading::Forward),
            None
        );
    }

    #[test]
    fn alternate_only_when_both_sides_are_closed() {
        let g = grid(&["AB#", "C##", "D#E"]);
        // (0,0) has an across neighbour.
        assert!(!should_alternate(&g, Coord::new(0, 0), Direction::Across));
        // (1,0) is only part of a down word.
        assert!(should_alternate(&g, Coord::new(1, 0), Direction::Across));
        assert!(!should_alternate(&g, Coord::new(1, 0), Direction::Down));
        // Isolated cell is a dead end both ways.
        assert!(should_alternate(&g, Coord::new(2, 2), Direction::Across));
        assert!(should_alternate(&g, Coord::new(2, 2), Direction::Down));
    }

    #[test]
    fn word_text_skips_empty_cells() {
        let mut g = grid(&["ABC", "###", "###"]);
        g.set_value(Coord::new(0, 0), "a");
        g.set_value(Coord::new(0, 2), "c");
        assert_eq!(word_text(&g, Coord::new(0, 1), Direction::Across), "AC");
        assert_eq!(word_answer(&g, Coord::new(0, 1), Direction::Across), "ABC");
    }

    #[test]
    fn span_contains_only_its_own_axis() {
        let g = grid(&["ABC", "DEF", "GHI"]);
        let s = word_span(&g, Coord::new(1, 1), Direction::Across);
        assert!(s.contains(Coord::new(1, 0)));
        assert!(!s.contains(Coord::new(0, 1)));
        assert_eq!(s.first(), Coord::new(1, 0));
        assert_eq!(s.last(), Coord::new(1, 2));
    }
}
