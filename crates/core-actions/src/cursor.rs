//! Cursor transition engine.
//!
//! Movement never fails: a shift that would leave the current word returns
//! the original coordinate, and every transition reports whether it changed
//! anything so the dispatcher can decide on a redraw. Typing never changes
//! direction; only clicks, arrows, the spacebar, clue selection and word
//! cycling do.

use crate::{ArrowKey, SelectionController};
use core_grid::letter::is_letter_grapheme;
use core_grid::{Board, Coord, Direction, Heading, geometry, step, word_cells};
use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

impl SelectionController {
    /// One step along the current direction, clamped to the word.
    pub fn shift(&self, coord: Coord, heading: Heading) -> Coord {
        geometry::shift(&self.grid, coord, self.selection.direction, heading)
    }

    /// True when `coord` is a dead end in the current direction.
    pub fn should_alternate(&self, coord: Coord) -> bool {
        geometry::should_alternate(&self.grid, coord, self.selection.direction)
    }

    /// Jump forward over filled cells to the next empty cell of the word.
    ///
    /// Only skips when the preceding write went into an empty cell; otherwise
    /// (and when no empty cell remains ahead) this is a single forward shift.
    /// At the end of the word nothing moves and the edit flag is left alone.
    pub fn skip_to_next_empty(&mut self, coord: Coord) -> Coord {
        let first = self.shift(coord, Heading::Forward);
        if first == coord {
            return coord;
        }
        if !self.selection.was_empty_before_edit {
            return first;
        }
        self.selection.was_empty_before_edit = false;
        let mut probe = first;
        while !self.grid.is_empty(probe) {
            let next = self.shift(probe, Heading::Forward);
            if next == probe {
                trace!(target: "actions.cursor", row = coord.row, col = coord.col, "skip_exhausted");
                return first;
            }
            probe = next;
        }
        probe
    }

    /// Standard input, `enter` branch: write one letter into the selected
    /// cell and advance.
    pub fn type_letter(&mut self, text: &str) -> bool {
        if self.popup_blocks("type") {
            return false;
        }
        self.settle_compound();
        let Some(at) = self.selection.cell else {
            return false;
        };
        if !is_letter_grapheme(text) {
            debug!(target: "actions.cursor", "input_rejected");
            return false;
        }
        let value: String = text.nfc().collect();
        let locked = self.grid.is_locked(at);
        let was_empty = self.grid.is_empty(at);
        if !locked {
            self.write_value(at, &value);
        }
        self.clear_wrong(at);
        self.selection.was_empty_before_edit = was_empty && !locked;
        trace!(target: "actions.cursor", row = at.row, col = at.col, value = %value, locked, "typed");
        if self.assist.check_as_you_type && !locked {
            self.check_cell(at);
        }
        self.detect_completion();
        self.advance_after_enter(at);
        true
    }

    /// Standard input, `del` branch.
    ///
    /// A filled, unlocked cell is cleared in place. Otherwise the previous
    /// cell of the word is cleared (unless locked) and the cursor moves there.
    pub fn erase(&mut self) -> bool {
        if self.popup_blocks("erase") {
            return false;
        }
        self.settle_compound();
        let Some(at) = self.selection.cell else {
            return false;
        };
        if !self.grid.is_empty(at) && !self.grid.is_locked(at) {
            self.erase_cell(at);
            self.detect_completion();
            return true;
        }
        let prev = self.shift(at, Heading::Backward);
        if !self.grid.is_locked(prev) {
            self.erase_cell(prev);
        }
        self.detect_completion();
        if prev == at && self.assist.auto_advance_word && self.word_is_empty(at) {
            if let Some(clue) = self.neighbour_clue(Heading::Backward).cloned() {
                self.selection.direction = clue.direction;
                let last = geometry::word_span(&self.grid, clue.start, clue.direction).last();
                debug!(target: "actions.cursor", number = clue.number, direction = %clue.direction, "auto_advance_previous_word");
                self.focus(last);
                return true;
            }
        }
        self.focus(prev);
        true
    }

    /// Paste / IME commit: every grapheme goes through `type_letter`.
    pub fn type_text(&mut self, text: &str) -> bool {
        let normalized: String = text.nfc().collect();
        let mut changed = false;
        for g in normalized.graphemes(true) {
            changed |= self.type_letter(g);
        }
        changed
    }

    /// Arrow navigation. Blocked cells along the arrow's axis are jumped; when
    /// nothing open lies that way the cursor stays. If the landing cell is a
    /// dead end in the current direction the direction flips instead, and the
    /// cursor only moves when blocked cells were jumped to get there.
    pub fn arrow_move(&mut self, key: ArrowKey) -> bool {
        if self.popup_blocks("arrow") {
            return false;
        }
        self.settle_compound();
        let Some(at) = self.selection.cell else {
            return false;
        };
        let (axis, heading) = key.motion();
        let mut probe = at;
        let mut jumped = false;
        let landing = loop {
            match step(&self.grid, probe, axis, heading) {
                None => break None,
                Some(next) if self.grid.is_blocked(next) => {
                    probe = next;
                    jumped = true;
                }
                Some(next) => break Some(next),
            }
        };
        let target = landing.unwrap_or(at);
        if self.should_alternate(target) {
            self.flip_direction();
            if jumped && landing.is_some() {
                self.focus(target);
            } else {
                self.refresh_word();
            }
        } else {
            self.focus(target);
        }
        debug!(target: "actions.cursor", ?key, row = target.row, col = target.col, direction = %self.selection.direction, "arrow_move");
        true
    }

    /// Pointer selection. A second click on an intersection toggles the
    /// axis; a cell that is a dead end in the current direction switches to
    /// the other one.
    pub fn click(&mut self, coord: Coord) -> bool {
        if self.popup_blocks("click") {
            return false;
        }
        if self.grid.is_blocked(coord) {
            debug!(target: "actions.cursor", row = coord.row, col = coord.col, "click_on_blocked_ignored");
            return false;
        }
        if let Some(input) = self.gate.compound() {
            if input.target == coord {
                return false;
            }
            self.commit_compound(false);
        }
        if self.puzzle.is_intersection(coord) && self.selection.cell == Some(coord) {
            self.flip_direction();
        } else if self.should_alternate(coord) {
            self.flip_direction();
        }
        self.focus(coord);
        debug!(target: "actions.cursor", row = coord.row, col = coord.col, direction = %self.selection.direction, "click_select");
        true
    }

    /// Spacebar: flip direction, only at an intersection.
    pub fn alternate(&mut self) -> bool {
        if self.popup_blocks("alternate") {
            return false;
        }
        self.settle_compound();
        match self.selection.cell {
            Some(at) if self.puzzle.is_intersection(at) => {
                self.flip_direction();
                self.refresh_word();
                true
            }
            _ => false,
        }
    }

    pub fn select_clue(&mut self, number: u32, direction: Direction) -> bool {
        if self.popup_blocks("select_clue") {
            return false;
        }
        self.settle_compound();
        let Some(start) = self.puzzle.clue(number, direction).map(|c| c.start) else {
            debug!(target: "actions.cursor", number, direction = %direction, "unknown_clue");
            return false;
        };
        self.selection.direction = direction;
        self.focus(start);
        true
    }

    /// Tab / Shift+Tab: start of the next / previous clue, wrapping.
    pub fn cycle_word(&mut self, heading: Heading) -> bool {
        if self.popup_blocks("cycle_word") {
            return false;
        }
        self.settle_compound();
        let Some(clue) = self.neighbour_clue(heading).cloned() else {
            return false;
        };
        self.selection.direction = clue.direction;
        self.focus(clue.start);
        true
    }

    /// Escape: drop the selection.
    pub fn deselect(&mut self) -> bool {
        if self.popup_blocks("deselect") {
            return false;
        }
        self.settle_compound();
        let was_active = self.selection.is_active();
        self.selection.clear();
        was_active
    }

    /// Cursor advance after an accepted letter: smart skip or a plain shift
    /// inside the word, then (at the end of a filled word) the optional jump
    /// to the next word.
    pub(crate) fn advance_after_enter(&mut self, at: Coord) {
        let next = if self.assist.smart_skip {
            self.skip_to_next_empty(at)
        } else {
            self.shift(at, Heading::Forward)
        };
        if next == at && self.assist.auto_advance_word && !self.word_has_empty(at) {
            if let Some(clue) = self.neighbour_clue(Heading::Forward).cloned() {
                debug!(target: "actions.cursor", number = clue.number, direction = %clue.direction, "auto_advance_next_word");
                self.selection.direction = clue.direction;
                self.focus(clue.start);
                return;
            }
        }
        self.focus(next);
    }

    fn erase_cell(&mut self, coord: Coord) {
        self.write_value(coord, "");
        let locked = self.grid.is_locked(coord);
        self.set_flags(coord, locked, false);
    }

    fn word_has_empty(&self, at: Coord) -> bool {
        word_cells(&self.grid, at, self.selection.direction).any(|c| self.grid.is_empty(c))
    }

    fn word_is_empty(&self, at: Coord) -> bool {
        word_cells(&self.grid, at, self.selection.direction).all(|c| self.grid.is_empty(c))
    }
}
