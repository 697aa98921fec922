//! The selection controller: one instance per puzzle session.

use core_config::AssistConfig;
use core_grid::{Board, Clue, Coord, Direction, Grid, Heading, Puzzle, word_answer, word_span, word_text};
use core_state::{Gate, RestoreReport, SelectionState, Snapshot};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Continuations run on the next turn of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Deferred {
    CompletionFeedback,
}

#[derive(Debug)]
pub struct SelectionController {
    pub(crate) puzzle: Puzzle,
    pub(crate) grid: Grid,
    pub(crate) selection: SelectionState,
    pub(crate) gate: Gate,
    pub(crate) assist: AssistConfig,
    /// True while the grid matches the solution. The completion signal is
    /// raised only when this flips from false to true.
    pub(crate) completed: bool,
    pub(crate) deferred: VecDeque<Deferred>,
    /// Cells whose value or flags changed since the last `take_written`.
    pub(crate) written: Vec<Coord>,
}

impl SelectionController {
    pub fn new(puzzle: Puzzle, assist: AssistConfig) -> Self {
        let grid = Grid::from_puzzle(&puzzle);
        let completed = grid.cells_equal_grid();
        info!(
            target: "actions.dispatch",
            puzzle = puzzle.id(),
            dimensions = puzzle.dimensions(),
            smart_skip = assist.smart_skip,
            auto_advance_word = assist.auto_advance_word,
            check_as_you_type = assist.check_as_you_type,
            "session_started"
        );
        Self {
            puzzle,
            grid,
            selection: SelectionState::default(),
            gate: Gate::Idle,
            assist,
            completed,
            deferred: VecDeque::new(),
            written: Vec::new(),
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn cell(&self) -> Option<Coord> {
        self.selection.cell
    }

    pub fn direction(&self) -> Direction {
        self.selection.direction
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn assist(&self) -> AssistConfig {
        self.assist
    }

    pub fn set_assist(&mut self, assist: AssistConfig) {
        self.assist = assist;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Live uppercased text of the selected word.
    pub fn current_word_text(&self) -> Option<String> {
        self.selection
            .cell
            .map(|c| word_text(&self.grid, c, self.selection.direction))
    }

    /// Clue whose word contains the selection in the current direction.
    pub fn clue_for_selection(&self) -> Option<&Clue> {
        let at = self.selection.cell?;
        let direction = self.selection.direction;
        let span = word_span(&self.grid, at, direction);
        self.puzzle
            .clues()
            .iter()
            .find(|c| c.direction == direction && span.contains(c.start))
    }

    /// Raise the intro popup gate. Ignored unless the controller is idle.
    pub fn show_onload(&mut self) -> bool {
        if !matches!(self.gate, Gate::Idle) {
            return false;
        }
        self.gate = Gate::OnloadGate;
        debug!(target: "actions.dispatch", gate = self.gate.kind().as_str(), "gate_set");
        true
    }

    pub fn dismiss_popup(&mut self) -> bool {
        if !self.gate.is_popup() {
            return false;
        }
        debug!(target: "actions.dispatch", gate = self.gate.kind().as_str(), "popup_dismissed");
        self.gate = Gate::Idle;
        true
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Run one deferred continuation. Returns true when completion feedback
    /// was delivered (selection cleared, completion popup gate set).
    pub fn tick(&mut self) -> bool {
        match self.deferred.pop_front() {
            Some(Deferred::CompletionFeedback) if self.completed => {
                self.selection.clear();
                self.gate = Gate::CompletionGate;
                info!(target: "actions.dispatch", puzzle = self.puzzle.id(), "completion_feedback");
                true
            }
            Some(Deferred::CompletionFeedback) => {
                debug!(target: "actions.dispatch", "completion_feedback_stale");
                false
            }
            None => false,
        }
    }

    /// Drain the set of cells touched since the previous call, in first-touch
    /// order.
    pub fn take_written(&mut self) -> Vec<Coord> {
        let mut out = Vec::with_capacity(self.written.len());
        for c in self.written.drain(..) {
            if !out.contains(&c) {
                out.push(c);
            }
        }
        out
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.puzzle.id(), &self.grid, &self.selection)
    }

    /// Load saved progress. A stale snapshot leaves the session untouched.
    /// Completion is primed from the restored grid without raising the signal.
    pub fn restore(&mut self, snapshot: &Snapshot) -> RestoreReport {
        let report = snapshot.apply_to(self.puzzle.id(), &mut self.grid);
        if report == RestoreReport::Stale {
            return report;
        }
        self.gate = match std::mem::take(&mut self.gate) {
            Gate::CompoundInput(_) => Gate::Idle,
            other => other,
        };
        self.selection.direction = snapshot.direction;
        match snapshot.selection {
            Some(c) if !self.grid.is_blocked(c) => self.focus(c),
            _ => self.selection.clear(),
        }
        self.completed = self.grid.cells_equal_grid();
        self.deferred.clear();
        info!(
            target: "actions.dispatch",
            completed = self.completed,
            selected = self.selection.is_active(),
            "progress_restored"
        );
        report
    }

    // ---------------------------------------------------------------------
    // crate-internal helpers
    // ---------------------------------------------------------------------

    /// Move focus to `coord` keeping the current direction, and recompute the
    /// cached word.
    pub(crate) fn focus(&mut self, coord: Coord) {
        self.selection.cell = Some(coord);
        self.refresh_word();
    }

    pub(crate) fn refresh_word(&mut self) {
        self.selection.current_word = self
            .selection
            .cell
            .map(|c| word_answer(&self.grid, c, self.selection.direction));
    }

    pub(crate) fn flip_direction(&mut self) {
        self.selection.direction = self.selection.direction.flip();
    }

    /// Popups suppress all input until dismissed.
    pub(crate) fn popup_blocks(&self, what: &'static str) -> bool {
        if self.gate.is_popup() {
            debug!(target: "actions.dispatch", what, gate = self.gate.kind().as_str(), "suppressed_by_popup");
            return true;
        }
        false
    }

    pub(crate) fn write_value(&mut self, coord: Coord, value: &str) -> bool {
        let unchanged = self.grid.cell(coord).is_some_and(|c| c.value == value);
        if unchanged {
            return false;
        }
        if self.grid.set_value(coord, value) {
            self.written.push(coord);
            return true;
        }
        false
    }

    pub(crate) fn set_flags(&mut self, coord: Coord, locked: bool, wrong: bool) {
        if let Some(cell) = self.grid.cell_mut(coord) {
            if cell.blocked || (cell.locked == locked && cell.wrong == wrong) {
                return;
            }
            cell.locked = locked;
            cell.wrong = wrong;
            self.written.push(coord);
        }
    }

    pub(crate) fn clear_wrong(&mut self, coord: Coord) {
        let locked = self.grid.is_locked(coord);
        self.set_flags(coord, locked, false);
    }

    /// Full-grid comparison after a mutation. Queues completion feedback on
    /// the transition into the completed state and re-arms on any mutation
    /// that leaves the grid incomplete.
    pub(crate) fn detect_completion(&mut self) {
        let complete = self.grid.cells_equal_grid();
        if complete && !self.completed {
            self.completed = true;
            self.deferred.push_back(Deferred::CompletionFeedback);
            info!(target: "actions.dispatch", puzzle = self.puzzle.id(), "crossword_completed");
        } else if !complete && self.completed {
            debug!(target: "actions.dispatch", "completion_rearmed");
            self.completed = false;
        }
    }

    /// Next / previous clue in list order (ACROSS by number, then DOWN),
    /// wrapping. Without a current clue, the first / last clue.
    pub(crate) fn neighbour_clue(&self, heading: Heading) -> Option<&Clue> {
        let clues = self.puzzle.clues();
        if clues.is_empty() {
            return None;
        }
        let current = self
            .clue_for_selection()
            .and_then(|c| self.puzzle.clue_index(c.number, c.direction));
        let idx = match (current, heading) {
            (Some(i), Heading::Forward) => (i + 1) % clues.len(),
            (Some(i), Heading::Backward) => (i + clues.len() - 1) % clues.len(),
            (None, Heading::Forward) => 0,
            (None, Heading::Backward) => clues.len() - 1,
        };
        clues.get(idx)
    }
}
