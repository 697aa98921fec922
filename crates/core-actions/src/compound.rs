//! Compound input sub-mode.
//!
//! While active the selected cell is blanked and keystrokes go to a free-text
//! micro-editor instead of standard input. Committing keeps only the first
//! grapheme of the text, and only if it is a letter; anything else leaves
//! the cell empty. The committed cell is treated as freshly edited: lock and
//! wrong flags are cleared.

use crate::{ActionError, SelectionController};
use core_grid::letter::first_letter_grapheme;
use core_state::{CompoundInput, Gate};
use tracing::{debug, info};

impl SelectionController {
    pub fn compound_active(&self) -> bool {
        self.gate.compound().is_some()
    }

    /// Enter compound input on the selected cell, or commit (without cursor
    /// advance) when it is already active.
    pub fn toggle_compound(&mut self) -> Result<bool, ActionError> {
        if self.popup_blocks("toggle_compound") {
            return Ok(false);
        }
        if self.compound_active() {
            return Ok(self.commit_compound(false));
        }
        let Some(at) = self.selection.cell else {
            return Err(ActionError::NoSelection);
        };
        let prior = self
            .grid
            .cell(at)
            .map(|c| c.value.clone())
            .unwrap_or_default();
        self.write_value(at, "");
        self.selection.was_empty_before_edit = prior.is_empty();
        self.gate = Gate::CompoundInput(CompoundInput::new(at, &prior));
        self.detect_completion();
        info!(target: "actions.compound", row = at.row, col = at.col, "compound_enter");
        Ok(true)
    }

    pub fn compound_append(&mut self, text: &str) -> bool {
        match self.gate.compound_mut() {
            Some(input) => {
                input.push_str(text);
                true
            }
            None => false,
        }
    }

    pub fn compound_backspace(&mut self) -> bool {
        self.gate
            .compound_mut()
            .is_some_and(|input| input.pop_grapheme())
    }

    /// Leave compound input, writing the validated value. With `advance` the
    /// cursor moves exactly as after standard input.
    pub fn commit_compound(&mut self, advance: bool) -> bool {
        if !self.compound_active() {
            return false;
        }
        let Gate::CompoundInput(input) = std::mem::take(&mut self.gate) else {
            return false;
        };
        let target = input.target;
        let text = input.into_text();
        let value = first_letter_grapheme(&text).unwrap_or_default();
        if value.is_empty() && !text.is_empty() {
            debug!(target: "actions.compound", "compound_text_rejected");
        }
        self.write_value(target, &value);
        self.set_flags(target, false, false);
        self.detect_completion();
        info!(target: "actions.compound", row = target.row, col = target.col, advance, accepted = !value.is_empty(), "compound_commit");
        if advance && self.selection.cell == Some(target) {
            self.advance_after_enter(target);
        }
        true
    }

    /// Commit a pending micro-editor before any other action runs.
    pub(crate) fn settle_compound(&mut self) {
        if self.compound_active() {
            self.commit_compound(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ActionError, SelectionController};
    use core_config::AssistConfig;
    use core_grid::{Coord, Puzzle};
    use core_state::GateKind;

    fn ctl() -> SelectionController {
        SelectionController::new(
            Puzzle::from_rows("cmp", &["아이", "##"]).unwrap(),
            AssistConfig::default(),
        )
    }

    #[test]
    fn requires_selection() {
        let mut c = ctl();
        assert_eq!(c.toggle_compound(), Err(ActionError::NoSelection));
        assert_eq!(c.gate().kind(), GateKind::Idle);
    }

    #[test]
    fn non_letter_commit_leaves_cell_empty() {
        let mut c = ctl();
        c.click(Coord::new(0, 0));
        c.toggle_compound().unwrap();
        c.compound_append("5");
        assert!(c.commit_compound(true));
        assert!(c.grid().is_empty(Coord::new(0, 0)));
        assert_eq!(c.gate().kind(), GateKind::Idle);
    }

    #[test]
    fn composes_and_keeps_first_grapheme() {
        let mut c = ctl();
        c.click(Coord::new(0, 0));
        c.toggle_compound().unwrap();
        c.compound_append("ᄋ");
        c.compound_append("ᅡ");
        c.compound_append("z");
        assert!(c.compound_backspace());
        c.commit_compound(true);
        assert_eq!(c.grid().cell(Coord::new(0, 0)).unwrap().value, "아");
        assert_eq!(c.cell(), Some(Coord::new(0, 1)));
    }

    #[test]
    fn seeded_with_prior_value_and_clears_flags() {
        let mut c = ctl();
        c.click(Coord::new(0, 1));
        c.type_letter("이");
        c.click(Coord::new(0, 1));
        c.apply_op(core_events::OpScope::Cell, core_events::GridOp::Check, false)
            .unwrap();
        assert!(c.grid().is_locked(Coord::new(0, 1)));
        c.toggle_compound().unwrap();
        assert!(c.grid().is_empty(Coord::new(0, 1)));
        assert_eq!(c.gate().compound().map(|i| i.buffer()), Some("이"));
        c.toggle_compound().unwrap();
        let cell = c.grid().cell(Coord::new(0, 1)).unwrap();
        assert_eq!(cell.value, "이");
        assert!(!cell.locked && !cell.wrong);
    }

    #[test]
    fn clicking_elsewhere_commits_without_advance() {
        let mut c = ctl();
        c.click(Coord::new(0, 0));
        c.toggle_compound().unwrap();
        c.compound_append("아");
        assert!(!c.click(Coord::new(0, 0)), "same cell is ignored");
        assert!(c.compound_active());
        assert!(c.click(Coord::new(0, 1)));
        assert!(!c.compound_active());
        assert_eq!(c.grid().cell(Coord::new(0, 0)).unwrap().value, "아");
        assert_eq!(c.cell(), Some(Coord::new(0, 1)));
    }
}
