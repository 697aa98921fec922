//! Grid operations: reveal, check and clear at cell, word or grid scope.

use crate::{ActionError, SelectionController};
use core_events::{GridOp, OpScope};
use core_grid::{Coord, WordCoords, is_correct, word_coords};
use tracing::info;

impl SelectionController {
    /// Apply `op` to every cell in `scope`. Cell and word scopes need a
    /// selection; grid scope does not. `only_unchecked` makes `Clear` skip
    /// locked cells. Returns whether any cell changed.
    pub fn apply_op(
        &mut self,
        scope: OpScope,
        op: GridOp,
        only_unchecked: bool,
    ) -> Result<bool, ActionError> {
        if self.popup_blocks("apply_op") {
            return Ok(false);
        }
        if scope != OpScope::Grid && self.selection.cell.is_none() {
            info!(target: "actions.ops", scope = scope.as_str(), op = op.as_str(), "no_selection");
            return Err(ActionError::NoSelection);
        }
        self.settle_compound();
        let targets: WordCoords = match (scope, self.selection.cell) {
            (OpScope::Grid, _) => self.grid.open_cells().collect(),
            (OpScope::Cell, Some(at)) => WordCoords::from_slice(&[at]),
            (OpScope::Word, Some(at)) => word_coords(&self.grid, at, self.selection.direction),
            (_, None) => return Err(ActionError::NoSelection),
        };
        let mut changed = 0usize;
        for &coord in &targets {
            if self.apply_to_cell(coord, op, only_unchecked) {
                changed += 1;
            }
        }
        info!(
            target: "actions.ops",
            scope = scope.as_str(),
            op = op.as_str(),
            only_unchecked,
            cells = targets.len(),
            changed,
            "apply_op"
        );
        self.detect_completion();
        Ok(changed > 0)
    }

    /// `check` on a single cell: empty cells are untouched, a correct value
    /// locks, an incorrect one is flagged and unlocked.
    pub(crate) fn check_cell(&mut self, coord: Coord) -> bool {
        let Some(cell) = self.grid.cell(coord) else {
            return false;
        };
        if cell.blocked || cell.is_empty() {
            return false;
        }
        let (locked, wrong) = if is_correct(&cell.value, &cell.solution) {
            (true, false)
        } else {
            (false, true)
        };
        let before = (cell.locked, cell.wrong);
        self.set_flags(coord, locked, wrong);
        before != (locked, wrong)
    }

    fn apply_to_cell(&mut self, coord: Coord, op: GridOp, only_unchecked: bool) -> bool {
        match op {
            GridOp::Reveal => {
                let Some((solution, before)) = self
                    .grid
                    .cell(coord)
                    .map(|c| (c.solution.clone(), (c.locked, c.wrong)))
                else {
                    return false;
                };
                let wrote = self.write_value(coord, &solution);
                self.set_flags(coord, true, false);
                wrote || before != (true, false)
            }
            GridOp::Check => self.check_cell(coord),
            GridOp::Clear => {
                if only_unchecked && self.grid.is_locked(coord) {
                    return false;
                }
                let had_flags = self
                    .grid
                    .cell(coord)
                    .is_some_and(|c| c.locked || c.wrong);
                let wrote = self.write_value(coord, "");
                self.set_flags(coord, false, false);
                wrote || had_flags
            }
        }
    }
}
