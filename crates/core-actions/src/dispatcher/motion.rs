//! Selection-changing actions.

use super::DispatchResult;
use crate::{Action, SelectionController};

pub(crate) fn handle_motion(action: Action, ctl: &mut SelectionController) -> DispatchResult {
    let before = (ctl.cell(), ctl.direction());
    let changed = match action {
        Action::Arrow(key) => ctl.arrow_move(key),
        Action::Alternate => ctl.alternate(),
        Action::Deselect => ctl.deselect(),
        Action::Click(coord) => ctl.click(coord),
        Action::SelectClue { number, direction } => ctl.select_clue(number, direction),
        Action::CycleWord(heading) => ctl.cycle_word(heading),
        _ => false,
    };
    let after = (ctl.cell(), ctl.direction());
    if changed {
        tracing::trace!(target: "actions.dispatch", ?before, ?after, "motion");
    }
    DispatchResult::from_changed(changed)
}
