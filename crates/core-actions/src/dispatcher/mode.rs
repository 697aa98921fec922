//! Gate transitions: popup dismissal and the compound input sub-mode.

use super::DispatchResult;
use crate::{Action, SelectionController};

pub(crate) fn handle_mode(action: Action, ctl: &mut SelectionController) -> DispatchResult {
    match action {
        Action::DismissPopup => DispatchResult::from_changed(ctl.dismiss_popup()),
        Action::ToggleCompound => match ctl.toggle_compound() {
            Ok(changed) => DispatchResult::from_changed(changed),
            Err(e) => DispatchResult::prompt(e.prompt()),
        },
        Action::CompoundAppend(text) => DispatchResult::from_changed(ctl.compound_append(&text)),
        Action::CompoundBackspace => DispatchResult::from_changed(ctl.compound_backspace()),
        Action::CompoundCommit { advance } => {
            DispatchResult::from_changed(ctl.commit_compound(advance))
        }
        _ => DispatchResult::clean(),
    }
}
