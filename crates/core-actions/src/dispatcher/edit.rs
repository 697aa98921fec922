//! Standard input and grid operations.

use super::DispatchResult;
use crate::{Action, SelectionController};

pub(crate) fn handle_edit(action: Action, ctl: &mut SelectionController) -> DispatchResult {
    match action {
        Action::Type(text) => DispatchResult::from_changed(ctl.type_letter(&text)),
        Action::TypeText(text) => DispatchResult::from_changed(ctl.type_text(&text)),
        Action::Erase => DispatchResult::from_changed(ctl.erase()),
        Action::Apply {
            scope,
            op,
            only_unchecked,
        } => match ctl.apply_op(scope, op, only_unchecked) {
            Ok(changed) => DispatchResult::from_changed(changed),
            Err(e) => DispatchResult::prompt(e.prompt()),
        },
        _ => DispatchResult::clean(),
    }
}
