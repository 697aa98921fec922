//! Dispatcher applying `Action` to the selection controller.
//!
//! Sub-modules:
//! * `motion` - selection changes (click, arrows, clue list, word cycling,
//!   spacebar, escape)
//! * `edit`   - standard input and grid operations
//! * `mode`   - gate transitions (popup dismissal, compound input)
//!
//! After the handler runs, cells touched during the action are reported to
//! observers through `on_cell_written`, and any prompt raised by the handler
//! through `on_prompt`. Completion feedback is not delivered here; it is
//! queued by the controller and flushed by `run_deferred`.

use crate::{Action, SessionObserver, SelectionController};
use core_state::Prompt;

mod edit;
mod mode;
mod motion;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    pub dirty: bool,
    /// At least one cell value or flag changed; persistence should save.
    pub grid_mutated: bool,
    pub prompt: Option<Prompt>,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            grid_mutated: false,
            prompt: None,
        }
    }

    pub fn clean() -> Self {
        Self {
            dirty: false,
            grid_mutated: false,
            prompt: None,
        }
    }

    pub fn prompt(prompt: Prompt) -> Self {
        Self {
            dirty: true,
            grid_mutated: false,
            prompt: Some(prompt),
        }
    }

    pub(crate) fn from_changed(changed: bool) -> Self {
        if changed { Self::dirty() } else { Self::clean() }
    }
}

/// Apply an action. Returns whether a redraw is needed, whether the grid
/// changed and any prompt for the user.
pub fn dispatch(
    action: Action,
    controller: &mut SelectionController,
    observers: &[Box<dyn SessionObserver>],
) -> DispatchResult {
    for obs in observers {
        obs.on_action(&action);
    }
    tracing::trace!(target: "actions.dispatch", ?action, gate = controller.gate().kind().as_str(), "dispatch");

    let mut result = match action {
        Action::Type(_) | Action::TypeText(_) | Action::Erase | Action::Apply { .. } => {
            edit::handle_edit(action, controller)
        }
        Action::ToggleCompound
        | Action::CompoundAppend(_)
        | Action::CompoundBackspace
        | Action::CompoundCommit { .. }
        | Action::DismissPopup => mode::handle_mode(action, controller),
        Action::Arrow(_)
        | Action::Alternate
        | Action::Deselect
        | Action::Click(_)
        | Action::SelectClue { .. }
        | Action::CycleWord(_) => motion::handle_motion(action, controller),
    };

    let written = controller.take_written();
    if !written.is_empty() {
        result.dirty = true;
        result.grid_mutated = true;
        for coord in written {
            if let Some(cell) = controller.grid().cell(coord) {
                for obs in observers {
                    obs.on_cell_written(coord, cell);
                }
            }
        }
    }
    if let Some(prompt) = result.prompt {
        tracing::info!(target: "actions.dispatch", %prompt, "prompt");
        for obs in observers {
            obs.on_prompt(prompt);
        }
    }
    result
}

/// Flush deferred continuations (the next turn of the event loop). Observers
/// receive `on_completed` when completion feedback is delivered.
pub fn run_deferred(
    controller: &mut SelectionController,
    observers: &[Box<dyn SessionObserver>],
) -> DispatchResult {
    let mut result = DispatchResult::clean();
    while controller.has_deferred() {
        if controller.tick() {
            result.dirty = true;
            for obs in observers {
                obs.on_completed();
            }
        }
    }
    result
}
