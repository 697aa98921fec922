//! Selection controller and action dispatch.
//!
//! Input flows through three layers:
//! * `KeyTranslator` turns normalized `InputEvent`s into `Action`s, taking the
//!   current `Gate` into account (popups swallow input, compound input owns
//!   the keyboard).
//! * `dispatch` applies one `Action` to the `SelectionController` and
//!   notifies `SessionObserver`s about written cells, prompts and completion.
//! * `SelectionController` owns the grid, the selection and the gate. Its
//!   methods implement the cursor transitions, grid operations and the
//!   compound input sub-mode, and are usable directly without the dispatcher.
//!
//! Everything here is synchronous. Completion feedback is the one deferred
//! step: the controller queues it and the runtime drains it with
//! `run_deferred` before reading the next event.

use core_events::{GridOp, OpScope};
use core_grid::{Cell, Coord, Direction, Heading};
use core_state::Prompt;
use thiserror::Error;

mod compound;
mod controller;
mod cursor;
pub mod dispatcher;
mod key_translator;
mod ops;

pub use controller::SelectionController;
pub use dispatcher::{DispatchResult, dispatch, run_deferred};
pub use key_translator::KeyTranslator;

/// High-level actions produced by the translator and consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// One keystroke of standard input. Accepted only when it is a single
    /// letter grapheme.
    Type(String),
    /// Committed text (IME / paste). Each grapheme is typed in turn.
    TypeText(String),
    /// Backspace / Delete in standard input.
    Erase,
    Arrow(ArrowKey),
    /// Spacebar at an intersection.
    Alternate,
    Deselect,
    Click(Coord),
    SelectClue {
        number: u32,
        direction: Direction,
    },
    CycleWord(Heading),
    Apply {
        scope: OpScope,
        op: GridOp,
        only_unchecked: bool,
    },
    ToggleCompound,
    CompoundAppend(String),
    CompoundBackspace,
    CompoundCommit {
        advance: bool,
    },
    DismissPopup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    /// Axis and heading the key moves along.
    pub fn motion(self) -> (Direction, Heading) {
        match self {
            ArrowKey::Up => (Direction::Down, Heading::Backward),
            ArrowKey::Down => (Direction::Down, Heading::Forward),
            ArrowKey::Left => (Direction::Across, Heading::Backward),
            ArrowKey::Right => (Direction::Across, Heading::Forward),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("operation requires a selected cell")]
    NoSelection,
}

impl ActionError {
    /// User-facing prompt for this error.
    pub fn prompt(self) -> Prompt {
        match self {
            ActionError::NoSelection => Prompt::NoCellSelected,
        }
    }
}

/// Observer hooks for collaborators outside the core (popups, persistence,
/// audio). All methods default to no-ops.
pub trait SessionObserver {
    fn on_action(&self, _action: &Action) {}
    fn on_prompt(&self, _prompt: Prompt) {}
    /// Called once per cell whose value or flags changed during an action.
    fn on_cell_written(&self, _coord: Coord, _cell: &Cell) {}
    /// Fired exactly once per transition into the completed state, on the
    /// tick after the mutation that completed the grid.
    fn on_completed(&self) {}
}
