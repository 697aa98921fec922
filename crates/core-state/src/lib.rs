//! Session state: selection, input gating, prompts and persisted progress.
//!
//! The selection controller (in `core-actions`) owns exactly one
//! `SelectionState` and one `Gate` per puzzle session. This crate keeps the
//! data and its invariants; transition logic lives in the action layer.
//!
//! Invariants:
//! * `SelectionState::cell` is `Some` iff a cell/word is focused. `direction`
//!   is only meaningful while `cell` is `Some`, but is kept across deselects
//!   so the next click starts on the last used axis.
//! * `current_word` is `Some` iff `cell` is `Some`.
//! * `Gate::CompoundInput` always targets the currently selected cell; the
//!   controller commits the micro-editor before the selection moves elsewhere.
//!
//! Gate legality:
//! * `Idle`: every transition is allowed.
//! * `OnloadGate` / `CompletionGate`: input is suppressed and grid mutations
//!   are refused; only dismissing the popup returns to `Idle`.
//! * `CompoundInput`: keyboard input edits the micro-editor; only the exit
//!   keys leave the sub-mode.

use core_grid::{Coord, Direction};
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

pub mod persist;
pub use persist::{CellSnapshot, RestoreReport, Snapshot};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub cell: Option<Coord>,
    pub direction: Direction,
    /// Uppercased answer of the selected word, cached on every selection
    /// change. Identifies the word (and its clue) independently of the values
    /// typed so far.
    pub current_word: Option<String>,
    /// Set by a write into a previously empty cell and consumed by the
    /// smart-skip advance that follows it.
    pub was_empty_before_edit: bool,
}

impl SelectionState {
    pub fn is_active(&self) -> bool {
        self.cell.is_some()
    }

    /// Drop focus. Direction is retained.
    pub fn clear(&mut self) {
        self.cell = None;
        self.current_word = None;
        self.was_empty_before_edit = false;
    }
}

/// Free-text micro-editor bound to one cell while compound input is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundInput {
    pub target: Coord,
    buffer: String,
}

impl CompoundInput {
    /// Open the editor seeded with the cell's prior value.
    pub fn new(target: Coord, prior: &str) -> Self {
        Self {
            target,
            buffer: prior.to_string(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Remove the last grapheme cluster. Returns false when already empty.
    pub fn pop_grapheme(&mut self) -> bool {
        match self.buffer.grapheme_indices(true).next_back() {
            Some((at, _)) => {
                self.buffer.truncate(at);
                true
            }
            None => false,
        }
    }

    pub fn into_text(self) -> String {
        self.buffer
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Gate {
    #[default]
    Idle,
    /// Intro popup visible (or about to be); input suppressed.
    OnloadGate,
    /// Completion popup visible; input suppressed.
    CompletionGate,
    CompoundInput(CompoundInput),
}

/// Payload-free view of `Gate`, used by key translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    Idle,
    Onload,
    Completion,
    Compound,
}

impl Gate {
    pub fn kind(&self) -> GateKind {
        match self {
            Gate::Idle => GateKind::Idle,
            Gate::OnloadGate => GateKind::Onload,
            Gate::CompletionGate => GateKind::Completion,
            Gate::CompoundInput(_) => GateKind::Compound,
        }
    }

    pub fn is_popup(&self) -> bool {
        matches!(self, Gate::OnloadGate | Gate::CompletionGate)
    }

    pub fn compound(&self) -> Option<&CompoundInput> {
        match self {
            Gate::CompoundInput(c) => Some(c),
            _ => None,
        }
    }

    pub fn compound_mut(&mut self) -> Option<&mut CompoundInput> {
        match self {
            Gate::CompoundInput(c) => Some(c),
            _ => None,
        }
    }
}

impl GateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GateKind::Idle => "idle",
            GateKind::Onload => "onload",
            GateKind::Completion => "completion",
            GateKind::Compound => "compound",
        }
    }
}

/// User-facing prompt messages raised by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    NoCellSelected,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::NoCellSelected => {
                f.write_str("To perform this operation, you must first select a cell.")
            }
        }
    }
}
