//! Progress snapshots.
//!
//! A snapshot captures every cell's value and flags plus the selection, keyed
//! by the puzzle id. The layout is plain JSON so an external collaborator can
//! store it anywhere; the file helpers below are what the runtime uses.

use crate::SelectionState;
use anyhow::{Context, Result};
use core_grid::letter::is_letter_grapheme;
use core_grid::{Board, Coord, Direction, Grid, is_correct};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub wrong: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub puzzle_id: String,
    /// Row-major; blocked cells are stored as default entries.
    pub cells: Vec<Vec<CellSnapshot>>,
    #[serde(default)]
    pub selection: Option<Coord>,
    #[serde(default)]
    pub direction: Direction,
}

/// Outcome of applying a snapshot to a live grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreReport {
    Applied { blanked: usize },
    /// Different puzzle id or dimensions; nothing was touched.
    Stale,
}

impl Snapshot {
    pub fn capture(puzzle_id: &str, grid: &Grid, selection: &SelectionState) -> Self {
        let cells = grid
            .rows()
            .map(|row| {
                row.iter()
                    .map(|c| CellSnapshot {
                        value: c.value.clone(),
                        locked: c.locked,
                        wrong: c.wrong,
                    })
                    .collect()
            })
            .collect();
        Self {
            puzzle_id: puzzle_id.to_string(),
            cells,
            selection: selection.cell,
            direction: selection.direction,
        }
    }

    pub fn matches(&self, puzzle_id: &str, dimensions: usize) -> bool {
        self.puzzle_id == puzzle_id
            && self.cells.len() == dimensions
            && self.cells.iter().all(|r| r.len() == dimensions)
    }

    /// Write cell values and flags into `grid`. Values that are not a single
    /// letter grapheme are blanked; blocked cells are skipped. Flags that
    /// contradict the restored value are dropped.
    pub fn apply_to(&self, puzzle_id: &str, grid: &mut Grid) -> RestoreReport {
        if !self.matches(puzzle_id, grid.dimensions()) {
            warn!(
                target: "state.persist",
                expected = puzzle_id,
                found = %self.puzzle_id,
                "snapshot_stale_discarded"
            );
            return RestoreReport::Stale;
        }
        let mut blanked = 0;
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, saved) in cells.iter().enumerate() {
                let Some(cell) = grid.cell_mut(Coord::new(row, col)) else {
                    continue;
                };
                if cell.blocked {
                    continue;
                }
                let valid = saved.value.is_empty() || is_letter_grapheme(&saved.value);
                if !valid {
                    blanked += 1;
                }
                cell.value = if valid {
                    saved.value.clone()
                } else {
                    String::new()
                };
                // A lock only survives on a correct value; a wrong flag only
                // on a filled, unlocked cell.
                cell.locked = valid && saved.locked && is_correct(&cell.value, &cell.solution);
                cell.wrong = valid && saved.wrong && !cell.value.is_empty() && !cell.locked;
            }
        }
        debug!(target: "state.persist", blanked, "snapshot_applied");
        RestoreReport::Applied { blanked }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("serializing snapshot")
    }

    pub fn from_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).context("parsing snapshot")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(target: "state.persist", path = %path.display(), "snapshot_saved");
        Ok(())
    }

    /// `Ok(None)` when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!(target: "state.persist", path = %path.display(), "snapshot_missing");
            return Ok(None);
        }
        let payload =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let snap = Self::from_json(&payload)?;
        info!(target: "state.persist", path = %path.display(), puzzle_id = %snap.puzzle_id, "snapshot_loaded");
        Ok(Some(snap))
    }
}
