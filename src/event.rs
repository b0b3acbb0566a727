use serde::{Deserialize, Serialize};

use crate::grid::CellPos;

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The sequence is in non-decreasing order.
    Sorted,
    /// Every maze cell has been carved into the spanning tree.
    Carved,
    /// The search reached the goal.
    Solved,
    /// The open set emptied without reaching the goal.
    NoSolution,
}

/// One unit of visible progress reported by a stepper.
///
/// Produced by `step()`, consumed by the tone mapper on the frame it occurs
/// and cached for drawing until the next step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepEvent {
    /// Two positions were compared and left in place.
    Compare { i: usize, j: usize },
    /// Two positions were exchanged.
    Swap { i: usize, j: usize },
    /// A partition finished with its pivot already in its final slot.
    Pivot { index: usize },
    /// The carve moved into a fresh cell.
    Visit { cell: CellPos },
    /// The carve backed up to a cell on its stack.
    Backtrack { cell: CellPos },
    /// A node was closed; `to` lists the neighbors whose scores improved.
    Expand { from: CellPos, to: Vec<CellPos> },
    /// The goal was selected; `path_len` counts moves from the start.
    FoundGoal { path_len: usize },
    Done { outcome: Outcome },
}

impl StepEvent {
    /// True for the events that end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepEvent::FoundGoal { .. } | StepEvent::Done { .. })
    }
}
