//! Quicksort (Lomuto partition) driven by an explicit range stack.
//!
//! The recursive form cannot stop halfway through a partition, so pending
//! sub-ranges live on a work stack and the partition in progress keeps its
//! scan cursors. Each step performs one comparison or one swap.

use tracing::{debug, info};

use crate::event::{Outcome, StepEvent};
use crate::sequence::{self, Bar};

use super::AlgorithmStepper;

/// A partition of `low..=high` in progress; the pivot sits at `high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub low: usize,
    pub high: usize,
    /// Next slot for an element not greater than the pivot.
    pub store: usize,
    /// Next element to compare against the pivot.
    pub scan: usize,
}

#[derive(Debug, Clone)]
pub struct QuickSortStepper {
    bars: Vec<Bar>,
    /// Inclusive ranges still to partition; the top is processed next.
    stack: Vec<(usize, usize)>,
    active: Option<Partition>,
    done: bool,
    comparisons: usize,
    swaps: usize,
}

impl QuickSortStepper {
    pub fn new(bars: Vec<Bar>) -> Self {
        let mut stepper = QuickSortStepper {
            bars,
            stack: Vec::new(),
            active: None,
            done: false,
            comparisons: 0,
            swaps: 0,
        };
        stepper.seed_stack();
        stepper
    }

    pub fn from_values(values: &[u32]) -> Self {
        Self::new(sequence::bars_from_values(values))
    }

    fn seed_stack(&mut self) {
        self.stack.clear();
        if self.bars.len() >= 2 {
            self.stack.push((0, self.bars.len() - 1));
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn partition(&self) -> Option<&Partition> {
        self.active.as_ref()
    }

    /// Ranges waiting to be partitioned, bottom of the stack first.
    pub fn pending(&self) -> &[(usize, usize)] {
        &self.stack
    }

    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    pub fn swaps(&self) -> usize {
        self.swaps
    }

    fn finish(&mut self) -> StepEvent {
        self.done = true;
        info!(
            bars = self.bars.len(),
            comparisons = self.comparisons,
            swaps = self.swaps,
            "quicksort finished"
        );
        StepEvent::Done { outcome: Outcome::Sorted }
    }

    /// Advance the active partition by one comparison or swap.
    fn advance(&mut self, mut part: Partition) -> StepEvent {
        if part.scan < part.high {
            let j = part.scan;
            part.scan += 1;
            self.comparisons += 1;
            let event = if self.bars[j].value <= self.bars[part.high].value {
                let i = part.store;
                part.store += 1;
                if i != j {
                    self.bars.swap(i, j);
                    self.swaps += 1;
                    StepEvent::Swap { i, j }
                } else {
                    StepEvent::Compare { i: j, j: part.high }
                }
            } else {
                StepEvent::Compare { i: j, j: part.high }
            };
            self.active = Some(part);
            return event;
        }

        // Scan complete: drop the pivot into its slot and queue both sides.
        let p = part.store;
        self.active = None;
        if p + 1 < part.high {
            self.stack.push((p + 1, part.high));
        }
        if p > part.low + 1 {
            self.stack.push((part.low, p - 1));
        }
        if p != part.high {
            self.bars.swap(p, part.high);
            self.swaps += 1;
            StepEvent::Swap { i: p, j: part.high }
        } else {
            StepEvent::Pivot { index: p }
        }
    }
}

impl AlgorithmStepper for QuickSortStepper {
    fn step(&mut self) -> StepEvent {
        if self.done {
            return StepEvent::Done { outcome: Outcome::Sorted };
        }
        if let Some(part) = self.active {
            return self.advance(part);
        }
        match self.stack.pop() {
            Some((low, high)) => {
                let part = Partition {
                    low,
                    high,
                    store: low,
                    scan: low,
                };
                self.advance(part)
            }
            None => self.finish(),
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn restart(&mut self, seed: u64) {
        debug!(seed, "restarting quicksort");
        self.bars.sort_by_key(|b| b.index);
        sequence::shuffle(&mut self.bars, seed);
        self.active = None;
        self.done = false;
        self.comparisons = 0;
        self.swaps = 0;
        self.seed_stack();
    }

    fn name(&self) -> &'static str {
        "Quick Sort"
    }
}
