//! Bubble sort, one comparison per step.

use tracing::{debug, info};

use crate::event::{Outcome, StepEvent};
use crate::sequence::{self, Bar};

use super::AlgorithmStepper;

#[derive(Debug, Clone)]
pub struct BubbleSortStepper {
    bars: Vec<Bar>,
    /// Left index of the pair compared by the next step.
    position: usize,
    /// Whether the current pass has swapped anything yet.
    swapped: bool,
    done: bool,
    passes: usize,
    comparisons: usize,
    swaps: usize,
}

impl BubbleSortStepper {
    pub fn new(bars: Vec<Bar>) -> Self {
        BubbleSortStepper {
            bars,
            position: 0,
            swapped: false,
            done: false,
            passes: 0,
            comparisons: 0,
            swaps: 0,
        }
    }

    pub fn from_values(values: &[u32]) -> Self {
        Self::new(sequence::bars_from_values(values))
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// The pair the next step will compare, if a step is pending.
    pub fn active_pair(&self) -> Option<(usize, usize)> {
        if self.done || self.bars.len() < 2 {
            None
        } else {
            let p = if self.position + 1 >= self.bars.len() { 0 } else { self.position };
            Some((p, p + 1))
        }
    }

    /// Completed passes, including the final pass without swaps.
    pub fn passes(&self) -> usize {
        self.passes
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
            passes = self.passes,
            comparisons = self.comparisons,
            swaps = self.swaps,
            "bubble sort finished"
        );
        StepEvent::Done { outcome: Outcome::Sorted }
    }
}

impl AlgorithmStepper for BubbleSortStepper {
    fn step(&mut self) -> StepEvent {
        if self.done {
            return StepEvent::Done { outcome: Outcome::Sorted };
        }
        if self.bars.len() < 2 {
            return self.finish();
        }

        if self.position + 1 >= self.bars.len() {
            self.passes += 1;
            if !self.swapped {
                return self.finish();
            }
            self.position = 0;
            self.swapped = false;
        }

        let (i, j) = (self.position, self.position + 1);
        self.comparisons += 1;
        self.position += 1;
        // Strict comparison: equal heights keep their order.
        if self.bars[i].value > self.bars[j].value {
            self.bars.swap(i, j);
            self.swaps += 1;
            self.swapped = true;
            StepEvent::Swap { i, j }
        } else {
            StepEvent::Compare { i, j }
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn restart(&mut self, seed: u64) {
        debug!(seed, "restarting bubble sort");
        self.bars.sort_by_key(|b| b.index);
        sequence::shuffle(&mut self.bars, seed);
        self.position = 0;
        self.swapped = false;
        self.done = false;
        self.passes = 0;
        self.comparisons = 0;
        self.swaps = 0;
    }

    fn name(&self) -> &'static str {
        "Bubble Sort"
    }
}
