//! Steppers: algorithms re-expressed as one visible unit of progress per call.
//!
//! Every stepper owns all of its run state (sequence, grid, stacks, sets),
//! so restarting is a matter of replacing that state in one place.

pub mod astar;
pub mod bubble;
pub mod maze;
pub mod quick;

use crate::event::StepEvent;

use self::astar::AStarStepper;
use self::bubble::BubbleSortStepper;
use self::maze::MazeGenStepper;
use self::quick::QuickSortStepper;

/// The contract shared by every algorithm the sequencer can drive.
pub trait AlgorithmStepper {
    /// Perform exactly one unit of progress. Once finished, keeps returning
    /// the terminal event without touching state.
    fn step(&mut self) -> StepEvent;

    fn is_done(&self) -> bool;

    /// Throw away all run state and start over from `seed`.
    fn restart(&mut self, seed: u64);

    /// Display title.
    fn name(&self) -> &'static str;
}

/// Any of the four steppers, dispatched without boxing.
#[derive(Debug, Clone)]
pub enum Stepper {
    BubbleSort(BubbleSortStepper),
    QuickSort(QuickSortStepper),
    MazeGen(MazeGenStepper),
    AStar(AStarStepper),
}

impl AlgorithmStepper for Stepper {
    fn step(&mut self) -> StepEvent {
        match self {
            Stepper::BubbleSort(s) => s.step(),
            Stepper::QuickSort(s) => s.step(),
            Stepper::MazeGen(s) => s.step(),
            Stepper::AStar(s) => s.step(),
        }
    }

    fn is_done(&self) -> bool {
        match self {
            Stepper::BubbleSort(s) => s.is_done(),
            Stepper::QuickSort(s) => s.is_done(),
            Stepper::MazeGen(s) => s.is_done(),
            Stepper::AStar(s) => s.is_done(),
        }
    }

    fn restart(&mut self, seed: u64) {
        match self {
            Stepper::BubbleSort(s) => s.restart(seed),
            Stepper::QuickSort(s) => s.restart(seed),
            Stepper::MazeGen(s) => s.restart(seed),
            Stepper::AStar(s) => s.restart(seed),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Stepper::BubbleSort(s) => s.name(),
            Stepper::QuickSort(s) => s.name(),
            Stepper::MazeGen(s) => s.name(),
            Stepper::AStar(s) => s.name(),
        }
    }
}

/// Step until finished or `max_steps` is reached, collecting every event.
pub fn run_to_completion<S: AlgorithmStepper + ?Sized>(
    stepper: &mut S,
    max_steps: usize,
) -> Vec<StepEvent> {
    let mut events = Vec::new();
    while !stepper.is_done() && events.len() < max_steps {
        events.push(stepper.step());
    }
    events
}
