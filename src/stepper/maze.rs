//! Randomized depth-first maze carving.
//!
//! Starts from a grid with every wall standing and carves a spanning tree:
//! each step either moves into a random unvisited neighbor (removing the
//! wall between) or backs up one cell on the explicit stack.

use rand::Rng;
use tracing::{debug, info};

use crate::event::{Outcome, StepEvent};
use crate::grid::{CellPos, Direction, Grid};
use crate::rng::{self, RunRng};

use super::AlgorithmStepper;
use super::astar::NavGrid;

/// One maze cell; walls are indexed `[N, E, S, W]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MazeCell {
    pub walls: [bool; 4],
    pub visited: bool,
}

impl Default for MazeCell {
    fn default() -> Self {
        MazeCell {
            walls: [true; 4],
            visited: false,
        }
    }
}

impl MazeCell {
    pub fn has_wall(&self, dir: Direction) -> bool {
        self.walls[dir.wall_index()]
    }
}

pub type Maze = Grid<MazeCell>;

/// Remove the wall shared by `from` and its neighbor in direction `dir`.
pub fn carve(maze: &mut Maze, from: CellPos, dir: Direction) {
    let Some(to) = maze.neighbor(from, dir) else {
        return;
    };
    if let Some(cell) = maze.get_mut(from) {
        cell.walls[dir.wall_index()] = false;
    }
    if let Some(cell) = maze.get_mut(to) {
        cell.walls[dir.opposite().wall_index()] = false;
    }
}

#[derive(Debug, Clone)]
pub struct MazeGenStepper {
    maze: Maze,
    current: CellPos,
    stack: Vec<CellPos>,
    rng: RunRng,
    done: bool,
    carved: usize,
    nav: Option<NavGrid>,
}

impl MazeGenStepper {
    pub fn new(cols: usize, rows: usize, seed: u64) -> Self {
        MazeGenStepper {
            maze: Grid::from_fn(cols, rows, |_| MazeCell::default()),
            current: CellPos::new(0, 0),
            stack: Vec::new(),
            rng: rng::seeded(seed),
            done: false,
            carved: 0,
            nav: None,
        }
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// The carve head, while carving is in progress.
    pub fn current(&self) -> Option<CellPos> {
        (!self.done && !self.maze.is_empty()).then_some(self.current)
    }

    pub fn stack(&self) -> &[CellPos] {
        &self.stack
    }

    /// Number of walls removed so far.
    pub fn carved(&self) -> usize {
        self.carved
    }

    /// Passage graph of the finished maze; `None` until carving completes.
    pub fn nav_grid(&self) -> Option<&NavGrid> {
        self.nav.as_ref()
    }

    fn unvisited_neighbors(&self, pos: CellPos) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| {
                self.maze
                    .neighbor(pos, dir)
                    .and_then(|next| self.maze.get(next))
                    .is_some_and(|cell| !cell.visited)
            })
            .collect()
    }

    fn mark_visited(&mut self, pos: CellPos) {
        if let Some(cell) = self.maze.get_mut(pos) {
            cell.visited = true;
        }
    }

    fn finish(&mut self) -> StepEvent {
        self.done = true;
        self.nav = Some(NavGrid::from_maze(&self.maze));
        info!(
            cols = self.maze.cols(),
            rows = self.maze.rows(),
            carved = self.carved,
            "maze carved"
        );
        StepEvent::Done { outcome: Outcome::Carved }
    }
}

impl AlgorithmStepper for MazeGenStepper {
    fn step(&mut self) -> StepEvent {
        if self.done {
            return StepEvent::Done { outcome: Outcome::Carved };
        }
        if self.maze.is_empty() {
            return self.finish();
        }

        self.mark_visited(self.current);
        let options = self.unvisited_neighbors(self.current);
        if !options.is_empty() {
            let dir = options[self.rng.random_range(0..options.len())];
            if let Some(next) = self.maze.neighbor(self.current, dir) {
                self.stack.push(self.current);
                carve(&mut self.maze, self.current, dir);
                self.mark_visited(next);
                self.carved += 1;
                self.current = next;
                return StepEvent::Visit { cell: next };
            }
        }

        match self.stack.pop() {
            Some(prev) => {
                self.current = prev;
                StepEvent::Backtrack { cell: prev }
            }
            None => self.finish(),
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn restart(&mut self, seed: u64) {
        debug!(seed, "restarting maze generation");
        *self = MazeGenStepper::new(self.maze.cols(), self.maze.rows(), seed);
    }

    fn name(&self) -> &'static str {
        "Maze Generation"
    }
}
