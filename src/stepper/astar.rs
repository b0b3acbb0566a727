//! A* search over a navigation grid, one node expansion per step.
//!
//! Open/closed membership is a per-node state, so a node can never sit in
//! both sets and membership tests are O(1). The lowest-f open node comes from
//! a binary heap with lazy invalidation: improving a node pushes a fresh
//! entry and the stale one is skipped when popped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::event::{Outcome, StepEvent};
use crate::grid::{CellPos, DIAGONAL_OFFSETS, Direction, Grid};
use crate::rng;

use super::AlgorithmStepper;
use super::maze::Maze;

// ── Navigation Grid ─────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavCell {
    pub blocked: bool,
    /// Linear indices of cells reachable in one move.
    pub neighbors: Vec<usize>,
}

/// Walkable cells and their adjacency, owned as one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct NavGrid {
    grid: Grid<NavCell>,
}

impl NavGrid {
    /// A grid without obstacles, 4- or 8-connected.
    pub fn open(cols: usize, rows: usize, diagonal: bool) -> Self {
        let mut nav = NavGrid {
            grid: Grid::from_fn(cols, rows, |_| NavCell::default()),
        };
        nav.link_neighbors(diagonal);
        nav
    }

    /// Random obstacles at `density`, keeping the start, the goal and the
    /// 3×3 block in the goal corner free.
    pub fn random(cols: usize, rows: usize, density: f64, diagonal: bool, seed: u64) -> Self {
        let mut rng = rng::seeded(seed);
        let mut nav = NavGrid {
            grid: Grid::from_fn(cols, rows, |_| NavCell {
                blocked: rng.random::<f64>() < density,
                neighbors: Vec::new(),
            }),
        };
        if let Some(cell) = nav.grid.get_mut(CellPos::new(0, 0)) {
            cell.blocked = false;
        }
        for i in cols.saturating_sub(3)..cols {
            for j in rows.saturating_sub(3)..rows {
                if let Some(cell) = nav.grid.get_mut(CellPos::new(i, j)) {
                    cell.blocked = false;
                }
            }
        }
        nav.link_neighbors(diagonal);
        nav
    }

    /// Passages of a carved maze: two cells are adjacent iff no wall separates them.
    pub fn from_maze(maze: &Maze) -> Self {
        let grid = Grid::from_fn(maze.cols(), maze.rows(), |pos| {
            let mut neighbors = Vec::new();
            if let Some(cell) = maze.get(pos) {
                for dir in Direction::ALL {
                    if cell.has_wall(dir) {
                        continue;
                    }
                    if let Some(next) = maze.neighbor(pos, dir) {
                        neighbors.push(maze.index(next));
                    }
                }
            }
            NavCell {
                blocked: false,
                neighbors,
            }
        });
        NavGrid { grid }
    }

    /// Fill neighbor lists: right, left, down, up, then the diagonals.
    fn link_neighbors(&mut self, diagonal: bool) {
        const ORTHOGONAL: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        for idx in 0..self.grid.len() {
            let pos = self.grid.pos(idx);
            let mut neighbors: Vec<usize> = ORTHOGONAL
                .iter()
                .filter_map(|&off| self.grid.offset(pos, off))
                .map(|p| self.grid.index(p))
                .collect();
            if diagonal {
                neighbors.extend(
                    DIAGONAL_OFFSETS
                        .iter()
                        .filter_map(|&off| self.grid.offset(pos, off))
                        .map(|p| self.grid.index(p)),
                );
            }
            if let Some(cell) = self.grid.get_mut(pos) {
                cell.neighbors = neighbors;
            }
        }
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn index(&self, pos: CellPos) -> usize {
        self.grid.index(pos)
    }

    pub fn pos(&self, index: usize) -> CellPos {
        self.grid.pos(index)
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        self.grid.contains(pos)
    }

    pub fn is_blocked(&self, index: usize) -> bool {
        self.grid.cells().get(index).is_none_or(|c| c.blocked)
    }

    pub fn set_blocked(&mut self, pos: CellPos, blocked: bool) {
        if let Some(cell) = self.grid.get_mut(pos) {
            cell.blocked = blocked;
        }
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.grid
            .cells()
            .get(index)
            .map(|c| c.neighbors.as_slice())
            .unwrap_or(&[])
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellPos, &NavCell)> {
        self.grid.iter()
    }
}

// ── Search State ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    Manhattan,
    Euclidean,
}

impl Heuristic {
    /// Euclidean when diagonal moves are allowed, Manhattan otherwise.
    pub fn for_movement(diagonal: bool) -> Self {
        if diagonal {
            Heuristic::Euclidean
        } else {
            Heuristic::Manhattan
        }
    }

    pub fn estimate(self, from: CellPos, to: CellPos) -> f64 {
        match self {
            Heuristic::Manhattan => from.manhattan(to),
            Heuristic::Euclidean => from.euclidean(to),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    #[default]
    Unseen,
    Open,
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub g: f64,
    pub h: f64,
    pub f: f64,
    /// Index of the node this one was reached from; never owns it.
    pub previous: Option<usize>,
    pub state: NodeState,
    /// Position in first-insertion order, used to break f ties.
    order: u64,
}

impl Node {
    /// Set both scores and recompute `f` in one place.
    fn set_scores(&mut self, g: f64, h: f64) {
        self.g = g;
        self.h = h;
        self.f = g + h;
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    order: u64,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // Reversed so the max-heap yields the lowest f, then the earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Where the search grid comes from, and what `restart` rebuilds.
#[derive(Debug, Clone)]
pub enum Board {
    /// A fixed grid; restarting re-runs the search on it.
    Fixed(NavGrid),
    /// Random obstacles regenerated from the seed on every restart.
    Random {
        cols: usize,
        rows: usize,
        density: f64,
        diagonal: bool,
    },
}

// ── Stepper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AStarStepper {
    board: Board,
    nav: NavGrid,
    nodes: Vec<Node>,
    open: BinaryHeap<OpenEntry>,
    /// Start and goal indices; `None` when either lies off the grid.
    endpoints: Option<(usize, usize)>,
    heuristic: Heuristic,
    next_order: u64,
    /// Last node taken from the open set.
    current: Option<usize>,
    path: Vec<CellPos>,
    outcome: Option<Outcome>,
    steps: usize,
    open_count: usize,
    closed_count: usize,
}

impl AStarStepper {
    pub fn new(nav: NavGrid, start: CellPos, goal: CellPos, heuristic: Heuristic) -> Self {
        Self::with_board(Board::Fixed(nav.clone()), nav, start, goal, heuristic)
    }

    /// Solve a carved maze from its top-left to its bottom-right cell.
    pub fn for_maze(nav: NavGrid) -> Self {
        let goal = CellPos::new(nav.cols().saturating_sub(1), nav.rows().saturating_sub(1));
        Self::new(nav, CellPos::new(0, 0), goal, Heuristic::Manhattan)
    }

    /// Random obstacle board from the top-left to the bottom-right corner.
    pub fn random(cols: usize, rows: usize, density: f64, diagonal: bool, seed: u64) -> Self {
        let nav = NavGrid::random(cols, rows, density, diagonal, seed);
        let goal = CellPos::new(cols.saturating_sub(1), rows.saturating_sub(1));
        let board = Board::Random {
            cols,
            rows,
            density,
            diagonal,
        };
        Self::with_board(board, nav, CellPos::new(0, 0), goal, Heuristic::for_movement(diagonal))
    }

    fn with_board(
        board: Board,
        nav: NavGrid,
        start: CellPos,
        goal: CellPos,
        heuristic: Heuristic,
    ) -> Self {
        let endpoints = (nav.contains(start) && nav.contains(goal))
            .then(|| (nav.index(start), nav.index(goal)));
        if endpoints.is_none() {
            debug!(?start, ?goal, "endpoint outside the grid, search cannot start");
        }
        let mut stepper = AStarStepper {
            board,
            nav,
            nodes: Vec::new(),
            open: BinaryHeap::new(),
            endpoints,
            heuristic,
            next_order: 0,
            current: None,
            path: Vec::new(),
            outcome: None,
            steps: 0,
            open_count: 0,
            closed_count: 0,
        };
        stepper.reset_search();
        stepper
    }

    fn reset_search(&mut self) {
        self.nodes = vec![Node::default(); self.nav.len()];
        self.open.clear();
        self.next_order = 0;
        self.current = None;
        self.path.clear();
        self.outcome = None;
        self.steps = 0;
        self.open_count = 0;
        self.closed_count = 0;
        if let Some((start, _)) = self.endpoints {
            let h = self.estimate(start);
            self.nodes[start].set_scores(0.0, h);
            self.open_node(start);
        }
    }

    fn estimate(&self, index: usize) -> f64 {
        match self.endpoints {
            Some((_, goal)) => self.heuristic.estimate(self.nav.pos(index), self.nav.pos(goal)),
            None => 0.0,
        }
    }

    fn open_node(&mut self, index: usize) {
        let node = &mut self.nodes[index];
        if node.state != NodeState::Open {
            node.state = NodeState::Open;
            node.order = self.next_order;
            self.next_order += 1;
            self.open_count += 1;
        }
        self.open.push(OpenEntry {
            f: node.f,
            order: node.order,
            index,
        });
    }

    /// Pop the best live open entry, skipping stale ones.
    fn pop_best(&mut self) -> Option<usize> {
        while let Some(entry) = self.open.pop() {
            let node = &self.nodes[entry.index];
            if node.state == NodeState::Open && node.f.to_bits() == entry.f.to_bits() {
                return Some(entry.index);
            }
        }
        None
    }

    fn trace_back(&self, from: usize) -> Vec<CellPos> {
        let mut path = Vec::new();
        let mut cursor = Some(from);
        while let Some(idx) = cursor {
            path.push(self.nav.pos(idx));
            if path.len() > self.nodes.len() {
                break;
            }
            cursor = self.nodes[idx].previous;
        }
        path.reverse();
        path
    }

    pub fn nav(&self) -> &NavGrid {
        &self.nav
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// `None` when the requested start was off the grid.
    pub fn start(&self) -> Option<CellPos> {
        self.endpoints.map(|(start, _)| self.nav.pos(start))
    }

    pub fn goal(&self) -> Option<CellPos> {
        self.endpoints.map(|(_, goal)| self.nav.pos(goal))
    }

    pub fn node(&self, pos: CellPos) -> Option<&Node> {
        if self.nav.contains(pos) {
            self.nodes.get(self.nav.index(pos))
        } else {
            None
        }
    }

    pub fn node_state(&self, pos: CellPos) -> NodeState {
        self.node(pos).map(|n| n.state).unwrap_or_default()
    }

    pub fn current(&self) -> Option<CellPos> {
        self.current.map(|idx| self.nav.pos(idx))
    }

    /// Best path to the most recently expanded node (start first).
    pub fn current_path(&self) -> Vec<CellPos> {
        self.current.map(|idx| self.trace_back(idx)).unwrap_or_default()
    }

    /// The final path once the goal is found; empty otherwise.
    pub fn path(&self) -> &[CellPos] {
        &self.path
    }

    /// Moves along the final path.
    pub fn path_length(&self) -> Option<usize> {
        (self.outcome == Some(Outcome::Solved)).then(|| self.path.len().saturating_sub(1))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn open_len(&self) -> usize {
        self.open_count
    }

    pub fn closed_len(&self) -> usize {
        self.closed_count
    }
}

impl AlgorithmStepper for AStarStepper {
    fn step(&mut self) -> StepEvent {
        if let Some(outcome) = self.outcome {
            return StepEvent::Done { outcome };
        }

        let Some(current) = self.pop_best() else {
            self.outcome = Some(Outcome::NoSolution);
            info!(steps = self.steps, closed = self.closed_count, "no path to goal");
            return StepEvent::Done { outcome: Outcome::NoSolution };
        };
        self.steps += 1;
        self.current = Some(current);

        if self.endpoints.is_some_and(|(_, goal)| goal == current) {
            self.path = self.trace_back(current);
            self.outcome = Some(Outcome::Solved);
            let path_len = self.path.len().saturating_sub(1);
            info!(steps = self.steps, path_len, "path found");
            return StepEvent::FoundGoal { path_len };
        }

        self.nodes[current].state = NodeState::Closed;
        self.open_count -= 1;
        self.closed_count += 1;

        let tentative_g = self.nodes[current].g + 1.0;
        let neighbors = self.nav.neighbors(current).to_vec();
        let mut improved = Vec::new();
        for next in neighbors {
            if self.nav.is_blocked(next) || self.nodes[next].state == NodeState::Closed {
                continue;
            }
            let is_open = self.nodes[next].state == NodeState::Open;
            if !is_open || tentative_g < self.nodes[next].g {
                let h = self.estimate(next);
                let node = &mut self.nodes[next];
                node.set_scores(tentative_g, h);
                node.previous = Some(current);
                self.open_node(next);
                improved.push(self.nav.pos(next));
            }
        }

        StepEvent::Expand {
            from: self.nav.pos(current),
            to: improved,
        }
    }

    fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    fn restart(&mut self, seed: u64) {
        debug!(seed, "restarting A* search");
        if let Board::Random {
            cols,
            rows,
            density,
            diagonal,
        } = self.board
        {
            self.nav = NavGrid::random(cols, rows, density, diagonal, seed);
        }
        self.reset_search();
    }

    fn name(&self) -> &'static str {
        "A* Pathfinding"
    }
}
