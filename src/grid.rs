//! Fixed-size 2D grids with a stable linear index.
//!
//! A cell `(i, j)` (column, row) lives at `i + j * cols`. The mapping is
//! fixed for the lifetime of a grid; lookups outside the grid yield `None`
//! rather than an error.

use serde::{Deserialize, Serialize};

/// Column/row coordinate of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub i: usize,
    pub j: usize,
}

impl CellPos {
    pub const fn new(i: usize, j: usize) -> Self {
        CellPos { i, j }
    }

    /// Manhattan distance in cells.
    pub fn manhattan(self, other: CellPos) -> f64 {
        (self.i.abs_diff(other.i) + self.j.abs_diff(other.j)) as f64
    }

    /// Straight-line distance in cells.
    pub fn euclidean(self, other: CellPos) -> f64 {
        let di = self.i.abs_diff(other.i) as f64;
        let dj = self.j.abs_diff(other.j) as f64;
        di.hypot(dj)
    }
}

/// The four wall-sharing directions, in wall-array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Index into a `[N, E, S, W]` wall array.
    pub const fn wall_index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Offsets of the four diagonal neighbors.
pub const DIAGONAL_OFFSETS: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// A dense `cols × rows` grid owning its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    cols: usize,
    rows: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Build a grid by calling `init` for every cell in index order.
    pub fn from_fn(cols: usize, rows: usize, mut init: impl FnMut(CellPos) -> T) -> Self {
        let mut cells = Vec::with_capacity(cols * rows);
        for j in 0..rows {
            for i in 0..cols {
                cells.push(init(CellPos::new(i, j)));
            }
        }
        Grid { cols, rows, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.i < self.cols && pos.j < self.rows
    }

    /// Linear index of `pos`. Callers must pass an in-bounds position.
    pub fn index(&self, pos: CellPos) -> usize {
        pos.i + pos.j * self.cols
    }

    /// Inverse of [`Grid::index`].
    pub fn pos(&self, index: usize) -> CellPos {
        CellPos::new(index % self.cols, index / self.cols)
    }

    pub fn get(&self, pos: CellPos) -> Option<&T> {
        if self.contains(pos) {
            self.cells.get(self.index(pos))
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, pos: CellPos) -> Option<&mut T> {
        if self.contains(pos) {
            let idx = self.index(pos);
            self.cells.get_mut(idx)
        } else {
            None
        }
    }

    /// Neighbor of `pos` by a signed offset, or `None` off the edge.
    pub fn offset(&self, pos: CellPos, (di, dj): (isize, isize)) -> Option<CellPos> {
        let i = pos.i.checked_add_signed(di)?;
        let j = pos.j.checked_add_signed(dj)?;
        let next = CellPos::new(i, j);
        self.contains(next).then_some(next)
    }

    pub fn neighbor(&self, pos: CellPos, dir: Direction) -> Option<CellPos> {
        self.offset(pos, dir.offset())
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Iterate `(position, cell)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CellPos, &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (CellPos::new(idx % cols, idx / cols), cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_mapping_is_bijective() {
        let grid = Grid::from_fn(7, 5, |_| ());
        let mut seen = vec![false; grid.len()];
        for j in 0..5 {
            for i in 0..7 {
                let pos = CellPos::new(i, j);
                let idx = grid.index(pos);
                assert!(!seen[idx], "index {idx} mapped twice");
                seen[idx] = true;
                assert_eq!(grid.pos(idx), pos);
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn edges_have_no_neighbors() {
        let grid = Grid::from_fn(3, 3, |_| 0u8);
        let corner = CellPos::new(0, 0);
        assert_eq!(grid.neighbor(corner, Direction::North), None);
        assert_eq!(grid.neighbor(corner, Direction::West), None);
        assert_eq!(grid.neighbor(corner, Direction::East), Some(CellPos::new(1, 0)));

        let far = CellPos::new(2, 2);
        assert_eq!(grid.neighbor(far, Direction::South), None);
        assert_eq!(grid.neighbor(far, Direction::East), None);
        assert_eq!(grid.offset(far, (1, 1)), None);
        assert!(grid.get(CellPos::new(3, 0)).is_none());
    }

    #[test]
    fn from_fn_fills_in_index_order() {
        let grid = Grid::from_fn(4, 2, |pos| pos.i * 10 + pos.j);
        assert_eq!(grid.get(CellPos::new(3, 1)), Some(&31));
        assert_eq!(grid.cells()[grid.index(CellPos::new(1, 1))], 11);
    }

    #[test]
    fn opposite_directions_cancel() {
        for dir in Direction::ALL {
            let (a, b) = dir.offset();
            let (c, d) = dir.opposite().offset();
            assert_eq!((a + c, b + d), (0, 0));
        }
    }

    #[test]
    fn distances() {
        let a = CellPos::new(0, 0);
        let b = CellPos::new(3, 4);
        assert_eq!(a.manhattan(b), 7.0);
        assert!((a.euclidean(b) - 5.0).abs() < 1e-12);
    }
}
