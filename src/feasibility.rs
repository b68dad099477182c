//! Hole analysis for pruning search states.
//!
//! Empty cells that can be reached from the bottom-right corner are treated
//! as space the puzzle leaves unused. Every other connected region of empty
//! cells is a hole, and each hole must at least be able to take the smallest
//! shape still waiting to be placed. The check is a fast reject, not a proof
//! that the remaining shapes pack.

use crate::grid::{fits_at, Cell, Grid, Rect, BLOCKED, EMPTY};
use crate::pieces::Shape;

/// A maximal 4-connected region of empty cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hole {
    cells: Vec<(usize, usize)>,
    bounds: Rect,
}

impl Hole {
    fn new(indices: &[usize], cols: usize) -> Self {
        let cells: Vec<(usize, usize)> = indices
            .iter()
            .map(|&index| (index / cols, index % cols))
            .collect();

        let top = cells.iter().map(|&(row, _)| row).min().unwrap_or(0);
        let bottom = cells.iter().map(|&(row, _)| row).max().unwrap_or(0);
        let left = cells.iter().map(|&(_, col)| col).min().unwrap_or(0);
        let right = cells.iter().map(|&(_, col)| col).max().unwrap_or(0);

        Self {
            cells,
            bounds: Rect {
                top,
                left,
                height: bottom - top + 1,
                width: right - left + 1,
            },
        }
    }

    /// Number of cells in the hole.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `(row, col)` of every cell, in discovery order.
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// Smallest rectangle enclosing the hole.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Walks the holes of a grid in row-major order of their first cell.
struct HoleScan<'g> {
    grid: &'g Grid,
    /// Grid cells with the unused space marked as blocked.
    state: Vec<Cell>,
    seen: Vec<bool>,
    next: usize,
}

impl<'g> HoleScan<'g> {
    fn new(grid: &'g Grid) -> Self {
        let state = mark_unused_space(grid);
        let seen = vec![false; state.len()];
        Self {
            grid,
            state,
            seen,
            next: 0,
        }
    }

    fn collect_hole(&mut self, start: usize) -> Hole {
        self.seen[start] = true;
        let mut members = vec![start];
        let mut worklist = vec![start];

        while let Some(index) = worklist.pop() {
            for neighbor in self.grid.neighbors(index) {
                if self.state[neighbor] == EMPTY && !self.seen[neighbor] {
                    self.seen[neighbor] = true;
                    members.push(neighbor);
                    worklist.push(neighbor);
                }
            }
        }

        Hole::new(&members, self.grid.cols())
    }
}

impl Iterator for HoleScan<'_> {
    type Item = Hole;

    fn next(&mut self) -> Option<Hole> {
        while self.next < self.state.len() {
            let start = self.next;
            self.next += 1;
            if self.state[start] == EMPTY && !self.seen[start] {
                return Some(self.collect_hole(start));
            }
        }
        None
    }
}

/// Copies the cells and blocks every empty cell reachable from the bottom-right corner.
///
/// The corner seeds the worklist whatever it holds, so its empty neighbours
/// are reached even when the corner itself is occupied.
fn mark_unused_space(grid: &Grid) -> Vec<Cell> {
    let mut state = grid.cells().to_vec();
    let mut worklist = vec![state.len() - 1];

    while let Some(index) = worklist.pop() {
        for neighbor in grid.neighbors(index) {
            if state[neighbor] == EMPTY {
                state[neighbor] = BLOCKED;
                worklist.push(neighbor);
            }
        }
    }

    state
}

impl Grid {
    /// Lists the holes left once the unused space is blocked off.
    pub fn holes(&self) -> Vec<Hole> {
        HoleScan::new(self).collect()
    }

    /// Checks whether every hole could still take the smallest remaining shape.
    ///
    /// A hole fails when it has fewer cells than the smallest shape, or when
    /// no orientation of that shape has exactly the dimensions of the hole's
    /// bounding rectangle with every filled cell landing on a free cell.
    /// In random shape mode the first hole larger than the largest remaining
    /// shape ends the check successfully.
    pub fn can_cover_holes<'a, I>(&self, remaining: I) -> bool
    where
        I: IntoIterator<Item = &'a Shape>,
    {
        let mut by_size: Vec<&Shape> = remaining.into_iter().collect();
        by_size.sort_by_key(|shape| (shape.cell_count(), shape.id()));
        let (Some(&smallest), Some(largest)) = (by_size.first(), by_size.last()) else {
            return true;
        };
        let largest_size = largest.cell_count();

        let mut scan = HoleScan::new(self);
        while let Some(hole) = scan.next() {
            if hole.len() < smallest.cell_count() {
                return false;
            }
            if self.random_shape_mode() && hole.len() > largest_size {
                return true;
            }
            let bounds = hole.bounds();
            let fits = smallest.orientations().iter().any(|orientation| {
                orientation.height() == bounds.height
                    && orientation.width() == bounds.width
                    && fits_at(&scan.state, self.cols(), bounds.top, bounds.left, orientation)
            });
            if !fits {
                return false;
            }
        }

        true
    }
}
