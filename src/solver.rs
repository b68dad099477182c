//! Backtracking search over shape placements.
//!
//! - Explicit stack of (remaining shapes, grid) states instead of recursion
//! - Every grid is fingerprinted when popped; boards reached through a
//!   different placement order are expanded only once
//! - Each placement is pruned before it is pushed: every remaining shape must
//!   still fit somewhere, and every hole must admit the smallest one
//! - Solutions are produced lazily; dropping the iterator abandons the search

use rustc_hash::FxHashSet;

use crate::grid::{Grid, GridKey};
use crate::pieces::Shape;

/// Pruning switches for the search.
///
/// Turning a check off never changes which grids are valid solutions; it
/// only lets more dead branches onto the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    /// Drop placements after which some remaining shape fits nowhere.
    pub fit_pruning: bool,
    /// Drop placements that leave holes the remaining shapes cannot take.
    pub hole_pruning: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fit_pruning: true,
            hole_pruning: true,
        }
    }
}

/// Counters collected while searching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States whose successors were generated.
    pub states_expanded: usize,
    /// States dropped because their grid had been seen before.
    pub duplicates_skipped: usize,
    /// Placements that found a valid anchor.
    pub placements: usize,
    /// Placements rejected by pruning.
    pub placements_pruned: usize,
    /// Solutions yielded so far.
    pub solutions: usize,
}

/// A node of the search tree.
struct SearchState {
    /// Indices into the solver's shape list of the shapes still to place.
    remaining: Vec<usize>,
    grid: Grid,
}

/// Lazy sequence of solved grids, in depth-first discovery order.
pub struct Solutions {
    shapes: Vec<Shape>,
    options: SearchOptions,
    stack: Vec<SearchState>,
    visited: FxHashSet<GridKey>,
    stats: SearchStats,
    exhausted: bool,
}

/// Searches for every placement of all `shapes` on `grid` with default options.
pub fn solve(shapes: Vec<Shape>, grid: Grid) -> Solutions {
    solve_with(shapes, grid, SearchOptions::default())
}

/// Searches for every placement of all `shapes` on `grid`.
///
/// Shape ids are assumed unique; [`crate::Puzzle::new`] checks this.
pub fn solve_with(shapes: Vec<Shape>, grid: Grid, options: SearchOptions) -> Solutions {
    let remaining = (0..shapes.len()).collect();
    Solutions {
        shapes,
        options,
        stack: vec![SearchState { remaining, grid }],
        visited: FxHashSet::default(),
        stats: SearchStats::default(),
        exhausted: false,
    }
}

impl Solutions {
    /// Counters for the work done so far.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Pushes every viable successor of `state`.
    ///
    /// Successors are generated per remaining shape in order, then per
    /// orientation in order, each at its first valid anchor.
    fn expand(&mut self, state: &SearchState) {
        for &shape_index in &state.remaining {
            let shape = &self.shapes[shape_index];

            for orientation in shape.orientations() {
                let Some(next_grid) = state.grid.place(shape, orientation) else {
                    continue;
                };
                self.stats.placements += 1;

                let next_remaining: Vec<usize> = state
                    .remaining
                    .iter()
                    .copied()
                    .filter(|&index| index != shape_index)
                    .collect();

                if is_viable(&self.shapes, self.options, &next_remaining, &next_grid) {
                    self.stack.push(SearchState {
                        remaining: next_remaining,
                        grid: next_grid,
                    });
                } else {
                    self.stats.placements_pruned += 1;
                }
            }
        }
    }
}

/// Applies the enabled pruning checks to a freshly placed grid.
fn is_viable(shapes: &[Shape], options: SearchOptions, remaining: &[usize], grid: &Grid) -> bool {
    let remaining_shapes = remaining.iter().map(|&index| &shapes[index]);

    if options.fit_pruning && !remaining_shapes.clone().all(|shape| shape.still_fits_grid(grid)) {
        return false;
    }

    !options.hole_pruning || grid.can_cover_holes(remaining_shapes)
}

impl Iterator for Solutions {
    type Item = Grid;

    fn next(&mut self) -> Option<Grid> {
        while let Some(state) = self.stack.pop() {
            // skip boards already reached through another placement order
            if !self.visited.insert(state.grid.key()) {
                self.stats.duplicates_skipped += 1;
                continue;
            }

            if state.remaining.is_empty() {
                self.stats.solutions += 1;
                log::debug!(
                    "solution {} found, {} states expanded",
                    self.stats.solutions,
                    self.stats.states_expanded
                );
                return Some(state.grid);
            }

            log::trace!(
                "expanding state with {} shapes left, stack depth {}",
                state.remaining.len(),
                self.stack.len()
            );
            self.stats.states_expanded += 1;
            self.expand(&state);
        }

        if !self.exhausted {
            self.exhausted = true;
            log::info!("search exhausted: {:?}", self.stats);
        }
        None
    }
}

impl std::iter::FusedIterator for Solutions {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, EMPTY};

    fn grid(rows: &[&[Cell]]) -> Grid {
        Grid::from_rows(rows).expect("test grid should be valid")
    }

    fn shape(id: Cell, rows: &[&[u8]]) -> Shape {
        Shape::from_rows(id, rows).expect("test shape should be valid")
    }

    fn dominoes() -> Vec<Shape> {
        vec![shape(1, &[&[1, 1]]), shape(2, &[&[1, 1]])]
    }

    #[test]
    fn test_single_square_fills_grid() {
        let empty = Grid::new(2, 2).expect("valid dimensions");
        let solutions: Vec<Grid> = solve(vec![shape(1, &[&[1, 1], &[1, 1]])], empty).collect();

        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].cells(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_two_dominoes_in_strip() {
        let strip = Grid::new(1, 4).expect("valid dimensions");
        let solutions: Vec<Grid> = solve(dominoes(), strip).collect();

        let cells: Vec<&[Cell]> = solutions.iter().map(Grid::cells).collect();
        assert_eq!(cells, vec![&[2, 2, 1, 1][..], &[1, 1, 2, 2][..]]);
    }

    #[test]
    fn test_unreachable_pocket_prunes_every_branch() {
        let pocket = grid(&[&[0, -1, 0], &[-1, 0, 0], &[0, 0, 0]]);
        let mut solutions = solve(dominoes(), pocket.clone());

        assert!(solutions.next().is_none());
        let stats = solutions.stats();
        assert_eq!(stats.solutions, 0);
        assert_eq!(stats.states_expanded, 1, "Only the root should be expanded");
        assert!(stats.placements_pruned > 0);
        assert_eq!(stats.placements_pruned, stats.placements);

        let unpruned = SearchOptions {
            hole_pruning: false,
            ..SearchOptions::default()
        };
        assert!(
            solve_with(dominoes(), pocket, unpruned).count() > 0,
            "Without hole analysis the dominoes are placed around the pocket"
        );
    }

    #[test]
    fn test_no_shapes_yields_initial_grid() {
        let start = grid(&[&[0, -1], &[0, 0]]);
        let solutions: Vec<Grid> = solve(Vec::new(), start.clone()).collect();
        assert_eq!(solutions, vec![start]);
    }

    #[test]
    fn test_impossible_puzzle_yields_nothing() {
        let strip = Grid::new(1, 3).expect("valid dimensions");
        let square = shape(1, &[&[1, 1], &[1, 1]]);
        assert_eq!(solve(vec![square], strip).count(), 0);
    }

    #[test]
    fn test_solutions_are_never_repeated() {
        let board = Grid::new(2, 4).expect("valid dimensions");
        let shapes = vec![
            shape(1, &[&[1, 1]]),
            shape(2, &[&[1, 1]]),
            shape(3, &[&[1, 1]]),
            shape(4, &[&[1, 1]]),
        ];
        let solutions: Vec<Grid> = solve(shapes, board).collect();
        assert!(!solutions.is_empty());

        let keys: FxHashSet<GridKey> = solutions.iter().map(Grid::key).collect();
        assert_eq!(keys.len(), solutions.len(), "A grid was yielded twice");
    }

    #[test]
    fn test_solutions_place_every_shape_once() {
        let start = grid(&[&[0, 0, 0, 0], &[0, -1, 0, 0], &[0, 0, 0, 0]]);
        let shapes = vec![
            shape(1, &[&[1, 1, 1]]),
            shape(2, &[&[1, 1], &[1, 0]]),
            shape(3, &[&[1, 1], &[0, 1]]),
            shape(4, &[&[1, 1]]),
        ];
        let solutions: Vec<Grid> = solve(shapes.clone(), start).collect();

        for solution in &solutions {
            for shape in &shapes {
                assert_eq!(
                    solution.count(shape.id()),
                    shape.cell_count(),
                    "Shape {} is not placed exactly once in\n{solution}",
                    shape.id()
                );
            }
            assert_eq!(solution.get(1, 1), Some(-1), "Blocked cells must survive");
            assert_eq!(solution.count(EMPTY), 0, "\n{solution}");
        }
    }

    #[test]
    fn test_search_is_lazy() {
        let strip = Grid::new(1, 4).expect("valid dimensions");
        let mut solutions = solve(dominoes(), strip);

        let first = solutions.next().expect("strip has a solution");
        assert_eq!(first.cells(), &[2, 2, 1, 1]);
        assert_eq!(solutions.stats().solutions, 1);
        assert!(
            !solutions.stack.is_empty(),
            "Unexplored branches remain until the caller asks for more"
        );
    }

    #[test]
    fn test_disabling_pruning_keeps_solutions_valid() {
        let strip = Grid::new(1, 4).expect("valid dimensions");
        let options = SearchOptions {
            fit_pruning: false,
            hole_pruning: false,
        };
        let solutions: Vec<Grid> = solve_with(dominoes(), strip, options).collect();
        assert_eq!(solutions.len(), 2);
        assert!(solutions.iter().all(|solution| solution.count(EMPTY) == 0));
    }
}
