//! Exact-cover Tiling Solver Library
//!
//! Places a set of shapes, each at most once, onto a rectangular grid with
//! blocked cells, so that no shapes overlap and none hangs off the grid.
//! Solutions are enumerated lazily by a depth-first search that prunes
//! placements leaving unfillable holes.
//!
//! ```
//! use tiler::{solve, Grid, Shape};
//!
//! let grid = Grid::new(1, 4).unwrap();
//! let shapes = vec![
//!     Shape::from_rows(1, &[[1u8, 1]]).unwrap(),
//!     Shape::from_rows(2, &[[1u8, 1]]).unwrap(),
//! ];
//! assert_eq!(solve(shapes, grid).count(), 2);
//! ```

pub mod error;
pub mod feasibility;
pub mod geometry;
pub mod grid;
pub mod persistence;
pub mod pieces;
mod solver;

pub use error::{PuzzleError, Result};
pub use grid::Grid;
pub use pieces::{Puzzle, Shape};
pub use solver::{solve, solve_with, SearchOptions, SearchStats, Solutions};
