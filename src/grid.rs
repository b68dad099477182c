//! Grid representation, fit testing and placement.
//!
//! The grid is a flat row-major array of cell labels: 0 for empty, -1 for
//! blocked, and a positive shape id for occupied cells. Grids are values;
//! placing a shape returns a new grid and never touches the receiver.

use std::fmt;

use crate::error::{PuzzleError, Result};
use crate::geometry::Pattern;
use crate::pieces::Shape;

/// A single cell label.
pub type Cell = i32;

/// Label of a cell no shape occupies yet.
pub const EMPTY: Cell = 0;

/// Label of a cell that must stay uncovered.
pub const BLOCKED: Cell = -1;

/// Exact fingerprint of a grid's contents, used to detect revisited states.
pub type GridKey = Box<[Cell]>;

/// An axis-aligned rectangle of grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub top: usize,
    pub left: usize,
    pub height: usize,
    pub width: usize,
}

/// A rectangular board of cell labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    random_shape_mode: bool,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidGrid`] if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PuzzleError::InvalidGrid {
                reason: format!("dimensions {rows}x{cols} leave no cells"),
            });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![EMPTY; rows * cols],
            random_shape_mode: false,
        })
    }

    /// Creates a grid from rows of cell labels.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidGrid`] if there are no cells, the rows
    /// differ in length, or a label is below [`BLOCKED`].
    pub fn from_rows<R: AsRef<[Cell]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        let mut grid = Self::new(rows.len(), cols)?;

        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(PuzzleError::InvalidGrid {
                    reason: format!(
                        "row {row_index} has {} columns, expected {cols}",
                        row.len()
                    ),
                });
            }
            if let Some(&value) = row.iter().find(|&&value| value < BLOCKED) {
                return Err(PuzzleError::InvalidGrid {
                    reason: format!("row {row_index} contains {value}, expected -1 or more"),
                });
            }
            grid.cells[row_index * cols..(row_index + 1) * cols].copy_from_slice(row);
        }

        Ok(grid)
    }

    /// Enables or disables the relaxed hole-size pruning.
    pub fn with_random_shape_mode(mut self, enabled: bool) -> Self {
        self.random_shape_mode = enabled;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn random_shape_mode(&self) -> bool {
        self.random_shape_mode
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns the label at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col])
    }

    /// Iterates over the rows of the grid.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    /// Number of cells holding `label`.
    pub fn count(&self, label: Cell) -> usize {
        self.cells.iter().filter(|&&cell| cell == label).count()
    }

    /// Fingerprint of the full cell array.
    pub fn key(&self) -> GridKey {
        self.cells.clone().into_boxed_slice()
    }

    /// The whole grid as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect {
            top: 0,
            left: 0,
            height: self.rows,
            width: self.cols,
        }
    }

    /// Finds the first anchor, in row-major order, where `orientation` fits.
    ///
    /// An anchor fits when every filled cell of the orientation lands inside
    /// the grid on an empty cell. Cells the orientation leaves empty are not
    /// inspected.
    pub fn find_valid_placement(&self, orientation: &Pattern) -> Option<(usize, usize)> {
        first_fit(&self.cells, self.cols, self.bounds(), orientation)
    }

    /// Places `orientation` at its first valid anchor, labelled with the shape id.
    ///
    /// Returns `None` if the orientation fits nowhere.
    pub fn place(&self, shape: &Shape, orientation: &Pattern) -> Option<Grid> {
        let (row, col) = self.find_valid_placement(orientation)?;

        let mut placed = self.clone();
        for &(row_offset, col_offset) in orientation.filled_offsets() {
            placed.cells[(row + row_offset) * self.cols + col + col_offset] = shape.id();
        }
        Some(placed)
    }

    /// Flat indices of the 4-connected neighbours of a cell (left, right, up, down).
    pub(crate) fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> {
        let (rows, cols) = (self.rows, self.cols);
        let (row, col) = (index / cols, index % cols);
        [
            (col > 0).then(|| index - 1),
            (col + 1 < cols).then(|| index + 1),
            (row > 0).then(|| index - cols),
            (row + 1 < rows).then(|| index + cols),
        ]
        .into_iter()
        .flatten()
    }
}

/// Finds the first anchor inside `area` where `orientation` fits over `cells`.
///
/// `stride` is the row length of `cells`. The whole orientation must lie
/// within `area`.
fn first_fit(
    cells: &[Cell],
    stride: usize,
    area: Rect,
    orientation: &Pattern,
) -> Option<(usize, usize)> {
    if orientation.height() > area.height || orientation.width() > area.width {
        return None;
    }
    let last_row = area.top + area.height - orientation.height();
    let last_col = area.left + area.width - orientation.width();

    (area.top..=last_row)
        .flat_map(|row| (area.left..=last_col).map(move |col| (row, col)))
        .find(|&(row, col)| fits_at(cells, stride, row, col, orientation))
}

/// Whether every filled cell of `orientation` anchored at `(row, col)` is empty.
#[inline]
pub(crate) fn fits_at(
    cells: &[Cell],
    stride: usize,
    row: usize,
    col: usize,
    orientation: &Pattern,
) -> bool {
    orientation
        .filled_offsets()
        .iter()
        .all(|&(row_offset, col_offset)| {
            cells[(row + row_offset) * stride + col + col_offset] == EMPTY
        })
}

/// Formats a grid as rows of right-aligned labels.
///
/// Every column is as wide as the widest label in the grid.
pub fn format_grid(grid: &Grid) -> String {
    let width = grid
        .cells
        .iter()
        .map(|cell| cell.to_string().len())
        .max()
        .unwrap_or(1);

    let mut output = String::new();
    for row in grid.iter_rows() {
        let line: Vec<String> = row.iter().map(|cell| format!("{cell:>width$}")).collect();
        output.push_str(&line.join(" "));
        output.push('\n');
    }
    output
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_grid(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[Cell]]) -> Grid {
        Grid::from_rows(rows).expect("test grid should be valid")
    }

    fn shape(id: Cell, rows: &[&[u8]]) -> Shape {
        Shape::from_rows(id, rows).expect("test shape should be valid")
    }

    fn pattern(rows: &[&[u8]]) -> Pattern {
        Pattern::from_rows(rows).expect("test pattern should be valid")
    }

    /// Every anchor where the orientation fits, checked cell by cell.
    fn all_valid_anchors(grid: &Grid, orientation: &Pattern) -> Vec<(usize, usize)> {
        let mut anchors = Vec::new();
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let fits = orientation
                    .filled_offsets()
                    .iter()
                    .all(|&(dr, dc)| grid.get(row + dr, col + dc) == Some(EMPTY));
                if fits {
                    anchors.push((row, col));
                }
            }
        }
        anchors
    }

    #[test]
    fn test_from_rows_validates_shape_and_values() {
        let empty: &[&[Cell]] = &[];
        assert!(Grid::from_rows(empty).is_err());
        assert!(Grid::from_rows(&[&[0, 0][..], &[0][..]]).is_err());
        assert!(matches!(
            Grid::from_rows(&[&[0, -2]]),
            Err(PuzzleError::InvalidGrid { .. })
        ));
        assert!(Grid::new(0, 3).is_err());

        let blocked = grid(&[&[0, -1], &[3, 0]]);
        assert_eq!(blocked.get(0, 1), Some(BLOCKED));
        assert_eq!(blocked.get(1, 0), Some(3));
        assert_eq!(blocked.get(2, 0), None);
        assert_eq!(blocked.count(EMPTY), 2);
    }

    #[test]
    fn test_find_valid_placement_skips_occupied_cells() {
        let board = grid(&[&[1, 0, 0], &[0, 0, 0]]);
        assert_eq!(board.find_valid_placement(&pattern(&[&[1, 1]])), Some((0, 1)));
        assert_eq!(
            board.find_valid_placement(&pattern(&[&[1], &[1]])),
            Some((0, 1))
        );
        assert_eq!(
            board.find_valid_placement(&pattern(&[&[1, 1, 1]])),
            Some((1, 0))
        );
    }

    #[test]
    fn test_find_valid_placement_ignores_cells_outside_pattern() {
        let board = grid(&[&[1, 0], &[0, 0]]);
        let corner = pattern(&[&[0, 1], &[1, 1]]);
        assert_eq!(board.find_valid_placement(&corner), Some((0, 0)));
    }

    #[test]
    fn test_find_valid_placement_respects_bounds_and_blocks() {
        let board = grid(&[&[0, -1, 0], &[0, 0, 0]]);
        assert_eq!(board.find_valid_placement(&pattern(&[&[1, 1, 1, 1]])), None);
        assert_eq!(
            board.find_valid_placement(&pattern(&[&[1, 1], &[1, 1]])),
            None
        );
        assert_eq!(
            board.find_valid_placement(&pattern(&[&[1, 1]])),
            Some((1, 0))
        );
    }

    #[test]
    fn test_find_valid_placement_returns_smallest_anchor() {
        let board = grid(&[
            &[0, 0, -1, 0, 0],
            &[2, 0, 0, 0, -1],
            &[0, 0, 0, 2, 0],
            &[0, -1, 0, 0, 0],
        ]);
        let orientations = [
            pattern(&[&[1, 1]]),
            pattern(&[&[1], &[1]]),
            pattern(&[&[1, 0], &[1, 1]]),
            pattern(&[&[0, 1], &[1, 1]]),
            pattern(&[&[1, 1, 1]]),
            pattern(&[&[1, 1], &[1, 1]]),
        ];
        for orientation in &orientations {
            let expected = all_valid_anchors(&board, orientation).into_iter().min();
            assert_eq!(
                board.find_valid_placement(orientation),
                expected,
                "First fit disagrees with exhaustive scan for\n{orientation}"
            );
        }
    }

    #[test]
    fn test_place_returns_new_grid_and_keeps_original() {
        let board = grid(&[&[0, 0, 0], &[0, 0, -1]]);
        let before = board.clone();
        let corner = shape(4, &[&[1, 1], &[1, 0]]);
        let orientation = &corner.orientations()[0];

        let first = board.place(&corner, orientation).expect("corner should fit");
        let second = board.place(&corner, orientation).expect("corner should fit");

        assert_eq!(first, second, "Placement should be deterministic");
        assert_eq!(board, before, "Placement must not mutate the receiver");
        assert_eq!(first.count(4), 3);
        assert_eq!(first.count(BLOCKED), 1);
    }

    #[test]
    fn test_place_writes_shape_id_at_first_fit() {
        let board = grid(&[&[5, 0, 0, 0]]);
        let domino = shape(2, &[&[1, 1]]);
        let horizontal = pattern(&[&[1, 1]]);
        let placed = board.place(&domino, &horizontal).expect("domino should fit");
        assert_eq!(placed.cells(), &[5, 2, 2, 0]);

        let vertical = pattern(&[&[1], &[1]]);
        assert!(board.place(&domino, &vertical).is_none());
    }

    #[test]
    fn test_keys_match_for_identical_grids() {
        let first = grid(&[&[1, 1], &[0, -1]]);
        let second = grid(&[&[1, 1], &[0, -1]]);
        let third = grid(&[&[1, 0], &[1, -1]]);
        assert_eq!(first.key(), second.key());
        assert_ne!(first.key(), third.key());
    }

    #[test]
    fn test_neighbors_stay_inside_grid() {
        let board = Grid::new(2, 3).expect("valid dimensions");
        let mut corner: Vec<usize> = board.neighbors(0).collect();
        corner.sort_unstable();
        assert_eq!(corner, vec![1, 3]);

        let mut middle: Vec<usize> = board.neighbors(4).collect();
        middle.sort_unstable();
        assert_eq!(middle, vec![1, 3, 5]);
    }

    #[test]
    fn test_format_grid_aligns_columns() {
        let board = grid(&[&[1, 1, -1], &[12, 0, 0]]);
        assert_eq!(format_grid(&board), " 1  1 -1\n12  0  0\n");
        assert_eq!(grid(&[&[1, 1, 2, 2]]).to_string(), "1 1 2 2\n");
    }
}
