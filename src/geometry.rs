//! Planar pattern transforms.
//!
//! A pattern is a rectangular binary matrix. The 8 symmetries of the square
//! are reached by combining quarter-turn rotations with horizontal and
//! vertical mirroring; symmetric patterns collapse to fewer orientations.

use std::fmt;

use crate::error::{PuzzleError, Result};

/// A rectangular binary matrix marking the cells a shape occupies.
///
/// Cells are stored row-major. Offsets of the filled cells are cached so fit
/// tests only visit cells that matter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern {
    height: usize,
    width: usize,
    cells: Vec<bool>,
    filled: Vec<(usize, usize)>,
}

impl Pattern {
    /// Builds a pattern from rows of 0/1 values.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidPattern`] when there are no rows or
    /// columns, rows differ in length, a value is not 0 or 1, or no cell is
    /// filled.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if height == 0 || width == 0 {
            return Err(invalid("pattern has no cells".to_string()));
        }

        let mut cells = Vec::with_capacity(height * width);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(invalid(format!(
                    "row {row_index} has {} columns, expected {width}",
                    row.len()
                )));
            }
            for &value in row {
                match value {
                    0 => cells.push(false),
                    1 => cells.push(true),
                    other => {
                        return Err(invalid(format!(
                            "row {row_index} contains {other}, expected 0 or 1"
                        )))
                    }
                }
            }
        }

        if !cells.contains(&true) {
            return Err(invalid("pattern has no filled cells".to_string()));
        }

        Ok(Self::from_cells(height, width, cells))
    }

    fn from_cells(height: usize, width: usize, cells: Vec<bool>) -> Self {
        let filled = cells
            .iter()
            .enumerate()
            .filter(|&(_, &is_filled)| is_filled)
            .map(|(index, _)| (index / width, index % width))
            .collect();
        Self {
            height,
            width,
            cells,
            filled,
        }
    }

    /// Builds a pattern of the given size by asking `source` for every cell.
    fn remap(height: usize, width: usize, source: impl Fn(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                cells.push(source(row, col));
            }
        }
        Self::from_cells(height, width, cells)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns whether the cell at `(row, col)` is filled; out of range is empty.
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row * self.width + col]
    }

    /// Number of filled cells.
    pub fn cell_count(&self) -> usize {
        self.filled.len()
    }

    /// `(row, col)` offsets of the filled cells in row-major order.
    #[inline]
    pub fn filled_offsets(&self) -> &[(usize, usize)] {
        &self.filled
    }

    /// Returns the pattern as rows of 0/1 values.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|&filled| u8::from(filled)).collect())
            .collect()
    }

    /// Rotates a quarter turn counter-clockwise.
    ///
    /// The last column becomes the first row.
    pub fn rotate_quarter(&self) -> Self {
        Self::remap(self.width, self.height, |row, col| {
            self.cells[col * self.width + (self.width - 1 - row)]
        })
    }

    /// Mirrors left to right.
    pub fn mirror_horizontal(&self) -> Self {
        Self::remap(self.height, self.width, |row, col| {
            self.cells[row * self.width + (self.width - 1 - col)]
        })
    }

    /// Mirrors top to bottom.
    pub fn mirror_vertical(&self) -> Self {
        Self::remap(self.height, self.width, |row, col| {
            self.cells[(self.height - 1 - row) * self.width + col]
        })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for &filled in row {
                write!(f, "{}", if filled { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn invalid(reason: String) -> PuzzleError {
    PuzzleError::InvalidPattern { reason }
}

/// Generates all distinct orientations of a pattern.
///
/// Each of the four quarter turns contributes itself plus its horizontal and
/// vertical mirror images. Duplicates are dropped keeping first-seen order,
/// so the quarter turn comes first and the untouched pattern appears at the
/// fourth rotation unless an earlier candidate equals it.
pub fn all_orientations(pattern: &Pattern) -> Vec<Pattern> {
    let mut orientations: Vec<Pattern> = Vec::with_capacity(8);
    let mut rotated = pattern.clone();

    for _ in 0..4 {
        rotated = rotated.rotate_quarter();
        let candidates = [rotated.mirror_horizontal(), rotated.mirror_vertical()];
        for candidate in std::iter::once(rotated.clone()).chain(candidates) {
            // symmetric patterns produce repeats
            if !orientations.contains(&candidate) {
                orientations.push(candidate);
            }
        }
    }

    orientations
}
