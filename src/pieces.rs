//! Shapes and puzzle definitions.
//!
//! A puzzle pairs a starting grid with the shapes that must be placed on it.
//! Puzzles are validated on construction and can be read from a small text
//! format:
//!
//! ```text
//! # optional, relaxes hole pruning
//! random-shape-mode
//! grid
//! 0 0 0
//! 0 -1 0
//! shape 1
//! 1 1
//! shape 2
//! 1
//! 1
//! ```

use std::str::FromStr;

use rustc_hash::FxHashSet;

use crate::error::{PuzzleError, Result};
use crate::geometry::{all_orientations, Pattern};
use crate::grid::{Cell, Grid, EMPTY};
use crate::solver::{self, SearchOptions, Solutions};

/// A shape that can be placed at most once.
///
/// Orientations are computed once on construction. Shapes are told apart by
/// id; [`Shape::same_pattern`] compares the cells alone.
#[derive(Clone, Debug)]
pub struct Shape {
    id: Cell,
    pattern: Pattern,
    orientations: Vec<Pattern>,
}

impl Shape {
    /// Creates a shape labelled `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidShapeId`] if `id` is not positive.
    pub fn new(id: Cell, pattern: Pattern) -> Result<Self> {
        if id <= EMPTY {
            return Err(PuzzleError::InvalidShapeId { id });
        }
        let orientations = all_orientations(&pattern);
        Ok(Self {
            id,
            pattern,
            orientations,
        })
    }

    /// Creates a shape from rows of 0/1 values.
    ///
    /// # Errors
    ///
    /// Fails if the id is not positive or the rows are not a valid pattern.
    pub fn from_rows<R: AsRef<[u8]>>(id: Cell, rows: &[R]) -> Result<Self> {
        Self::new(id, Pattern::from_rows(rows)?)
    }

    pub fn id(&self) -> Cell {
        self.id
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn orientations(&self) -> &[Pattern] {
        &self.orientations
    }

    /// Number of cells the shape covers.
    pub fn cell_count(&self) -> usize {
        self.pattern.cell_count()
    }

    /// Returns whether some orientation can still be placed on `grid`.
    pub fn still_fits_grid(&self, grid: &Grid) -> bool {
        self.orientations
            .iter()
            .any(|orientation| grid.find_valid_placement(orientation).is_some())
    }

    /// Compares the defining patterns, ignoring ids.
    pub fn same_pattern(&self, other: &Shape) -> bool {
        self.pattern == other.pattern
    }
}

/// A validated puzzle instance.
#[derive(Clone, Debug)]
pub struct Puzzle {
    shapes: Vec<Shape>,
    grid: Grid,
}

impl Puzzle {
    /// Creates a puzzle.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::DuplicateShapeId`] if two shapes share an id and
    /// [`PuzzleError::ShapeIdInGrid`] if the grid already contains a shape's id.
    /// Any other positive label on the grid is a [`PuzzleError::UnknownLabel`],
    /// so the initial grid holds only empty and blocked cells.
    pub fn new(shapes: Vec<Shape>, grid: Grid) -> Result<Self> {
        let mut ids = FxHashSet::default();
        for shape in &shapes {
            if !ids.insert(shape.id()) {
                return Err(PuzzleError::DuplicateShapeId { id: shape.id() });
            }
        }
        match grid.cells().iter().find(|&&cell| cell > EMPTY) {
            Some(&id) if ids.contains(&id) => Err(PuzzleError::ShapeIdInGrid { id }),
            Some(&label) => Err(PuzzleError::UnknownLabel { label }),
            None => Ok(Self { shapes, grid }),
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Enables or disables the relaxed hole-size pruning on the starting grid.
    pub fn with_random_shape_mode(mut self, enabled: bool) -> Self {
        self.grid = self.grid.with_random_shape_mode(enabled);
        self
    }

    /// Number of empty cells on the starting grid.
    pub fn free_cells(&self) -> usize {
        self.grid.count(EMPTY)
    }

    /// Total number of cells covered by all shapes.
    pub fn shape_area(&self) -> usize {
        self.shapes.iter().map(Shape::cell_count).sum()
    }

    /// Lazily enumerates solutions with default search options.
    pub fn solve(&self) -> Solutions {
        self.solve_with(SearchOptions::default())
    }

    /// Lazily enumerates solutions.
    pub fn solve_with(&self, options: SearchOptions) -> Solutions {
        solver::solve_with(self.shapes.clone(), self.grid.clone(), options)
    }
}

/// Section of a puzzle file the parser is currently filling.
enum Section {
    Preamble,
    Grid,
    Shape(PendingShape),
}

/// A parsed row with the line it came from.
type Row<T> = (usize, Vec<T>);

/// Rows collected for the shape being parsed.
struct PendingShape {
    id: Cell,
    line: usize,
    rows: Vec<Row<u8>>,
}

impl PendingShape {
    fn finish(self) -> Result<Shape> {
        check_widths(&self.rows, "shape")?;
        let rows: Vec<&[u8]> = self.rows.iter().map(|(_, row)| row.as_slice()).collect();
        Shape::from_rows(self.id, &rows).map_err(|error| PuzzleError::Parse {
            line: self.line,
            reason: error.to_string(),
        })
    }
}

/// Fails on the first row whose width differs from the first row's.
fn check_widths<T>(rows: &[Row<T>], what: &str) -> Result<()> {
    let Some((_, first)) = rows.first() else {
        return Ok(());
    };
    match rows.iter().find(|(_, row)| row.len() != first.len()) {
        Some((line, row)) => Err(PuzzleError::Parse {
            line: *line,
            reason: format!("{what} row has {} cells, expected {}", row.len(), first.len()),
        }),
        None => Ok(()),
    }
}

/// Switches to `next`, completing the shape that was being read.
fn enter(section: &mut Section, next: Section, shapes: &mut Vec<Shape>) -> Result<()> {
    if let Section::Shape(done) = std::mem::replace(section, next) {
        shapes.push(done.finish()?);
    }
    Ok(())
}

fn parse_row<T: FromStr>(line_number: usize, line: &str) -> Result<Vec<T>> {
    line.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| PuzzleError::Parse {
                line: line_number,
                reason: format!("'{token}' is not a valid cell value"),
            })
        })
        .collect()
}

impl FromStr for Puzzle {
    type Err = PuzzleError;

    fn from_str(source: &str) -> Result<Self> {
        let mut section = Section::Preamble;
        let mut grid_rows: Vec<Row<Cell>> = Vec::new();
        let mut grid_line = None;
        let mut shapes = Vec::new();
        let mut random_shape_mode = false;

        for (index, line) in source.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            match tokens.next().unwrap_or_default() {
                "random-shape-mode" => random_shape_mode = true,
                "grid" => {
                    if grid_line.is_some() {
                        return Err(PuzzleError::Parse {
                            line: line_number,
                            reason: "grid is defined twice".to_string(),
                        });
                    }
                    grid_line = Some(line_number);
                    enter(&mut section, Section::Grid, &mut shapes)?;
                }
                "shape" => {
                    let id = tokens
                        .next()
                        .and_then(|token| token.parse().ok())
                        .ok_or_else(|| PuzzleError::Parse {
                            line: line_number,
                            reason: "expected 'shape <id>'".to_string(),
                        })?;
                    let pending = PendingShape {
                        id,
                        line: line_number,
                        rows: Vec::new(),
                    };
                    enter(&mut section, Section::Shape(pending), &mut shapes)?;
                }
                _ => match &mut section {
                    Section::Preamble => {
                        return Err(PuzzleError::Parse {
                            line: line_number,
                            reason: format!("unexpected '{line}' before any section"),
                        })
                    }
                    Section::Grid => grid_rows.push((line_number, parse_row(line_number, line)?)),
                    Section::Shape(pending) => {
                        pending.rows.push((line_number, parse_row(line_number, line)?))
                    }
                },
            }
        }
        enter(&mut section, Section::Preamble, &mut shapes)?;

        let grid_line = grid_line.ok_or_else(|| PuzzleError::Parse {
            line: source.lines().count(),
            reason: "puzzle has no grid section".to_string(),
        })?;
        check_widths(&grid_rows, "grid")?;
        let rows: Vec<&[Cell]> = grid_rows.iter().map(|(_, row)| row.as_slice()).collect();
        let grid = Grid::from_rows(&rows).map_err(|error| PuzzleError::Parse {
            line: grid_line,
            reason: error.to_string(),
        })?;

        Ok(Puzzle::new(shapes, grid)?.with_random_shape_mode(random_shape_mode))
    }
}

/// A single 2x2 square filling a 2x2 grid.
const SQUARE: &str = "\
grid
0 0
0 0
shape 1
1 1
1 1
";

/// Two dominoes in a 1x4 strip.
const DOMINOES: &str = "\
grid
0 0 0 0
shape 1
1 1
shape 2
1 1
";

/// A 4x4 square tiled by four tetrominoes.
const TETROMINOES: &str = "\
grid
0 0 0 0
0 0 0 0
0 0 0 0
0 0 0 0
# I
shape 1
1 1 1 1
# O
shape 2
1 1
1 1
# L
shape 3
1 0
1 0
1 1
# J
shape 4
0 1
0 1
1 1
";

/// A one-cell pocket that no domino can reach.
const POCKET: &str = "\
grid
 0 -1  0
-1  0  0
 0  0  0
shape 1
1 1
shape 2
1 1
";

/// Names and sources of the built-in puzzles.
pub const BUILTIN_PUZZLES: &[(&str, &str)] = &[
    ("square", SQUARE),
    ("dominoes", DOMINOES),
    ("tetrominoes", TETROMINOES),
    ("pocket", POCKET),
];

/// Looks up a built-in puzzle by name.
///
/// # Errors
///
/// Returns [`PuzzleError::UnknownPuzzle`] for names not in [`BUILTIN_PUZZLES`].
pub fn builtin(name: &str) -> Result<Puzzle> {
    BUILTIN_PUZZLES
        .iter()
        .find(|(builtin_name, _)| *builtin_name == name)
        .ok_or_else(|| PuzzleError::UnknownPuzzle {
            name: name.to_string(),
        })
        .and_then(|(_, source)| source.parse())
}
