//! Results files for solved grids.
//!
//! Results are plain text and only ever appended to. Each solution is one
//! block:
//! - `Solution <n>:` header, numbered from 1 across the whole file
//! - one line per grid row, labels separated by spaces
//! - a blank line

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{PuzzleError, Result};
use crate::grid::{format_grid, Cell, Grid};

const HEADER: &str = "Solution";

fn file_error(path: &Path, operation: &'static str, source: std::io::Error) -> PuzzleError {
    PuzzleError::FileSystem {
        path: path.to_path_buf(),
        operation,
        source,
    }
}

/// Append-only writer for a results file.
pub struct SolutionLog {
    path: PathBuf,
    file: File,
    written: usize,
}

impl SolutionLog {
    /// Opens `path` for appending, creating it and its parent directories.
    ///
    /// Numbering continues after the solutions already in the file.
    ///
    /// # Errors
    ///
    /// Fails if the directories or file cannot be created, or an existing
    /// file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| file_error(parent, "create directory", source))?;
        }

        let written = if path.exists() { count(&path)? } else { 0 };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| file_error(&path, "open", source))?;

        Ok(Self {
            path,
            file,
            written,
        })
    }

    /// Appends one solution.
    ///
    /// # Errors
    ///
    /// Fails if the write does not reach the file.
    pub fn record(&mut self, grid: &Grid) -> Result<()> {
        let block = format!("{HEADER} {}:\n{}\n", self.written + 1, format_grid(grid));
        self.file
            .write_all(block.as_bytes())
            .map_err(|source| file_error(&self.path, "write", source))?;
        self.written += 1;
        Ok(())
    }

    /// Number of solutions in the file, including earlier runs.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| file_error(path, "read", source))
}

/// Loads every solution recorded in a results file.
///
/// # Errors
///
/// Fails if the file cannot be read or a block is malformed.
pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Grid>> {
    let contents = read(path.as_ref())?;

    let mut solutions = Vec::new();
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut block_start = 0;

    let mut finish = |rows: &mut Vec<Vec<Cell>>, line: usize| -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let grid = Grid::from_rows(rows.as_slice()).map_err(|error| PuzzleError::Parse {
            line,
            reason: error.to_string(),
        })?;
        solutions.push(grid);
        rows.clear();
        Ok(())
    };

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with(HEADER) {
            finish(&mut rows, block_start)?;
            block_start = line_number;
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|token| token.parse::<Cell>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|error| PuzzleError::Parse {
                line: line_number,
                reason: error.to_string(),
            })?;
        rows.push(row);
    }
    finish(&mut rows, block_start)?;

    Ok(solutions)
}

/// Counts the solutions recorded in a results file without parsing grids.
///
/// # Errors
///
/// Fails if the file cannot be read.
pub fn count(path: impl AsRef<Path>) -> Result<usize> {
    let contents = read(path.as_ref())?;
    Ok(contents
        .lines()
        .filter(|line| line.trim_start().starts_with(HEADER))
        .count())
}
