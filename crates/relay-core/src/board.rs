//! Board model: colors, cells, boards and moves

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player color owning the orbs in a cell
///
/// A single ASCII letter (`R` for the human player, `B` for the engine in
/// the stock client). Digits and whitespace are rejected so that a cell
/// token always splits cleanly into count and owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(char);

impl Color {
    /// Human player color used by the browser client
    pub const HUMAN: Color = Color('R');
    /// Engine player color
    pub const ENGINE: Color = Color('B');

    /// Create a color from its identifier character
    pub fn new(id: char) -> Result<Self> {
        if id.is_ascii_alphabetic() {
            Ok(Self(id))
        } else {
            Err(RelayError::InvalidBoard(format!(
                "color must be a single ASCII letter, got {:?}",
                id
            )))
        }
    }

    /// Identifier character
    pub fn id(self) -> char {
        self.0
    }
}

impl TryFrom<String> for Color {
    type Error = RelayError;

    fn try_from(value: String) -> Result<Self> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(id), None) => Color::new(id),
            _ => Err(RelayError::InvalidBoard(format!(
                "color must be exactly one character, got {:?}",
                value
            ))),
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single board cell
///
/// `count == 0` if and only if `color` is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Number of orbs in the cell
    pub count: u32,
    /// Owner of the orbs, `None` when the cell is empty
    #[serde(default)]
    pub color: Option<Color>,
}

impl Cell {
    /// An empty cell
    pub const fn empty() -> Self {
        Self {
            count: 0,
            color: None,
        }
    }

    /// Create a cell, checking the count/owner invariant
    pub fn new(count: u32, color: Option<Color>) -> Result<Self> {
        let cell = Self { count, color };
        cell.validate()?;
        Ok(cell)
    }

    /// Check the count/owner invariant
    pub fn validate(&self) -> Result<()> {
        match (self.count, self.color) {
            (0, None) => Ok(()),
            (0, Some(color)) => Err(RelayError::InvalidBoard(format!(
                "empty cell must not have an owner (owner {})",
                color
            ))),
            (count, None) => Err(RelayError::InvalidBoard(format!(
                "cell with {} orbs has no owner",
                count
            ))),
            (_, Some(_)) => Ok(()),
        }
    }

    /// Exchange-format token for this cell
    ///
    /// `"0"` for an empty cell, otherwise the decimal count immediately
    /// followed by the owner letter. The encoder and the move extractor both
    /// go through this function.
    pub fn token(&self) -> String {
        match self.color {
            Some(color) if !self.is_empty() => format!("{}{}", self.count, color),
            _ => "0".to_string(),
        }
    }

    /// Whether the cell holds no orbs
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Rectangular grid of cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: Vec<Vec<Cell>>,
}

impl Board {
    /// Build a board from rows, validating shape and cells
    pub fn new(cells: Vec<Vec<Cell>>) -> Result<Self> {
        let board = Self { cells };
        board.validate()?;
        Ok(board)
    }

    /// Board of the given size with every cell empty
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![vec![Cell::empty(); cols]; rows],
        }
    }

    /// Validate dimensions and every cell
    ///
    /// Boards received over the wire are deserialized without checks, so
    /// callers run this before using them.
    pub fn validate(&self) -> Result<()> {
        let cols = match self.cells.first() {
            Some(row) if !row.is_empty() => row.len(),
            Some(_) => return Err(RelayError::InvalidBoard("board has no columns".into())),
            None => return Err(RelayError::InvalidBoard("board has no rows".into())),
        };

        for (i, row) in self.cells.iter().enumerate() {
            if row.len() != cols {
                return Err(RelayError::InvalidBoard(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            for (j, cell) in row.iter().enumerate() {
                cell.validate().map_err(|e| match e {
                    RelayError::InvalidBoard(msg) => {
                        RelayError::InvalidBoard(format!("cell ({}, {}): {}", i, j, msg))
                    }
                    other => other,
                })?;
            }
        }

        Ok(())
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns
    pub fn num_cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Cell at (row, col), if in bounds
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Replace the cell at (row, col)
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) -> Result<()> {
        cell.validate()?;
        let slot = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| {
                RelayError::InvalidBoard(format!("cell ({}, {}) is out of bounds", row, col))
            })?;
        *slot = cell;
        Ok(())
    }

    /// Rows in order
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }
}

/// Coordinates of the cell the engine changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
