//! Grid model for the bubble burst puzzle.
//!
//! This module defines:
//! - `Tile`: the fixed color palette plus the empty cell.
//! - `Grid`: an immutable rectangular matrix of tiles with validated
//!   construction, text parsing, seeded random generation and display.
//!
//! Group analysis lives in [`crate::group`] and the burst/reflow operator in
//! [`crate::burst`]; both are implemented as further `impl Grid` blocks.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `(row, column)` position on a grid. Row 0 is the top row.
pub type Coord = (usize, usize);

/// The content of a single cell: one palette color, or empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Represents an empty space on the board.
    Empty,
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
}

impl Tile {
    /// Every non-empty color, in palette order.
    pub const PALETTE: [Tile; 5] = [Tile::Red, Tile::Green, Tile::Blue, Tile::Yellow, Tile::Purple];

    /// Converts the tile to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use bubble_burst::grid::Tile;
    /// assert_eq!(Tile::Red.to_char(), 'R');
    /// assert_eq!(Tile::Empty.to_char(), '.');
    /// ```
    pub fn to_char(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Red => 'R',
            Tile::Green => 'G',
            Tile::Blue => 'B',
            Tile::Yellow => 'Y',
            Tile::Purple => 'P',
        }
    }

    /// Parses a tile from its character representation.
    pub fn from_char(ch: char) -> Option<Tile> {
        match ch {
            '.' => Some(Tile::Empty),
            'R' => Some(Tile::Red),
            'G' => Some(Tile::Green),
            'B' => Some(Tile::Blue),
            'Y' => Some(Tile::Yellow),
            'P' => Some(Tile::Purple),
            _ => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Tile::Empty
    }

    /// Returns the ANSI background color code for terminal output.
    fn to_ansi_color_code(self) -> &'static str {
        match self {
            Tile::Empty => "40",
            Tile::Red => "41",
            Tile::Green => "42",
            Tile::Yellow => "43",
            Tile::Blue => "44",
            Tile::Purple => "45",
        }
    }
}

/// An immutable rectangular matrix of tiles.
///
/// Every transformation (see [`Grid::burst`] and [`Grid::reflow`]) returns a
/// new `Grid`; two grids are equal iff their dimensions and every cell match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// Creates a grid of the given size with every cell empty.
    ///
    /// Fails with `MalformedGrid` if either dimension is zero.
    pub fn empty(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::malformed(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Grid {
            width,
            height,
            cells: vec![Tile::Empty; width * height],
        })
    }

    /// Builds a grid from rows of tiles, top row first.
    ///
    /// Every row must have the same, non-zero length.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut grid = Grid::empty(width, height)?;

        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(Error::malformed(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    row.len(),
                    width
                )));
            }
            grid.cells[r * width..(r + 1) * width].copy_from_slice(&row);
        }
        Ok(grid)
    }

    /// Parses a grid from one string per row, using `R G B Y P` for colors
    /// and `.` for empty cells.
    ///
    /// # Examples
    /// ```
    /// use bubble_burst::grid::{Grid, Tile};
    ///
    /// let grid = Grid::from_str_rows(&["RG.", "BBY"]).unwrap();
    /// assert_eq!(grid.width(), 3);
    /// assert_eq!(grid.height(), 2);
    /// assert_eq!(grid.get(1, 0), Some(Tile::Blue));
    /// assert_eq!(grid.get(0, 2), Some(Tile::Empty));
    ///
    /// assert!(Grid::from_str_rows(&["RXB"]).is_err());
    /// assert!(Grid::from_str_rows(&["RR", "R"]).is_err());
    /// ```
    pub fn from_str_rows(rows: &[&str]) -> Result<Self> {
        let parsed = rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.chars()
                    .enumerate()
                    .map(|(c, ch)| {
                        Tile::from_char(ch).ok_or_else(|| {
                            Error::malformed(format!(
                                "unrecognized character '{}' in row {} col {}",
                                ch, r, c
                            ))
                        })
                    })
                    .collect::<Result<Vec<Tile>>>()
            })
            .collect::<Result<Vec<Vec<Tile>>>>()?;
        Grid::from_rows(parsed)
    }

    /// Creates a fully colored grid drawn from the first `colors` palette
    /// entries, reproducibly from `seed`.
    pub fn random(width: usize, height: usize, colors: usize, seed: u64) -> Result<Self> {
        if colors == 0 || colors > Tile::PALETTE.len() {
            return Err(Error::malformed(format!(
                "color count must be between 1 and {}, got {}",
                Tile::PALETTE.len(),
                colors
            )));
        }
        let mut grid = Grid::empty(width, height)?;
        let mut rng = SmallRng::seed_from_u64(seed);
        for cell in grid.cells.iter_mut() {
            *cell = Tile::PALETTE[rng.gen_range(0..colors)];
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the tile at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    pub(crate) fn tile(&self, row: usize, col: usize) -> Tile {
        self.cells[row * self.width + col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, tile: Tile) {
        self.cells[row * self.width + col] = tile;
    }

    /// Iterates over every cell as `((row, col), tile)`, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, Tile)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &tile)| ((i / self.width, i % self.width), tile))
    }

    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|t| !t.is_empty()).count()
    }

    pub fn is_cleared(&self) -> bool {
        self.non_empty_count() == 0
    }

    /// Counts the non-empty cells of each color present on the grid.
    pub fn color_counts(&self) -> BTreeMap<Tile, usize> {
        let mut counts = BTreeMap::new();
        for &tile in self.cells.iter().filter(|t| !t.is_empty()) {
            *counts.entry(tile).or_insert(0) += 1;
        }
        counts
    }

    /// Number of distinct colors still on the grid.
    pub fn distinct_colors(&self) -> usize {
        self.color_counts().len()
    }

    /// Renders each row as a string of tile characters.
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|t| t.to_char()).collect())
            .collect()
    }

    /// Generates a colored terminal rendering with row and column numbers.
    ///
    /// If `pos` is `Some((r, c))`, that cell is marked with `..`.
    pub fn to_string_with_highlight(&self, pos: Option<Coord>) -> String {
        let mut output = String::new();

        output.push_str("  ");
        for c_idx in 0..self.width {
            output.push_str(&format!("{:<2}", c_idx));
        }
        output.push('\n');

        for r_idx in 0..self.height {
            output.push_str(&format!("{:<2}", r_idx));
            for c_idx in 0..self.width {
                let is_highlight = pos == Some((r_idx, c_idx));
                let color_code = self.tile(r_idx, c_idx).to_ansi_color_code();
                let content = if is_highlight { ".." } else { "  " };
                output.push_str(&format!("\x1b[1;{};m{}\x1b[m", color_code, content));
            }
            if r_idx + 1 < self.height {
                output.push('\n');
            }
        }

        output
    }
}

impl FromStr for Grid {
    type Err = Error;

    /// Parses a grid from newline-separated rows; blank lines and
    /// surrounding whitespace are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Grid::from_str_rows(&rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rows().join("\n"))
    }
}
