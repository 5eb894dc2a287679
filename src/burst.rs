//! The burst operator: removing a group and reflowing the grid.
//!
//! Reflow is gravity toward the bottom row followed by closing empty
//! columns toward column 0. The grid keeps its dimensions; cells vacated
//! on the top and on the right become empty.
use crate::error::{Error, Result};
use crate::grid::{Coord, Grid, Tile};
use crate::group::Group;

impl Grid {
    /// Bursts the group containing `at` and returns the reflowed grid along
    /// with the group that was removed. `self` is left untouched.
    ///
    /// Fails with `InvalidMove` if `at` is out of bounds, empty, or a
    /// singleton.
    ///
    /// # Examples
    /// ```
    /// use bubble_burst::grid::Grid;
    ///
    /// let grid = Grid::from_str_rows(&["RB", "RB"]).unwrap();
    /// let (next, group) = grid.burst((0, 0)).unwrap();
    /// assert_eq!(group.score(), 2);
    /// assert_eq!(next.to_rows(), vec!["B.", "B."]);
    /// ```
    pub fn burst(&self, at: Coord) -> Result<(Grid, Group)> {
        let (row, col) = at;
        let group = self
            .find_group(row, col)
            .ok_or(Error::InvalidMove { row, col })?;

        let mut next = self.clone();
        for &(r, c) in group.cells() {
            next.set(r, c, Tile::Empty);
        }
        next.apply_gravity();
        next.shift_columns();
        Ok((next, group))
    }

    /// Returns the compacted form of this grid. Reflowing a compacted grid
    /// yields an equal grid.
    pub fn reflow(&self) -> Grid {
        let mut next = self.clone();
        next.apply_gravity();
        next.shift_columns();
        next
    }

    /// True if reflowing would leave the grid unchanged.
    pub fn is_compact(&self) -> bool {
        self.reflow() == *self
    }

    /// Moves every tile down within its column to close vertical gaps.
    fn apply_gravity(&mut self) {
        let height = self.height();
        for c in 0..self.width() {
            let mut empty_slot = height;
            for r in (0..height).rev() {
                let tile = self.tile(r, c);
                if tile.is_empty() {
                    continue;
                }
                empty_slot -= 1;
                if r != empty_slot {
                    self.set(empty_slot, c, tile);
                    self.set(r, c, Tile::Empty);
                }
            }
        }
    }

    /// Removes fully empty columns by sliding the remaining columns toward
    /// column 0, preserving their order.
    fn shift_columns(&mut self) {
        let height = self.height();
        let mut write_col = 0;
        for read_col in 0..self.width() {
            let is_read_column_empty = (0..height).all(|r| self.tile(r, read_col).is_empty());
            if is_read_column_empty {
                continue;
            }
            if read_col != write_col {
                for r in 0..height {
                    let tile = self.tile(r, read_col);
                    self.set(r, write_col, tile);
                    self.set(r, read_col, Tile::Empty);
                }
            }
            write_col += 1;
        }
    }
}
