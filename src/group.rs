//! Group analysis: partitioning a grid into burstable same-color regions.
use std::collections::VecDeque;

use crate::grid::{Coord, Grid, Tile};

/// A maximal orthogonally connected region of one color with at least two
/// cells. Member coordinates are kept sorted row-major.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    color: Tile,
    cells: Vec<Coord>,
}

impl Group {
    pub fn color(&self) -> Tile {
        self.color
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Points awarded for bursting this group: `size * (size - 1)`.
    pub fn score(&self) -> u64 {
        group_score(self.size())
    }

    /// The cell used as the click point when bursting this group: its first
    /// member in row-major order.
    pub fn representative(&self) -> Coord {
        self.cells[0]
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.binary_search(&coord).is_ok()
    }
}

/// Score of a group of `size` cells.
pub fn group_score(size: usize) -> u64 {
    let n = size as u64;
    n * n.saturating_sub(1)
}

const NEIGHBORS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl Grid {
    /// Flood-fills the same-colored region containing `(row, col)`.
    ///
    /// Returns every member, sorted row-major, or an empty vector if the
    /// cell is empty or out of bounds. Singletons are returned as a one
    /// element vector; use [`Grid::find_group`] to get burstable groups only.
    fn flood_fill(&self, row: usize, col: usize) -> Vec<Coord> {
        let color = match self.get(row, col) {
            Some(tile) if !tile.is_empty() => tile,
            _ => return Vec::new(),
        };

        let mut region = Vec::new();
        let mut q = VecDeque::new();
        let mut visited = vec![false; self.width() * self.height()];

        q.push_back((row, col));
        visited[row * self.width() + col] = true;

        while let Some((r, c)) = q.pop_front() {
            region.push((r, c));

            for (dr, dc) in NEIGHBORS {
                let nr = r as isize + dr;
                let nc = c as isize + dc;
                if nr < 0 || nc < 0 {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if self.get(nr, nc) == Some(color) && !visited[nr * self.width() + nc] {
                    visited[nr * self.width() + nc] = true;
                    q.push_back((nr, nc));
                }
            }
        }

        region.sort_unstable();
        region
    }

    /// Finds the burstable group containing `(row, col)`.
    ///
    /// Returns `None` if the cell is empty, out of bounds, or has no
    /// same-colored orthogonal neighbor.
    pub fn find_group(&self, row: usize, col: usize) -> Option<Group> {
        let cells = self.flood_fill(row, col);
        if cells.len() >= 2 {
            Some(Group {
                color: self.tile(row, col),
                cells,
            })
        } else {
            None
        }
    }

    /// Finds all burstable groups on the grid.
    ///
    /// Groups are ordered by their first cell (row-major). Their members
    /// partition every non-empty cell that has a same-colored neighbor.
    pub fn find_all_groups(&self) -> Vec<Group> {
        let mut all_groups = Vec::new();
        let mut seen = vec![false; self.width() * self.height()];

        for ((r, c), tile) in self.cells() {
            if tile.is_empty() || seen[r * self.width() + c] {
                continue;
            }
            let region = self.flood_fill(r, c);
            for &(gr, gc) in &region {
                seen[gr * self.width() + gc] = true;
            }
            if region.len() >= 2 {
                all_groups.push(Group {
                    color: tile,
                    cells: region,
                });
            }
        }
        // Row-major scan already yields groups ordered by their first cell.
        all_groups
    }

    /// True if at least one burstable group exists.
    pub fn has_moves(&self) -> bool {
        self.cells().any(|((r, c), tile)| {
            !tile.is_empty()
                && (self.get(r + 1, c) == Some(tile) || self.get(r, c + 1) == Some(tile))
        })
    }

    /// Counts non-empty cells that belong to no group.
    pub fn isolated_cells(&self) -> usize {
        let grouped: usize = self.find_all_groups().iter().map(Group::size).sum();
        self.non_empty_count() - grouped
    }
}
