//! Search-tree nodes.
use std::fmt;
use std::sync::{Arc, Weak};

use serde::Serialize;

use crate::error::Result;
use crate::grid::{Coord, Grid, Tile};
use crate::group::Group;

/// One burst: the click point and the color of the group it removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
    pub color: Tile,
}

impl Move {
    pub fn coord(&self) -> Coord {
        (self.row, self.col)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {}", self.row, self.col, self.color.to_char())
    }
}

/// An immutable node of the search tree: a grid plus the moves and score
/// that produced it from the initial board.
///
/// Nodes are shared through `Arc`. The link to the parent is weak, so a
/// branch is freed as soon as neither the frontier nor a descendant's
/// caller holds it; the move list still records the full history.
#[derive(Debug)]
pub struct GameMove {
    parent: Weak<GameMove>,
    moves: Vec<Move>,
    score: u64,
    grid: Grid,
}

impl GameMove {
    /// The root node for an initial board: no moves, score 0.
    pub fn root(grid: Grid) -> Arc<GameMove> {
        Arc::new(GameMove {
            parent: Weak::new(),
            moves: Vec::new(),
            score: 0,
            grid,
        })
    }

    /// Bursts the group at `at` and returns the resulting child node.
    pub fn child(self: &Arc<Self>, at: Coord) -> Result<Arc<GameMove>> {
        let (grid, group) = self.grid.burst(at)?;
        let mut moves = Vec::with_capacity(self.moves.len() + 1);
        moves.extend_from_slice(&self.moves);
        moves.push(Move {
            row: at.0,
            col: at.1,
            color: group.color(),
        });
        Ok(Arc::new(GameMove {
            parent: Arc::downgrade(self),
            moves,
            score: self.score + group.score(),
            grid,
        }))
    }

    /// Bursts `group` at its representative cell.
    pub fn child_for_group(self: &Arc<Self>, group: &Group) -> Result<Arc<GameMove>> {
        self.child(group.representative())
    }

    /// The parent node, if it is still alive.
    pub fn parent(&self) -> Option<Arc<GameMove>> {
        self.parent.upgrade()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Number of moves taken from the root.
    pub fn depth(&self) -> usize {
        self.moves.len()
    }

    /// Sum of the scores of every group burst so far.
    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_root(&self) -> bool {
        self.moves.is_empty()
    }

    /// True when no burstable group remains.
    pub fn is_terminal(&self) -> bool {
        !self.grid.has_moves()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample_root() -> Arc<GameMove> {
        GameMove::root(Grid::from_str_rows(&["G..", "RR.", "BBB"]).unwrap())
    }

    #[test]
    fn test_root_node() {
        let root = sample_root();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.score(), 0);
        assert!(root.parent().is_none());
        assert!(!root.is_terminal());
    }

    #[test]
    fn test_child_accumulates_moves_and_score() {
        let root = sample_root();
        let child = root.child((2, 0)).unwrap();
        assert_eq!(child.depth(), 1);
        assert_eq!(child.score(), 6);
        assert_eq!(
            child.last_move(),
            Some(&Move {
                row: 2,
                col: 0,
                color: Tile::Blue
            })
        );
        assert!(Arc::ptr_eq(&child.parent().unwrap(), &root));

        let grandchild = child.child((2, 0)).unwrap();
        assert_eq!(grandchild.depth(), 2);
        assert_eq!(grandchild.score(), 6 + 2);
        assert_eq!(grandchild.moves()[0].color, Tile::Blue);
        assert_eq!(grandchild.moves()[1].color, Tile::Red);
        assert!(grandchild.is_terminal());
        assert_eq!(root.grid().non_empty_count(), 6, "root grid is never mutated");
    }

    #[test]
    fn test_parent_link_is_weak() {
        let root = sample_root();
        let child = root.child((1, 0)).unwrap();
        drop(root);
        assert!(child.parent().is_none());
        assert_eq!(child.moves().len(), 1);
    }

    #[test]
    fn test_invalid_child() {
        let root = sample_root();
        assert!(matches!(
            root.child((0, 0)),
            Err(Error::InvalidMove { row: 0, col: 0 })
        ));
    }

    #[test]
    fn test_move_display() {
        let mv = Move {
            row: 3,
            col: 4,
            color: Tile::Purple,
        };
        assert_eq!(mv.to_string(), "(3, 4) P");
        assert_eq!(mv.coord(), (3, 4));
    }
}
