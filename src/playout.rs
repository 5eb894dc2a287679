//! Greedy single-line play-through.
//!
//! Follows the first child a strategy offers at every step until no group
//! remains. This is the no-search baseline that tree search is compared
//! against.
use std::sync::Arc;
use std::time::Instant;

use crate::error::Result;
use crate::game_move::GameMove;
use crate::grid::Grid;
use crate::search::{SearchReport, Termination, Traversal};
use crate::strategy::SelectionStrategy;

/// Plays `grid` to the end, always taking the strategy's first choice.
///
/// The report counts one visit per node on the line, root included. The
/// traversal field is reported as breadth-first with a single path.
pub fn greedy<S: SelectionStrategy + ?Sized>(grid: Grid, strategy: &S) -> Result<SearchReport> {
    let start = Instant::now();
    let mut node = GameMove::root(grid);
    let mut visited = 1;

    while let Some(next) = first_child(&node, strategy)? {
        node = next;
        visited += 1;
    }

    Ok(SearchReport {
        strategy: format!("greedy {}", strategy.name()),
        traversal: Traversal::BreadthFirst,
        workers: 1,
        best_score: node.score(),
        moves: node.moves().to_vec(),
        nodes_visited: visited,
        frontier_remaining: 0,
        termination: Termination::Exhausted,
        elapsed: start.elapsed(),
        best: node,
    })
}

fn first_child<S: SelectionStrategy + ?Sized>(
    node: &Arc<GameMove>,
    strategy: &S,
) -> Result<Option<Arc<GameMove>>> {
    Ok(strategy.expand(node)?.into_iter().next())
}
