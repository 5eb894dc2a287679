//! # Bubble Burst Solver Library
//!
//! Core logic for the bubble burst puzzle and a budgeted tree search that
//! looks for high-scoring play-throughs.
//!
//! It is used by two binaries:
//! - `ai_solver`: loads or generates a board, runs the configured search
//!   and prints the winning move sequence.
//! - `heuristic_evaluator`: runs every strategy under both traversals over
//!   a range of seeded boards and prints one row per run.
//!
//! ## Modules
//! - `grid`: tiles and the immutable `Grid`.
//! - `group`: connected same-color groups and their scores.
//! - `burst`: removing a group and reflowing the grid.
//! - `game_move`: immutable search-tree nodes.
//! - `strategy`: pluggable move-selection strategies.
//! - `search`: breadth-first and priority traversal under a visit budget.
//! - `parallel`: the same search with several workers.
//! - `playout`: greedy single-line baseline.
//! - `config`: TOML solver configuration.
//! - `error`: the crate error type.
//! - `utils`: grid file loading.

pub mod burst;
pub mod config;
pub mod error;
pub mod game_move;
pub mod grid;
pub mod group;
pub mod parallel;
pub mod playout;
pub mod search;
pub mod strategy;
pub mod utils;

pub use error::{Error, Result};
