//! Budgeted tree search over game moves.
//!
//! The tree rooted at the initial board is expanded lazily: a node's
//! children are produced by the selection strategy only when the node is
//! visited. Two traversal disciplines share one loop and differ only in
//! the [`Frontier`] they pull from:
//! - breadth-first, a FIFO queue visiting nodes in non-decreasing depth;
//! - priority, a max-heap ordered by [`rank`].
//!
//! The search stops when the frontier is empty or the visit budget is
//! spent. Both are normal outcomes and produce a [`SearchReport`].
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

use crate::error::Result;
use crate::game_move::{GameMove, Move};
use crate::grid::Grid;
use crate::parallel;
use crate::strategy::SelectionStrategy;

/// Default for [`Traversal::Priority`]. Above 2.0 the absolute value in
/// [`penalized_score`] comes into play, since every move scores at least 2.
pub const DEFAULT_DEPTH_PENALTY: f64 = 8.0;
pub const DEFAULT_VISIT_BUDGET: usize = 100_000;

/// Order in which discovered nodes are visited.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Traversal {
    BreadthFirst,
    Priority {
        #[serde(default = "default_depth_penalty")]
        depth_penalty: f64,
    },
}

fn default_depth_penalty() -> f64 {
    DEFAULT_DEPTH_PENALTY
}

impl Default for Traversal {
    fn default() -> Self {
        Traversal::Priority {
            depth_penalty: DEFAULT_DEPTH_PENALTY,
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traversal::BreadthFirst => write!(f, "breadth_first"),
            Traversal::Priority { depth_penalty } => {
                write!(f, "priority(depth_penalty={})", depth_penalty)
            }
        }
    }
}

/// `|score - depth * depth_penalty|`.
///
/// The absolute value keeps deep low-scoring branches from sinking to an
/// unreachable priority.
pub fn penalized_score(node: &GameMove, depth_penalty: f64) -> f64 {
    (node.score() as f64 - node.depth() as f64 * depth_penalty).abs()
}

/// Compares two nodes for priority traversal; `Greater` means `a` is
/// visited before `b`.
///
/// A node that is both shallower and higher-scoring always wins. Nodes with
/// equal depth and score tie. Everything else is decided by
/// [`penalized_score`].
pub fn rank(a: &GameMove, b: &GameMove, depth_penalty: f64) -> Ordering {
    match (a.depth().cmp(&b.depth()), a.score().cmp(&b.score())) {
        (Ordering::Less, Ordering::Greater) => Ordering::Greater,
        (Ordering::Greater, Ordering::Less) => Ordering::Less,
        (Ordering::Equal, Ordering::Equal) => Ordering::Equal,
        _ => penalized_score(a, depth_penalty).total_cmp(&penalized_score(b, depth_penalty)),
    }
}

/// Heap entry. Ties under [`rank`] are broken by insertion order, earliest
/// first, so priority search is deterministic.
struct Ranked {
    node: Arc<GameMove>,
    depth_penalty: f64,
    seq: u64,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        rank(&self.node, &other.node, self.depth_penalty).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

enum Pending {
    Queue(VecDeque<Arc<GameMove>>),
    Heap {
        heap: BinaryHeap<Ranked>,
        depth_penalty: f64,
        next_seq: u64,
    },
}

/// Discovered but not yet visited nodes.
pub struct Frontier {
    pending: Pending,
}

impl Frontier {
    pub fn new(traversal: Traversal) -> Self {
        let pending = match traversal {
            Traversal::BreadthFirst => Pending::Queue(VecDeque::new()),
            Traversal::Priority { depth_penalty } => Pending::Heap {
                heap: BinaryHeap::new(),
                depth_penalty,
                next_seq: 0,
            },
        };
        Frontier { pending }
    }

    pub fn push(&mut self, node: Arc<GameMove>) {
        match &mut self.pending {
            Pending::Queue(queue) => queue.push_back(node),
            Pending::Heap {
                heap,
                depth_penalty,
                next_seq,
            } => {
                heap.push(Ranked {
                    node,
                    depth_penalty: *depth_penalty,
                    seq: *next_seq,
                });
                *next_seq += 1;
            }
        }
    }

    pub fn pop(&mut self) -> Option<Arc<GameMove>> {
        match &mut self.pending {
            Pending::Queue(queue) => queue.pop_front(),
            Pending::Heap { heap, .. } => heap.pop().map(|ranked| ranked.node),
        }
    }

    pub fn len(&self) -> usize {
        match &self.pending {
            Pending::Queue(queue) => queue.len(),
            Pending::Heap { heap, .. } => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Why a search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The frontier ran empty: every reachable node under the strategy was
    /// visited.
    Exhausted,
    /// The visit budget was spent with nodes still waiting.
    BudgetSpent,
}

impl Termination {
    pub(crate) fn from_frontier(frontier: &Frontier) -> Self {
        if frontier.is_empty() {
            Termination::Exhausted
        } else {
            Termination::BudgetSpent
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exhausted => write!(f, "exhausted"),
            Termination::BudgetSpent => write!(f, "budget_spent"),
        }
    }
}

/// Lazy sequence of visited nodes.
///
/// Each call to `next` pops one node, expands it with the strategy, pushes
/// the children and yields the node. Nodes are never revisited and equal
/// grids reached along different paths are not merged.
pub struct Visits<'s, S: ?Sized> {
    strategy: &'s S,
    frontier: Frontier,
    visited: usize,
    visit_budget: usize,
    failed: bool,
}

impl<'s, S: SelectionStrategy + ?Sized> Visits<'s, S> {
    fn new(root: Arc<GameMove>, strategy: &'s S, traversal: Traversal, visit_budget: usize) -> Self {
        let mut frontier = Frontier::new(traversal);
        frontier.push(root);
        Visits {
            strategy,
            frontier,
            visited: 0,
            visit_budget,
            failed: false,
        }
    }

    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn termination(&self) -> Termination {
        Termination::from_frontier(&self.frontier)
    }
}

impl<S: SelectionStrategy + ?Sized> Iterator for Visits<'_, S> {
    type Item = Result<Arc<GameMove>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.visited >= self.visit_budget {
            return None;
        }
        let node = self.frontier.pop()?;
        self.visited += 1;

        match self.strategy.expand(&node) {
            Ok(children) => {
                for child in children {
                    self.frontier.push(child);
                }
                Some(Ok(node))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Outcome of a search run.
#[derive(Clone, Debug, Serialize)]
pub struct SearchReport {
    pub strategy: String,
    pub traversal: Traversal,
    pub workers: usize,
    pub best_score: u64,
    pub moves: Vec<Move>,
    pub nodes_visited: usize,
    pub frontier_remaining: usize,
    pub termination: Termination,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// The node holding the best score. Its grid is the final board of the
    /// winning line.
    #[serde(skip)]
    pub best: Arc<GameMove>,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

impl SearchReport {
    pub fn final_grid(&self) -> &Grid {
        self.best.grid()
    }

    /// Visited nodes per second.
    pub fn speed(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.nodes_visited as f64 / secs) as u64
        } else {
            0
        }
    }
}

pub(crate) fn log_start(strategy: &str, traversal: Traversal, visit_budget: usize, workers: usize) {
    info!(
        event = "search_start",
        strategy = strategy,
        traversal = %traversal,
        visit_budget = visit_budget as u64,
        workers = workers as u64,
    );
}

pub(crate) fn log_new_best(node: &GameMove, visited: usize) {
    debug!(
        event = "new_best",
        score = node.score(),
        depth = node.depth() as u64,
        visited = visited as u64,
    );
}

pub(crate) fn log_end(report: &SearchReport) {
    info!(
        event = "search_end",
        termination = %report.termination,
        visited = report.nodes_visited as u64,
        best_score = report.best_score,
        depth = report.moves.len() as u64,
        duration_ms = report.elapsed.as_millis() as u64,
        speed = report.speed(),
    );
}

/// A configured search: strategy, traversal, budget and worker count.
pub struct Search<'s, S: ?Sized> {
    strategy: &'s S,
    traversal: Traversal,
    visit_budget: usize,
    workers: usize,
}

impl<'s, S: SelectionStrategy + ?Sized> Search<'s, S> {
    pub fn new(strategy: &'s S, traversal: Traversal, visit_budget: usize) -> Self {
        Search {
            strategy,
            traversal,
            visit_budget,
            workers: 1,
        }
    }

    /// Runs with `workers` threads pulling from a shared frontier. Values
    /// below 2 run single-threaded.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Starts a fresh lazy traversal from `grid`. Calling this again
    /// restarts from the root.
    pub fn visits(&self, grid: Grid) -> Visits<'s, S> {
        Visits::new(GameMove::root(grid), self.strategy, self.traversal, self.visit_budget)
    }

    /// Searches from `grid` and reports the best line found.
    ///
    /// Fails only if the strategy emits a move that is not legal on its
    /// node's grid.
    pub fn run(&self, grid: Grid) -> Result<SearchReport> {
        if self.workers > 1 {
            return parallel::run(self.strategy, self.traversal, self.visit_budget, self.workers, grid);
        }

        let start = Instant::now();
        let name = self.strategy.name();
        log_start(&name, self.traversal, self.visit_budget, 1);

        let root = GameMove::root(grid);
        let mut best = Arc::clone(&root);
        let mut visits = Visits::new(root, self.strategy, self.traversal, self.visit_budget);

        while let Some(visit) = visits.next() {
            let node = visit?;
            if node.score() > best.score() {
                best = node;
                log_new_best(&best, visits.visited());
            }
        }

        let report = SearchReport {
            strategy: name,
            traversal: self.traversal,
            workers: 1,
            best_score: best.score(),
            moves: best.moves().to_vec(),
            nodes_visited: visits.visited(),
            frontier_remaining: visits.frontier_len(),
            termination: visits.termination(),
            elapsed: start.elapsed(),
            best,
        };
        log_end(&report);
        Ok(report)
    }
}
