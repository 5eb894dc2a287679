//! Multi-worker search over a shared frontier.
//!
//! Workers run on the rayon global pool. Each one pops a node, claims a
//! visit from the atomic budget counter, expands the node outside the lock
//! and pushes the children back. The frontier and the count of nodes being
//! expanded sit under one mutex, so "frontier empty and nothing in flight"
//! is observed atomically and ends the search. A worker that finds the
//! frontier empty while others are still expanding parks on a condition
//! variable until children arrive or the search ends.
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::game_move::GameMove;
use crate::grid::Grid;
use crate::search::{self, Frontier, SearchReport, Termination, Traversal};
use crate::strategy::SelectionStrategy;

struct Pool {
    frontier: Frontier,
    in_flight: usize,
}

struct Shared<'s, S: ?Sized> {
    strategy: &'s S,
    visit_budget: usize,
    pool: Mutex<Pool>,
    /// Signalled whenever the pool changes in a way a parked worker cares
    /// about: children pushed, a node finished, or the search stopped.
    ready: Condvar,
    visited: AtomicUsize,
    best: Mutex<Arc<GameMove>>,
    error: Mutex<Option<Error>>,
    stop: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: SelectionStrategy + ?Sized> Shared<'_, S> {
    /// Takes the next node to expand, or `None` once the search is over.
    fn claim(&self) -> Option<Arc<GameMove>> {
        let mut pool = lock(&self.pool);
        loop {
            if self.stop.load(Ordering::Acquire) {
                return None;
            }
            if let Some(node) = pool.frontier.pop() {
                let within_budget = self
                    .visited
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                        (v < self.visit_budget).then_some(v + 1)
                    })
                    .is_ok();
                if !within_budget {
                    pool.frontier.push(node);
                    self.halt();
                    return None;
                }
                pool.in_flight += 1;
                return Some(node);
            }
            if pool.in_flight == 0 {
                self.ready.notify_all();
                return None;
            }
            pool = self
                .ready
                .wait(pool)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Must be called with the pool lock held so no wakeup is lost.
    fn halt(&self) {
        self.stop.store(true, Ordering::Release);
        self.ready.notify_all();
    }

    fn record(&self, node: &Arc<GameMove>) {
        let mut best = lock(&self.best);
        if node.score() > best.score() {
            *best = Arc::clone(node);
            search::log_new_best(node, self.visited.load(Ordering::Relaxed));
        }
    }

    fn work(&self) {
        while let Some(node) = self.claim() {
            self.record(&node);
            let expanded = self.strategy.expand(&node);

            let mut pool = lock(&self.pool);
            pool.in_flight -= 1;
            match expanded {
                Ok(children) => {
                    for child in children {
                        pool.frontier.push(child);
                    }
                    self.ready.notify_all();
                }
                Err(e) => {
                    lock(&self.error).get_or_insert(e);
                    self.halt();
                    return;
                }
            }
        }
    }
}

/// Searches from `grid` with `workers` concurrent workers.
///
/// Visit order across workers is not deterministic, so the winning line may
/// differ between runs; the visit budget and the monotonic best score hold.
pub fn run<S: SelectionStrategy + ?Sized>(
    strategy: &S,
    traversal: Traversal,
    visit_budget: usize,
    workers: usize,
    grid: Grid,
) -> Result<SearchReport> {
    let start = Instant::now();
    let name = strategy.name();
    let workers = workers.max(1);
    search::log_start(&name, traversal, visit_budget, workers);

    let root = GameMove::root(grid);
    let mut frontier = Frontier::new(traversal);
    frontier.push(Arc::clone(&root));

    let shared = Shared {
        strategy,
        visit_budget,
        pool: Mutex::new(Pool {
            frontier,
            in_flight: 0,
        }),
        ready: Condvar::new(),
        visited: AtomicUsize::new(0),
        best: Mutex::new(root),
        error: Mutex::new(None),
        stop: AtomicBool::new(false),
    };

    let shared_ref = &shared;
    rayon::scope(|s| {
        for _ in 0..workers {
            s.spawn(move |_| shared_ref.work());
        }
    });

    if let Some(e) = lock(&shared.error).take() {
        return Err(e);
    }

    let pool = lock(&shared.pool);
    let best = Arc::clone(&lock(&shared.best));
    let report = SearchReport {
        strategy: name,
        traversal,
        workers,
        best_score: best.score(),
        moves: best.moves().to_vec(),
        nodes_visited: shared.visited.load(Ordering::Acquire),
        frontier_remaining: pool.frontier.len(),
        termination: Termination::from_frontier(&pool.frontier),
        elapsed: start.elapsed(),
        best,
    };
    search::log_end(&report);
    Ok(report)
}
