//! Move-selection strategies.
//!
//! A strategy turns one [`GameMove`] into the children worth exploring. It
//! picks groups from the node's own group set and bursts each one at its
//! representative cell, so every child it emits is a legal move.
//!
//! The built-in policies are the variants of [`Strategy`]. Any closure of
//! the form `Fn(&Grid, Vec<Group>) -> Vec<Group>` is a strategy as well.
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::game_move::GameMove;
use crate::grid::{Grid, Tile};
use crate::group::Group;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_LEAST_COMMON_COLORS: usize = 2;
pub const DEFAULT_LEAST_COMMON_GROUPS: usize = 3;
pub const DEFAULT_SINGLETON_PENALTY: u64 = 4;

/// Expands a search node into its children.
pub trait SelectionStrategy: Send + Sync {
    /// Short label used in logs and reports.
    fn name(&self) -> String;

    /// Selects which of `groups` (all groups of `grid`) to burst, in the
    /// order they should be pushed onto the frontier.
    ///
    /// Fails with `InvalidMove` if the policy has to burst a group that is
    /// not one of `grid`'s own groups.
    fn choose_groups(&self, grid: &Grid, groups: Vec<Group>) -> Result<Vec<Group>>;

    /// Produces the children of `node`. Never mutates `node`.
    ///
    /// An `InvalidMove` here means `choose_groups` returned a group that
    /// does not belong to the node's grid.
    fn expand(&self, node: &Arc<GameMove>) -> Result<Vec<Arc<GameMove>>> {
        let grid = node.grid();
        self.choose_groups(grid, grid.find_all_groups())?
            .iter()
            .map(|group| node.child_for_group(group))
            .collect()
    }
}

impl<F> SelectionStrategy for F
where
    F: Fn(&Grid, Vec<Group>) -> Vec<Group> + Send + Sync,
{
    fn name(&self) -> String {
        "custom".to_string()
    }

    fn choose_groups(&self, grid: &Grid, groups: Vec<Group>) -> Result<Vec<Group>> {
        Ok(self(grid, groups))
    }
}

/// The built-in selection policies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// The `k` highest-scoring groups.
    TopKByScore {
        #[serde(default = "default_top_k")]
        k: usize,
    },
    /// Up to `groups` groups drawn from the `colors` least frequent colors
    /// that still have a burstable group.
    LeastCommonColor {
        #[serde(default = "default_least_common_colors")]
        colors: usize,
        #[serde(default = "default_least_common_groups")]
        groups: usize,
    },
    /// Every group.
    ExpandAll,
    /// The `k` groups maximizing `score - penalty * isolated_cells_after`.
    SingletonPenalty {
        #[serde(default = "default_top_k")]
        k: usize,
        #[serde(default = "default_singleton_penalty")]
        penalty: u64,
    },
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_least_common_colors() -> usize {
    DEFAULT_LEAST_COMMON_COLORS
}

fn default_least_common_groups() -> usize {
    DEFAULT_LEAST_COMMON_GROUPS
}

fn default_singleton_penalty() -> u64 {
    DEFAULT_SINGLETON_PENALTY
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::TopKByScore { k: DEFAULT_TOP_K }
    }
}

impl Strategy {
    /// One instance of every built-in policy with default parameters.
    pub fn builtins() -> Vec<Strategy> {
        vec![
            Strategy::TopKByScore { k: DEFAULT_TOP_K },
            Strategy::LeastCommonColor {
                colors: DEFAULT_LEAST_COMMON_COLORS,
                groups: DEFAULT_LEAST_COMMON_GROUPS,
            },
            Strategy::ExpandAll,
            Strategy::SingletonPenalty {
                k: DEFAULT_TOP_K,
                penalty: DEFAULT_SINGLETON_PENALTY,
            },
        ]
    }

    /// Parses a strategy by its short name, using default parameters.
    pub fn from_name(name: &str) -> Option<Strategy> {
        match name.to_lowercase().as_str() {
            "top-k" | "top_k_by_score" => Some(Strategy::TopKByScore { k: DEFAULT_TOP_K }),
            "least-common" | "least_common_color" => Some(Strategy::LeastCommonColor {
                colors: DEFAULT_LEAST_COMMON_COLORS,
                groups: DEFAULT_LEAST_COMMON_GROUPS,
            }),
            "all" | "expand_all" => Some(Strategy::ExpandAll),
            "singleton-penalty" | "singleton_penalty" => Some(Strategy::SingletonPenalty {
                k: DEFAULT_TOP_K,
                penalty: DEFAULT_SINGLETON_PENALTY,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::TopKByScore { k } => write!(f, "top_k_by_score(k={})", k),
            Strategy::LeastCommonColor { colors, groups } => {
                write!(f, "least_common_color(colors={}, groups={})", colors, groups)
            }
            Strategy::ExpandAll => write!(f, "expand_all"),
            Strategy::SingletonPenalty { k, penalty } => {
                write!(f, "singleton_penalty(k={}, penalty={})", k, penalty)
            }
        }
    }
}

impl SelectionStrategy for Strategy {
    fn name(&self) -> String {
        self.to_string()
    }

    fn choose_groups(&self, grid: &Grid, groups: Vec<Group>) -> Result<Vec<Group>> {
        match *self {
            Strategy::TopKByScore { k } => Ok(top_k_by_score(groups, k)),
            Strategy::LeastCommonColor { colors, groups: n } => {
                Ok(least_common_color(grid, groups, colors, n))
            }
            Strategy::ExpandAll => Ok(groups),
            Strategy::SingletonPenalty { k, penalty } => singleton_penalty(grid, groups, k, penalty),
        }
    }
}

/// Ranks groups by score, highest first, and keeps the first `k`. Equal
/// scores keep their row-major order.
pub fn top_k_by_score(mut groups: Vec<Group>, k: usize) -> Vec<Group> {
    groups.sort_by_key(|g| Reverse(g.score()));
    groups.truncate(k);
    groups
}

/// Keeps groups whose color is among the `colors` least frequent colors on
/// the grid that still have a burstable group, then takes up to `n` of them:
/// rarest color first, higher score first within a color.
pub fn least_common_color(grid: &Grid, groups: Vec<Group>, colors: usize, n: usize) -> Vec<Group> {
    let counts = grid.color_counts();
    let mut burstable: Vec<(usize, Tile)> = counts
        .iter()
        .filter(|(color, _)| groups.iter().any(|g| g.color() == **color))
        .map(|(&color, &count)| (count, color))
        .collect();
    burstable.sort_unstable();
    burstable.truncate(colors);

    let rank_of = |color: Tile| burstable.iter().position(|&(_, c)| c == color);
    let mut chosen: Vec<(usize, Group)> = groups
        .into_iter()
        .filter_map(|g| rank_of(g.color()).map(|rank| (rank, g)))
        .collect();
    chosen.sort_by_key(|(rank, g)| (*rank, Reverse(g.score())));
    chosen.into_iter().take(n).map(|(_, g)| g).collect()
}

/// Ranks groups by immediate score minus `penalty` per cell left isolated
/// after the burst, prefers larger groups on ties, and keeps the first `k`.
///
/// The penalty term saturates, so any `penalty` is accepted. Fails with
/// `InvalidMove` if a group is not exactly one of `grid`'s groups.
pub fn singleton_penalty(
    grid: &Grid,
    groups: Vec<Group>,
    k: usize,
    penalty: u64,
) -> Result<Vec<Group>> {
    let mut valued = Vec::with_capacity(groups.len());
    for g in groups {
        let (row, col) = g.representative();
        let (next, burst) = grid.burst((row, col))?;
        if burst != g {
            return Err(Error::InvalidMove { row, col });
        }
        let loss = (next.isolated_cells() as i128).saturating_mul(i128::from(penalty));
        valued.push((i128::from(g.score()) - loss, g));
    }
    valued.sort_by_key(|(value, g)| (Reverse(*value), Reverse(g.size())));
    Ok(valued.into_iter().take(k).map(|(_, g)| g).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(groups: &[Group]) -> Vec<usize> {
        groups.iter().map(Group::size).collect()
    }

    #[test]
    fn test_top_k_by_score() {
        let grid = Grid::from_str_rows(&["RRRR", "GGBY", "YYBP", "PPRR"]).unwrap();
        let groups = grid.find_all_groups();
        let top = top_k_by_score(groups, 2);
        assert_eq!(sizes(&top), vec![4, 2]);
        assert_eq!(top[0].color(), Tile::Red);
        // GG at (1,0) is the first two-cell group in row-major order.
        assert_eq!(top[1].color(), Tile::Green);
    }

    #[test]
    fn test_top_k_larger_than_group_count() {
        let grid = Grid::from_str_rows(&["RR", "BG"]).unwrap();
        let top = top_k_by_score(grid.find_all_groups(), 5);
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn test_least_common_color() {
        // Red: 6 cells, Green: 2, Blue: 3, Yellow: 1 (no group).
        let grid = Grid::from_str_rows(&["RRRG", "RRRG", "BBBY"]).unwrap();
        let groups = grid.find_all_groups();
        let chosen = least_common_color(&grid, groups, 2, 3);
        let colors: Vec<Tile> = chosen.iter().map(Group::color).collect();
        assert_eq!(colors, vec![Tile::Green, Tile::Blue]);
    }

    #[test]
    fn test_least_common_color_caps_group_count() {
        let grid = Grid::from_str_rows(&["GG.GG", "RBRBR", "GG.GG"]).unwrap();
        let groups = grid.find_all_groups();
        assert_eq!(groups.len(), 4);
        let chosen = least_common_color(&grid, groups, 2, 3);
        assert_eq!(chosen.len(), 3);
        assert!(chosen.iter().all(|g| g.color() == Tile::Green));
    }

    #[test]
    fn test_singleton_penalty_prefers_clean_bursts() {
        // Bursting BBB scores more but leaves four isolated cells; bursting
        // GG drops the top R onto the bottom R and isolates nothing.
        let grid = Grid::from_str_rows(&["R..", "GGB", "RBB"]).unwrap();
        let groups = grid.find_all_groups();
        assert_eq!(top_k_by_score(groups.clone(), 1)[0].color(), Tile::Blue);

        let chosen = singleton_penalty(&grid, groups, 1, 100).unwrap();
        assert_eq!(chosen[0].color(), Tile::Green);
    }

    #[test]
    fn test_singleton_penalty_saturates_on_huge_penalty() {
        let grid = Grid::from_str_rows(&["R..", "GGB", "RBB"]).unwrap();
        let chosen = singleton_penalty(&grid, grid.find_all_groups(), 1, u64::MAX).unwrap();
        assert_eq!(chosen[0].color(), Tile::Green);

        let root = GameMove::root(grid);
        let strategy = Strategy::SingletonPenalty {
            k: 1,
            penalty: u64::MAX,
        };
        let children = strategy.expand(&root).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].last_move().unwrap().color, Tile::Green);
    }

    #[test]
    fn test_singleton_penalty_rejects_foreign_groups() {
        let grid = Grid::from_str_rows(&["RB", "GR"]).unwrap();
        let foreign = Grid::from_str_rows(&["..", "GG"]).unwrap().find_all_groups();
        assert!(matches!(
            singleton_penalty(&grid, foreign, 1, 4),
            Err(Error::InvalidMove { row: 1, col: 0 })
        ));

        // Same representative cell, but a different group on this grid.
        let grid = Grid::from_str_rows(&["G.", "GG"]).unwrap();
        let foreign = Grid::from_str_rows(&["..", "GG"]).unwrap().find_all_groups();
        assert!(matches!(
            singleton_penalty(&grid, foreign, 1, 4),
            Err(Error::InvalidMove { .. })
        ));
    }

    #[test]
    fn test_expand_all_children() {
        let root = GameMove::root(Grid::from_str_rows(&["RRG", "BBG"]).unwrap());
        let children = Strategy::ExpandAll.expand(&root).unwrap();
        assert_eq!(children.len(), 3);
        assert!(children.iter().all(|c| c.depth() == 1 && c.score() == 2));
        assert_eq!(root.grid().non_empty_count(), 6);
    }

    #[test]
    fn test_closure_strategy() {
        let largest_only = |_: &Grid, groups: Vec<Group>| top_k_by_score(groups, 1);
        let root = GameMove::root(Grid::from_str_rows(&["RRR", "BBG"]).unwrap());
        let children = largest_only.expand(&root).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].score(), 6);
        assert_eq!(largest_only.name(), "custom");
    }

    #[test]
    fn test_no_groups_no_children() {
        let root = GameMove::root(Grid::from_str_rows(&["RB", "BR"]).unwrap());
        for strategy in Strategy::builtins() {
            assert!(strategy.expand(&root).unwrap().is_empty(), "{}", strategy);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Strategy::from_name("all"), Some(Strategy::ExpandAll));
        assert_eq!(Strategy::from_name("TOP-K"), Some(Strategy::default()));
        assert_eq!(Strategy::from_name("nope"), None);
    }
}
