//! Solver configuration.
//!
//! Load search settings from TOML so runs can be compared without
//! recompiling.
//!
//! # Examples
//!
//! ```
//! use bubble_burst::config::SolverConfig;
//! use bubble_burst::search::Traversal;
//! use bubble_burst::strategy::Strategy;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     visit_budget = 5000
//!
//!     [traversal]
//!     mode = "priority"
//!     depth_penalty = 4.0
//!
//!     [strategy]
//!     type = "least_common_color"
//!     colors = 2
//!     groups = 3
//! "#).unwrap();
//!
//! assert_eq!(config.visit_budget, 5000);
//! assert_eq!(config.traversal, Traversal::Priority { depth_penalty: 4.0 });
//! assert_eq!(config.strategy, Strategy::LeastCommonColor { colors: 2, groups: 3 });
//! assert_eq!(config.workers, 1);
//! ```
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::search::{Search, Traversal, DEFAULT_VISIT_BUDGET};
use crate::strategy::Strategy;

/// Everything needed to run one search.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Maximum number of nodes to visit.
    pub visit_budget: usize,

    /// Number of concurrent workers. 1 runs the sequential engine.
    pub workers: usize,

    pub traversal: Traversal,

    pub strategy: Strategy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            visit_budget: DEFAULT_VISIT_BUDGET,
            workers: 1,
            traversal: Traversal::default(),
            strategy: Strategy::default(),
        }
    }
}

impl SolverConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML config string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SolverConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::InvalidConfig {
                message: message.to_string(),
            })
        };

        if self.visit_budget == 0 {
            return invalid("visit_budget must be at least 1");
        }
        if self.workers == 0 {
            return invalid("workers must be at least 1");
        }
        if let Traversal::Priority { depth_penalty } = self.traversal {
            if !depth_penalty.is_finite() || depth_penalty < 0.0 {
                return invalid("depth_penalty must be a finite, non-negative number");
            }
        }
        match self.strategy {
            Strategy::TopKByScore { k } | Strategy::SingletonPenalty { k, .. } if k == 0 => {
                invalid("strategy k must be at least 1")
            }
            Strategy::LeastCommonColor { colors, groups } if colors == 0 || groups == 0 => {
                invalid("least_common_color needs at least 1 color and 1 group")
            }
            _ => Ok(()),
        }
    }

    /// Builds the search described by this config around `strategy`.
    pub fn search<'s>(&self, strategy: &'s Strategy) -> Search<'s, Strategy> {
        Search::new(strategy, self.traversal, self.visit_budget).with_workers(self.workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = SolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, SolverConfig::default());
    }

    #[test]
    fn test_breadth_first_and_expand_all() {
        let config = SolverConfig::from_toml_str(
            r#"
            workers = 4
            [traversal]
            mode = "breadth_first"
            [strategy]
            type = "expand_all"
            "#,
        )
        .unwrap();
        assert_eq!(config.traversal, Traversal::BreadthFirst);
        assert_eq!(config.strategy, Strategy::ExpandAll);
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_strategy_parameter_defaults() {
        let config = SolverConfig::from_toml_str(
            r#"
            [strategy]
            type = "singleton_penalty"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.strategy,
            Strategy::SingletonPenalty { k: 3, penalty: 4 }
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        for toml in [
            "visit_budget = 0",
            "workers = 0",
            "[traversal]\nmode = \"priority\"\ndepth_penalty = -1.0",
            "[strategy]\ntype = \"top_k_by_score\"\nk = 0",
            "[strategy]\ntype = \"least_common_color\"\ncolors = 0",
        ] {
            let err = SolverConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig { .. }), "{}", toml);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            SolverConfig::from_toml_str("visit_budget = \"many\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("unknown_key = 1"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("[strategy]\ntype = \"random\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SolverConfig::load("/nonexistent/bubble_burst.toml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
