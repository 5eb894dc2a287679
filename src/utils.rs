//! Helpers shared by the binaries: grid file loading and log setup.
use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Installs a stderr `tracing` subscriber. `RUST_LOG` overrides the default
/// `bubble_burst=info` filter. Safe to call more than once.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bubble_burst=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Reads a grid file: one row per line, `R G B Y P` for colors and `.` for
/// empty cells. Blank lines and surrounding whitespace are ignored.
pub fn load_grid(path: impl AsRef<Path>) -> Result<Grid> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    content.parse()
}
