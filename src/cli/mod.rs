//! CLI commands for urlgroup.
//!
//! - **Grouping commands**: group, simplify, tree (train on URL lists)
//! - **Utility commands**: init

pub mod group;
pub mod simplify;
pub mod tree;

pub mod init;

pub use group::GroupCommand;
pub use init::InitCommand;
pub use simplify::SimplifyCommand;
pub use tree::TreeCommand;

use std::path::PathBuf;

use crate::config::Config;
use crate::core::Grouper;
use crate::error::Result;
use crate::util::load_paths;

/// Build a grouper from `config` and train it on every path in `files`.
///
/// Returns the trained grouper and the paths it was trained on, in input
/// order.
pub(crate) fn train(config: &Config, files: &[PathBuf]) -> Result<(Grouper, Vec<String>)> {
    let mut grouper = Grouper::from_config(config)?;
    let mut paths = Vec::new();
    for file in files {
        let loaded = load_paths(file, config.output.max_file_size)?;
        tracing::debug!(file = %file.display(), paths = loaded.len(), "loaded url list");
        paths.extend(loaded);
    }
    for path in &paths {
        grouper.add(path);
    }
    Ok((grouper, paths))
}
