//! Tree command for urlgroup.
//!
//! Trains on a URL list and prints the grouping trees for inspection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cli::train;
use crate::config::Config;
use crate::core::TreeSummary;

/// Options for the tree command.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the tree command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeOutput {
    /// Whether training succeeded.
    pub success: bool,
    /// Number of paths trained on.
    pub urls: usize,
    /// One entry per segment count, ascending.
    pub trees: Vec<TreeSummary>,
    /// Text rendering of `trees`.
    #[serde(skip)]
    pub dump: String,
    /// Error message if training failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TreeOutput {
    /// Create a successful output.
    pub fn success(urls: usize, trees: Vec<TreeSummary>, dump: String) -> Self {
        Self {
            success: true,
            urls,
            trees,
            dump,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            urls: 0,
            trees: Vec::new(),
            dump: String::new(),
            error: Some(error.into()),
        }
    }
}

/// The tree command implementation.
pub struct TreeCommand {
    config: Config,
    file: PathBuf,
}

impl TreeCommand {
    /// Create a new tree command.
    pub fn new(config: Config, file: PathBuf) -> Self {
        Self { config, file }
    }

    /// Run the tree command.
    pub fn run(&self, _options: &TreeOptions) -> TreeOutput {
        match train(&self.config, std::slice::from_ref(&self.file)) {
            Ok((grouper, paths)) => {
                TreeOutput::success(paths.len(), grouper.summaries(), grouper.dump())
            }
            Err(e) => TreeOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &TreeOutput, options: &TreeOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &TreeOutput) -> String {
        if !output.success {
            return format!(
                "Tree failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }
        if output.dump.is_empty() {
            return "No URLs loaded.\n".to_string();
        }
        format!("{}\n", output.dump)
    }
}
