//! Simplify command for urlgroup.
//!
//! Trains on a URL list, then maps each given URL to its pattern.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cli::train;
use crate::config::Config;
use crate::util::path_of;

/// Options for the simplify command.
#[derive(Debug, Clone, Default)]
pub struct SimplifyOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Result for one input URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simplified {
    /// The URL or path as given.
    pub input: String,
    /// Simplified path; absent if the input could not be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output format for the simplify command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyOutput {
    /// Whether training succeeded and every input parsed.
    pub success: bool,
    /// Number of paths trained on.
    pub trained: usize,
    pub results: Vec<Simplified>,
    /// Error message if training failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimplifyOutput {
    /// Create an output from per-URL results.
    pub fn from_results(trained: usize, results: Vec<Simplified>) -> Self {
        Self {
            success: results.iter().all(|r| r.error.is_none()),
            trained,
            results,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            trained: 0,
            results: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The simplify command implementation.
pub struct SimplifyCommand {
    config: Config,
    file: PathBuf,
    urls: Vec<String>,
}

impl SimplifyCommand {
    /// Create a new simplify command.
    pub fn new(config: Config, file: PathBuf, urls: Vec<String>) -> Self {
        Self { config, file, urls }
    }

    /// Run the simplify command.
    pub fn run(&self, _options: &SimplifyOptions) -> SimplifyOutput {
        let (grouper, paths) = match train(&self.config, std::slice::from_ref(&self.file)) {
            Ok(trained) => trained,
            Err(e) => return SimplifyOutput::failure(e.to_string()),
        };

        let results = self
            .urls
            .iter()
            .map(|input| match path_of(input) {
                Ok(path) => Simplified {
                    input: input.clone(),
                    pattern: Some(grouper.simplify(&path)),
                    error: None,
                },
                Err(e) => Simplified {
                    input: input.clone(),
                    pattern: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        SimplifyOutput::from_results(paths.len(), results)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SimplifyOutput, options: &SimplifyOptions) -> String {
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
    fn format_human_readable(&self, output: &SimplifyOutput) -> String {
        if let Some(error) = &output.error {
            return format!("Simplify failed: {}\n", error);
        }

        let lines: Vec<String> = output
            .results
            .iter()
            .map(|r| match (&r.pattern, &r.error) {
                (Some(pattern), _) => format!("{} -> {}", r.input, pattern),
                (None, Some(error)) => format!("{} -> error: {}", r.input, error),
                (None, None) => r.input.clone(),
            })
            .collect();

        if lines.is_empty() {
            return String::new();
        }
        lines.join("\n") + "\n"
    }
}
