//! Group command for urlgroup.
//!
//! Trains on one or more URL lists and reports the distinct simplified
//! patterns with how many input URLs fell into each.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cli::train;
use crate::config::Config;

/// Options for the group command.
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of patterns to report.
    pub limit: Option<usize>,
}

/// One simplified pattern and its hit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCount {
    pub pattern: String,
    pub count: u64,
}

/// Output format for the group command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOutput {
    /// Whether grouping succeeded.
    pub success: bool,
    /// Number of paths trained on.
    pub urls: usize,
    /// Number of distinct patterns before any limit was applied.
    pub total_patterns: usize,
    /// Patterns, most frequent first.
    pub patterns: Vec<PatternCount>,
    /// Error message if grouping failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GroupOutput {
    /// Create a successful output.
    pub fn success(urls: usize, total_patterns: usize, patterns: Vec<PatternCount>) -> Self {
        Self {
            success: true,
            urls,
            total_patterns,
            patterns,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            urls: 0,
            total_patterns: 0,
            patterns: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The group command implementation.
pub struct GroupCommand {
    config: Config,
    files: Vec<PathBuf>,
}

impl GroupCommand {
    /// Create a new group command.
    pub fn new(config: Config, files: Vec<PathBuf>) -> Self {
        Self { config, files }
    }

    /// Run the group command.
    pub fn run(&self, options: &GroupOptions) -> GroupOutput {
        let (grouper, paths) = match train(&self.config, &self.files) {
            Ok(trained) => trained,
            Err(e) => return GroupOutput::failure(e.to_string()),
        };

        let mut counts: HashMap<String, u64> = HashMap::new();
        for path in &paths {
            *counts.entry(grouper.simplify(path)).or_insert(0) += 1;
        }

        let mut patterns: Vec<PatternCount> = counts
            .into_iter()
            .map(|(pattern, count)| PatternCount { pattern, count })
            .collect();
        patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.pattern.cmp(&b.pattern)));

        let total_patterns = patterns.len();
        if let Some(limit) = options.limit {
            patterns.truncate(limit);
        }

        GroupOutput::success(paths.len(), total_patterns, patterns)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &GroupOutput, options: &GroupOptions) -> String {
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
    fn format_human_readable(&self, output: &GroupOutput) -> String {
        if !output.success {
            return format!(
                "Group failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.patterns.is_empty() {
            return "No URLs to group.\n".to_string();
        }

        let width = output
            .patterns
            .iter()
            .map(|p| p.count.to_string().len())
            .max()
            .unwrap_or(1);

        let mut lines: Vec<String> = output
            .patterns
            .iter()
            .map(|p| format!("{:>width$}  {}", p.count, p.pattern, width = width))
            .collect();

        lines.push(String::new());
        let shown = if output.patterns.len() < output.total_patterns {
            format!(
                "{} of {} patterns",
                output.patterns.len(),
                output.total_patterns
            )
        } else {
            format!("{} patterns", output.total_patterns)
        };
        lines.push(format!("{} from {} URLs", shown, output.urls));

        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_urls(temp: &TempDir, name: &str, urls: &[String]) -> PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, urls.join("\n")).unwrap();
        path
    }

    fn article_urls() -> Vec<String> {
        (1..=40)
            .map(|i| format!("https://example.com/articles/{i}"))
            .collect()
    }

    #[test]
    fn test_group_output_failure() {
        let output = GroupOutput::failure("boom");
        assert!(!output.success);
        assert!(output.patterns.is_empty());
        assert_eq!(output.error, Some("boom".to_string()));
    }

    #[test]
    fn test_group_collapses_ids() {
        let temp = TempDir::new().unwrap();
        let file = write_urls(&temp, "urls.txt", &article_urls());

        let cmd = GroupCommand::new(Config::default(), vec![file]);
        let output = cmd.run(&GroupOptions::default());

        assert!(output.success);
        assert_eq!(output.urls, 40);
        assert_eq!(
            output.patterns,
            vec![PatternCount {
                pattern: "/articles/Number".to_string(),
                count: 40
            }]
        );
    }

    #[test]
    fn test_group_sorted_by_count_and_limited() {
        let temp = TempDir::new().unwrap();
        let mut urls = article_urls();
        urls.push("https://example.com/".to_string());
        let first = write_urls(&temp, "a.txt", &urls);
        let second = write_urls(
            &temp,
            "b.txt",
            &["https://example.com/".to_string(), "# comment".to_string()],
        );

        let cmd = GroupCommand::new(Config::default(), vec![first, second]);
        let output = cmd.run(&GroupOptions {
            limit: Some(1),
            ..Default::default()
        });

        assert!(output.success);
        assert_eq!(output.urls, 42);
        assert_eq!(output.total_patterns, 2);
        assert_eq!(output.patterns.len(), 1);
        assert_eq!(output.patterns[0].pattern, "/articles/Number");
    }

    #[test]
    fn test_group_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let cmd = GroupCommand::new(Config::default(), vec![temp.path().join("missing.txt")]);
        let output = cmd.run(&GroupOptions::default());
        assert!(!output.success);
        assert!(output.error.is_some());
    }

    #[test]
    fn test_format_output_quiet() {
        let cmd = GroupCommand::new(Config::default(), Vec::new());
        let output = GroupOutput::success(0, 0, Vec::new());
        let options = GroupOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &options).is_empty());
    }

    #[test]
    fn test_format_output_json() {
        let cmd = GroupCommand::new(Config::default(), Vec::new());
        let output = GroupOutput::success(
            3,
            1,
            vec![PatternCount {
                pattern: "/a/Number".to_string(),
                count: 3,
            }],
        );
        let options = GroupOptions {
            json: true,
            ..Default::default()
        };
        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("\"success\": true"));
        assert!(formatted.contains("\"pattern\": \"/a/Number\""));
    }

    #[test]
    fn test_format_output_human_readable() {
        let cmd = GroupCommand::new(Config::default(), Vec::new());
        let output = GroupOutput::success(
            12,
            3,
            vec![
                PatternCount {
                    pattern: "/a/Number".to_string(),
                    count: 10,
                },
                PatternCount {
                    pattern: "/b".to_string(),
                    count: 1,
                },
            ],
        );
        let formatted = cmd.format_output(&output, &GroupOptions::default());
        assert!(formatted.contains("10  /a/Number"));
        assert!(formatted.contains(" 1  /b"));
        assert!(formatted.contains("2 of 3 patterns from 12 URLs"));
    }

    #[test]
    fn test_format_output_empty() {
        let cmd = GroupCommand::new(Config::default(), Vec::new());
        let output = GroupOutput::success(0, 0, Vec::new());
        let formatted = cmd.format_output(&output, &GroupOptions::default());
        assert_eq!(formatted, "No URLs to group.\n");
    }
}
