//! Configuration loading for urlgroup.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.urlgroup/config.toml`)
//! 3. User config (`~/.urlgroup/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The built-in classifier chain is used when
//! no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::classifier::{DefaultChain, DEFAULT_WORDS_LIMIT, DEFAULT_YEAR_START};
use crate::core::tree::DEFAULT_DUMP_TOP_N;
use crate::error::{FailOpen, Result, UrlGroupError};
use crate::util::MAX_FILE_SIZE;

/// Name of the per-project and per-user config directory.
pub const CONFIG_DIR_NAME: &str = ".urlgroup";

/// Main configuration struct for urlgroup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Classifier chain configuration.
    pub classifiers: ClassifierConfig,
    /// Output and input limits.
    pub output: OutputConfig,
}

/// Classifier chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Earliest year recognised as `YYYY`.
    pub year_start: i32,
    /// Latest year recognised as `YYYY`; the current year when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_end: Option<i32>,
    /// Distinct `Words` values remembered per position.
    pub words_cardinality_limit: usize,
    /// Distinct `Letters` values remembered per position.
    pub letters_cardinality_limit: usize,
    /// Whether the built-in chain runs after the custom classifiers.
    pub include_defaults: bool,
    /// Extra regex classifiers, tried before the built-in chain.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomClassifierConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            year_start: DEFAULT_YEAR_START,
            year_end: None,
            words_cardinality_limit: DEFAULT_WORDS_LIMIT,
            letters_cardinality_limit: DEFAULT_WORDS_LIMIT,
            include_defaults: true,
            custom: Vec::new(),
        }
    }
}

impl ClassifierConfig {
    /// Tunables for the built-in chain.
    pub fn default_chain(&self) -> DefaultChain {
        let base = DefaultChain::default();
        DefaultChain {
            year_start: self.year_start,
            year_end: self.year_end.unwrap_or(base.year_end),
            words_cardinality_limit: self.words_cardinality_limit,
            letters_cardinality_limit: self.letters_cardinality_limit,
        }
    }
}

/// One user-defined regex classifier.
///
/// ```toml
/// [[classifiers.custom]]
/// pattern = '^[0-9a-f]{32}(?:/|$)'
/// value = "Hash"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CustomClassifierConfig {
    /// Anchored pattern; it should consume the trailing `/` when present.
    pub pattern: String,
    /// Label shown in simplified paths.
    pub value: String,
    /// Whether literal values may be preserved.
    pub important: bool,
    /// Distinct values remembered per position.
    pub cardinality_limit: usize,
}

/// Output and input limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Literal values shown per node in tree dumps.
    pub dump_top_n: usize,
    /// Largest URL list accepted, in bytes.
    pub max_file_size: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dump_top_n: DEFAULT_DUMP_TOP_N,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `<urlgroup_home>/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = urlgroup_home()?;
        Self::load_optional(&home.join("config.toml"))
    }

    /// Load project config from `.urlgroup/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_optional(&project_config_path(cwd))
    }

    /// Missing files are silent; unreadable or invalid ones are logged.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_default(&format!("loading config {}", path.display()))
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| UrlGroupError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| UrlGroupError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Some(n) = env_parse::<i32>("URLGROUP_YEAR_START") {
            self.classifiers.year_start = n;
        }

        if let Some(n) = env_parse::<i32>("URLGROUP_YEAR_END") {
            self.classifiers.year_end = Some(n);
        }

        if let Some(n) = env_parse::<usize>("URLGROUP_WORDS_LIMIT") {
            self.classifiers.words_cardinality_limit = n;
        }

        if let Some(n) = env_parse::<usize>("URLGROUP_LETTERS_LIMIT") {
            self.classifiers.letters_cardinality_limit = n;
        }

        if let Some(n) = env_parse::<usize>("URLGROUP_DUMP_TOP_N") {
            self.output.dump_top_n = n;
        }

        if let Some(n) = env_parse::<u64>("URLGROUP_MAX_FILE_SIZE") {
            if n > 0 {
                self.output.max_file_size = n;
            } else {
                tracing::warn!(
                    "Invalid URLGROUP_MAX_FILE_SIZE value '0'. Using '{}'.",
                    self.output.max_file_size
                );
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Non-default fields of `other` win. As with any default-comparison
    /// merge, a higher layer cannot set a field back to its default once a
    /// lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_classifiers = ClassifierConfig::default();
        if other.classifiers.year_start != default_classifiers.year_start {
            self.classifiers.year_start = other.classifiers.year_start;
        }
        if other.classifiers.year_end.is_some() {
            self.classifiers.year_end = other.classifiers.year_end;
        }
        if other.classifiers.words_cardinality_limit
            != default_classifiers.words_cardinality_limit
        {
            self.classifiers.words_cardinality_limit = other.classifiers.words_cardinality_limit;
        }
        if other.classifiers.letters_cardinality_limit
            != default_classifiers.letters_cardinality_limit
        {
            self.classifiers.letters_cardinality_limit =
                other.classifiers.letters_cardinality_limit;
        }
        if other.classifiers.include_defaults != default_classifiers.include_defaults {
            self.classifiers.include_defaults = other.classifiers.include_defaults;
        }
        // Custom classifiers from a higher layer run first.
        if !other.classifiers.custom.is_empty() {
            let mut custom = other.classifiers.custom;
            custom.append(&mut self.classifiers.custom);
            self.classifiers.custom = custom;
        }

        let default_output = OutputConfig::default();
        if other.output.dump_top_n != default_output.dump_top_n {
            self.output.dump_top_n = other.output.dump_top_n;
        }
        if other.output.max_file_size != default_output.max_file_size {
            self.output.max_file_size = other.output.max_file_size;
        }

        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let val = env::var(name).ok()?;
    match val.parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(
                "Invalid {} value '{}'. Expected a number. Ignoring.",
                name,
                val
            );
            None
        }
    }
}

/// Path of the project config file under `cwd`.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(CONFIG_DIR_NAME).join("config.toml")
}

/// Get the urlgroup home directory.
///
/// Checks `URLGROUP_HOME` first, then falls back to `~/.urlgroup`. An empty
/// `URLGROUP_HOME` is ignored.
pub fn urlgroup_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("URLGROUP_HOME") {
        if home.is_empty() {
            tracing::warn!("URLGROUP_HOME is empty, using default");
        } else {
            return Some(PathBuf::from(home));
        }
    }

    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME))
}
