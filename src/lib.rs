//! urlgroup - URL path grouping
//!
//! urlgroup turns concrete URL paths into low-cardinality patterns such as
//! `/YYYY/MM/DD/Words` by learning, per position, which segments are
//! structural and which are identifiers. It is meant for telemetry labels,
//! log analysis and site-structure discovery.
//!
//! ```
//! let mut grouper = urlgroup::Grouper::new();
//! for i in 0..100 {
//!     grouper.add(&format!("/users/{i}"));
//! }
//! assert_eq!(grouper.simplify("/users/42"), "/users/Number");
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod util;

pub use config::Config;
pub use core::{
    default_classifiers, label_path_tokens, CaseInsensitiveCounter, CounterLimit, DefaultChain,
    Grouper, GrouperBuilder, GroupingTree, Label, LabelFields, NestedClassifier, PathToken,
    PathTokenClassifier, PrefixClassifier, RegexClassifier, YearClassifier,
};
pub use error::{Result, UrlGroupError};

// CLI commands
pub use cli::{GroupCommand, InitCommand, SimplifyCommand, TreeCommand};
