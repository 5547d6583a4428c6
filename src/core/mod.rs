//! The grouping engine.
//!
//! Paths are split into labeled tokens by a classifier chain, then recorded
//! in (or simplified against) a grouping tree chosen by segment count.

pub mod classifier;
pub mod counter;
pub mod grouper;
pub mod label;
pub mod tokenizer;
pub mod tree;

pub use classifier::{
    alphanumeric_classifier, default_classifiers, letters_classifier, number_classifier,
    words_classifier, yyyymmdd_classifier, DefaultChain, NestedClassifier, PathTokenClassifier,
    PrefixClassifier, RegexClassifier, YearClassifier,
};
pub use counter::{CaseInsensitiveCounter, OVERFLOW_KEY, SIGNIFICANCE_THRESHOLD};
pub use grouper::{segment_count, Grouper, GrouperBuilder, TreeSummary};
pub use label::{CounterLimit, Label, LabelFields};
pub use tokenizer::{label_path_tokens, PathToken};
pub use tree::{GroupingTree, NodeSummary, DEFAULT_DUMP_TOP_N};
