//! The grouper: a forest of grouping trees keyed by segment count.
//!
//! Paths with different numbers of segments are different shapes, so each
//! segment count gets its own tree and they never share positions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::core::classifier::{
    default_classifiers, DefaultChain, PathTokenClassifier, RegexClassifier,
};
use crate::core::label::{Label, LabelFields};
use crate::core::tokenizer::label_path_tokens;
use crate::core::tree::{GroupingTree, NodeSummary, DEFAULT_DUMP_TOP_N};
use crate::error::{Result, UrlGroupError};

/// Number of non-empty `/`-delimited segments in `path`.
pub fn segment_count(path: &str) -> usize {
    path.split('/').filter(|segment| !segment.is_empty()).count()
}

/// Groups URL paths into low-cardinality patterns.
///
/// Not safe for concurrent mutation; callers sharing one across threads must
/// lock around it. A grouper has no notion of hosts, so use one per host.
///
/// Memory grows with the number of distinct path shapes seen. It can be
/// bounded with classifiers whose labels are not `important` or carry a
/// `cardinality_limit`.
pub struct Grouper {
    classifiers: Vec<Box<dyn PathTokenClassifier>>,
    trees: BTreeMap<usize, GroupingTree>,
    dump_top_n: usize,
}

impl fmt::Debug for Grouper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grouper")
            .field("classifiers", &self.classifiers.len())
            .field("trees", &self.trees.keys().collect::<Vec<_>>())
            .field("dump_top_n", &self.dump_top_n)
            .finish()
    }
}

impl Default for Grouper {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-tree section of a dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummary {
    /// Segment count this tree covers.
    pub segments: usize,
    pub nodes: Vec<NodeSummary>,
}

impl Grouper {
    /// A grouper using the default classifier chain.
    pub fn new() -> Self {
        Self::with_classifiers(default_classifiers())
    }

    /// A grouper using exactly `classifiers`, in order.
    pub fn with_classifiers(classifiers: Vec<Box<dyn PathTokenClassifier>>) -> Self {
        Self {
            classifiers,
            trees: BTreeMap::new(),
            dump_top_n: DEFAULT_DUMP_TOP_N,
        }
    }

    pub fn builder() -> GrouperBuilder {
        GrouperBuilder::default()
    }

    /// Build a grouper from loaded configuration.
    ///
    /// Custom patterns are placed ahead of the built-in chain. Any invalid
    /// pattern fails the whole construction.
    pub fn from_config(config: &Config) -> Result<Self> {
        let classifiers = &config.classifiers;
        let mut builder = Self::builder().dump_top_n(config.output.dump_top_n);

        for custom in &classifiers.custom {
            builder = builder.regex_classifier(
                &custom.pattern,
                Label::new(LabelFields::new(
                    custom.value.clone(),
                    custom.important,
                    custom.cardinality_limit,
                )),
            );
        }

        if classifiers.include_defaults {
            builder = builder.default_chain(classifiers.default_chain());
        } else if classifiers.custom.is_empty() {
            return Err(UrlGroupError::config(
                "include_defaults is false and no custom classifiers are configured",
            ));
        }

        builder.build()
    }

    /// Record `path` in the tree for its segment count.
    pub fn add(&mut self, path: &str) {
        let tokens = label_path_tokens(path, &self.classifiers);
        let segments = segment_count(path);
        self.trees
            .entry(segments)
            .or_insert_with(|| {
                tracing::debug!(segments, "creating grouping tree");
                GroupingTree::new()
            })
            .add(&tokens);
    }

    /// Replace the high-cardinality segments of `path` with their labels.
    ///
    /// The result always starts with `/`. Paths whose segment count was
    /// never added come back unchanged apart from normalised separators.
    pub fn simplify(&self, path: &str) -> String {
        let tokens = label_path_tokens(path, &self.classifiers);
        let replaced = match self.trees.get(&segment_count(path)) {
            Some(tree) => tree.path(&tokens),
            None => tokens.into_iter().map(|t| t.token).collect(),
        };
        format!("/{}", replaced.join("/"))
    }

    /// Record the path of an already-parsed URL. Query and fragment are ignored.
    pub fn add_url(&mut self, url: &Url) {
        self.add(url.path());
    }

    /// Simplify the path of an already-parsed URL.
    pub fn simplify_url(&self, url: &Url) -> String {
        self.simplify(url.path())
    }

    /// Number of trees, one per distinct segment count seen.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Segment counts with a tree, ascending.
    pub fn segment_counts(&self) -> Vec<usize> {
        self.trees.keys().copied().collect()
    }

    /// Structured form of [`Grouper::dump`].
    pub fn summaries(&self) -> Vec<TreeSummary> {
        self.trees
            .iter()
            .map(|(segments, tree)| TreeSummary {
                segments: *segments,
                nodes: tree.nodes(self.dump_top_n),
            })
            .collect()
    }

    /// Render every tree as indented text for inspection.
    ///
    /// One line per node: its label, the number of tokens it has seen, and
    /// the most common literals it would preserve.
    pub fn dump(&self) -> String {
        self.trees
            .values()
            .map(|tree| tree.dump(self.dump_top_n))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Grouper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

/// Step-by-step construction of a [`Grouper`].
///
/// Steps that can fail record the first error; `build` reports it and no
/// grouper is created. Without any classifier step, the default chain is
/// used.
#[derive(Default)]
pub struct GrouperBuilder {
    classifiers: Option<Vec<Box<dyn PathTokenClassifier>>>,
    dump_top_n: Option<usize>,
    error: Option<UrlGroupError>,
}

impl GrouperBuilder {
    /// Replace the classifier chain.
    pub fn classifiers(mut self, classifiers: Vec<Box<dyn PathTokenClassifier>>) -> Self {
        self.classifiers = Some(classifiers);
        self
    }

    /// Append one classifier to the chain.
    pub fn classifier(mut self, classifier: impl PathTokenClassifier + 'static) -> Self {
        self.chain().push(Box::new(classifier));
        self
    }

    /// Append the built-in chain with the given tunables.
    pub fn default_chain(mut self, chain: DefaultChain) -> Self {
        self.chain().extend(chain.build());
        self
    }

    /// Compile and append a regex classifier.
    pub fn regex_classifier(self, pattern: &str, label: Label) -> Self {
        let compiled = RegexClassifier::from_pattern(pattern, label);
        self.option(move |builder| {
            builder.chain().push(Box::new(compiled?));
            Ok(())
        })
    }

    /// Number of literal values shown per node by `dump`.
    pub fn dump_top_n(mut self, n: usize) -> Self {
        self.dump_top_n = Some(n);
        self
    }

    /// Apply an arbitrary setup step. A failing step aborts construction.
    pub fn option<F>(mut self, step: F) -> Self
    where
        F: FnOnce(&mut GrouperBuilder) -> Result<()>,
    {
        if self.error.is_none() {
            if let Err(err) = step(&mut self) {
                self.error = Some(err);
            }
        }
        self
    }

    pub fn build(self) -> Result<Grouper> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut grouper =
            Grouper::with_classifiers(self.classifiers.unwrap_or_else(default_classifiers));
        if let Some(n) = self.dump_top_n {
            grouper.dump_top_n = n;
        }
        Ok(grouper)
    }

    fn chain(&mut self) -> &mut Vec<Box<dyn PathTokenClassifier>> {
        self.classifiers.get_or_insert_with(Vec::new)
    }
}
