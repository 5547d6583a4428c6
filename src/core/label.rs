//! Labels assigned to path segments by classifiers.
//!
//! A label names the category a segment belongs to (`Number`, `Words`,
//! `YYYY`) and carries the knobs that decide how much literal detail the
//! grouping trees keep for it.

use serde::{Deserialize, Serialize};

/// How a label should be treated by the grouper.
///
/// `important` means literal values are candidates for preservation, subject
/// to the significance check. `cardinality_limit` bounds how many distinct
/// literals are remembered before the rest share an overflow bucket.
/// `value` is the symbolic name shown when a segment is generalized; an empty
/// value is the "no label" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelFields {
    pub important: bool,
    pub cardinality_limit: usize,
    pub value: String,
}

/// Limit on the number of distinct keys a counter tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterLimit {
    /// Track every distinct key.
    Unbounded,
    /// Track at most this many distinct keys. `AtMost(0)` keeps no literals.
    AtMost(usize),
}

impl LabelFields {
    /// Create label fields.
    pub fn new(value: impl Into<String>, important: bool, cardinality_limit: usize) -> Self {
        Self {
            important,
            cardinality_limit,
            value: value.into(),
        }
    }

    /// Derive the counter limit for nodes displaying this label.
    ///
    /// A zero limit means "unbounded" for important labels and "remember
    /// nothing" for unimportant ones.
    pub fn counter_limit(&self) -> CounterLimit {
        match (self.cardinality_limit, self.important) {
            (0, true) => CounterLimit::Unbounded,
            (n, _) => CounterLimit::AtMost(n),
        }
    }

    /// True when this is the empty "no label" sentinel.
    pub fn is_zero(&self) -> bool {
        self.value.is_empty()
    }
}

/// A classifier's output for one segment.
///
/// `parent` is set by [`NestedClassifier`](crate::core::NestedClassifier)
/// when a more general grouping applies. Trie edges are keyed on the parent
/// so specific siblings share a position, while `fields` stays available for
/// display and significance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub fields: LabelFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<LabelFields>,
}

impl Label {
    /// A label with no parent.
    pub fn new(fields: LabelFields) -> Self {
        Self {
            fields,
            parent: None,
        }
    }

    /// A specific label grouped under a more general parent.
    pub fn nested(fields: LabelFields, parent: LabelFields) -> Self {
        Self {
            fields,
            parent: Some(parent),
        }
    }

    /// The catch-all label for input no classifier recognises.
    pub fn unknown() -> Self {
        Self::new(LabelFields::new("Unknown", false, 0))
    }

    /// The edge key used by grouping trees.
    pub fn parent_or_self(&self) -> &LabelFields {
        match &self.parent {
            Some(parent) if !parent.is_zero() => parent,
            _ => &self.fields,
        }
    }

    /// True when this label means "no match".
    pub fn is_zero(&self) -> bool {
        self.fields.is_zero()
    }
}
