//! Grouping trees.
//!
//! A grouping tree is a trie whose edges are keyed by label fields. Each node
//! counts the literal tokens seen at its position and decides, at
//! simplification time, whether to keep a token or replace it with its label.
//!
//! Paths come from external clients, so every walk here is a loop rather
//! than recursion.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::counter::CaseInsensitiveCounter;
use crate::core::label::LabelFields;
use crate::core::tokenizer::PathToken;

/// Number of literal values shown per node in a dump.
pub const DEFAULT_DUMP_TOP_N: usize = 20;

#[derive(Debug)]
struct Node {
    /// The label shown for this position.
    specific_label: LabelFields,
    children: HashMap<LabelFields, Node>,
    counts: CaseInsensitiveCounter,
}

impl Node {
    fn new(label: LabelFields) -> Self {
        let counts = CaseInsensitiveCounter::new(label.counter_limit());
        Self {
            specific_label: label,
            children: HashMap::new(),
            counts,
        }
    }

    /// Children ordered by label so dumps are stable.
    fn sorted_children(&self) -> Vec<&Node> {
        let mut children: Vec<(&LabelFields, &Node)> = self.children.iter().collect();
        children.sort_by(|a, b| a.0.value.cmp(&b.0.value).then_with(|| a.0.cmp(b.0)));
        children.into_iter().map(|(_, node)| node).collect()
    }
}

/// One line of a tree dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Zero for children of the root.
    pub depth: usize,
    pub label: String,
    pub important: bool,
    /// Number of tokens recorded at this node.
    pub total: u64,
    /// Most frequent literals that would be preserved, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub significant: Vec<String>,
}

impl NodeSummary {
    /// Render as an indented dump line.
    pub fn render(&self) -> String {
        let indent = "  ".repeat(self.depth);
        if self.significant.is_empty() {
            format!("{}/{}: ({})", indent, self.label, self.total)
        } else {
            format!(
                "{}/{}: [{}]({})",
                indent,
                self.label,
                self.significant.join(", "),
                self.total
            )
        }
    }
}

/// A trie of label edges for paths of one segment count.
#[derive(Debug)]
pub struct GroupingTree {
    root: Node,
}

impl Drop for GroupingTree {
    // Tear down level by level; the derived drop would recurse once per segment.
    fn drop(&mut self) {
        let mut pending: Vec<Node> = self.root.children.drain().map(|(_, node)| node).collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain().map(|(_, child)| child));
        }
    }
}

impl Default for GroupingTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupingTree {
    pub fn new() -> Self {
        Self {
            root: Node::new(LabelFields::default()),
        }
    }

    /// Record a tokenized path.
    ///
    /// When a position is reached through two different specific labels
    /// sharing a parent, the node is promoted to the parent label and its
    /// counter limit follows.
    pub fn add(&mut self, tokens: &[PathToken]) {
        let mut current = &mut self.root;
        for token in tokens {
            let edge = token.label.parent_or_self();
            let child = current
                .children
                .entry(edge.clone())
                .or_insert_with(|| Node::new(token.label.fields.clone()));

            if child.specific_label != token.label.fields {
                if child.specific_label != *edge {
                    tracing::trace!(
                        from = %child.specific_label.value,
                        to = %edge.value,
                        "promoting node to parent label"
                    );
                }
                child.specific_label = edge.clone();
                child.counts.set_limit(edge.counter_limit());
            }

            child.counts.add(&token.token);
            current = child;
        }
    }

    /// Simplify a tokenized path against what has been recorded.
    ///
    /// Once a token has no matching edge, it and everything after it are
    /// returned verbatim.
    pub fn path(&self, tokens: &[PathToken]) -> Vec<String> {
        let mut replaced = Vec::with_capacity(tokens.len());
        let mut current = &self.root;
        for (idx, token) in tokens.iter().enumerate() {
            let Some(child) = current.children.get(token.label.parent_or_self()) else {
                replaced.extend(tokens[idx..].iter().map(|t| t.token.clone()));
                break;
            };

            if child.specific_label.important && child.counts.is_significant(&token.token) {
                replaced.push(token.token.clone());
            } else {
                replaced.push(child.specific_label.value.clone());
            }
            current = child;
        }
        replaced
    }

    /// Pre-order summaries of every node below the root.
    pub fn nodes(&self, top_n: usize) -> Vec<NodeSummary> {
        let mut summaries = Vec::new();
        let mut stack: Vec<(&Node, usize)> = self
            .root
            .sorted_children()
            .into_iter()
            .rev()
            .map(|node| (node, 0))
            .collect();

        while let Some((node, depth)) = stack.pop() {
            let significant = if node.specific_label.important {
                node.counts
                    .top_n(top_n)
                    .into_iter()
                    .filter(|token| node.counts.is_significant(token))
                    .collect()
            } else {
                Vec::new()
            };
            summaries.push(NodeSummary {
                depth,
                label: node.specific_label.value.clone(),
                important: node.specific_label.important,
                total: node.counts.total(),
                significant,
            });
            stack.extend(
                node.sorted_children()
                    .into_iter()
                    .rev()
                    .map(|child| (child, depth + 1)),
            );
        }

        summaries
    }

    /// Indented text rendering, one line per node.
    pub fn dump(&self, top_n: usize) -> String {
        self.nodes(top_n)
            .iter()
            .map(NodeSummary::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += node.children.len();
            stack.extend(node.children.values());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::default_classifiers;
    use crate::core::tokenizer::label_path_tokens;

    fn tokens(path: &str) -> Vec<PathToken> {
        label_path_tokens(path, &default_classifiers())
    }

    fn trained(paths: &[&str]) -> GroupingTree {
        let mut tree = GroupingTree::new();
        for path in paths {
            tree.add(&tokens(path));
        }
        tree
    }

    #[test]
    fn test_numbers_generalize() {
        let mut tree = GroupingTree::new();
        for i in 1..=100 {
            tree.add(&tokens(&format!("/a/{i}")));
        }
        assert_eq!(tree.path(&tokens("/a/1")), vec!["a", "Number"]);
    }

    #[test]
    fn test_unseen_edge_passes_through_verbatim() {
        let tree = trained(&["/a/1", "/a/2"]);
        assert_eq!(tree.path(&tokens("/~x/1")), vec!["~x", "1"]);
        assert_eq!(tree.path(&tokens("/a/~x")), vec!["a", "~x"]);
    }

    #[test]
    fn test_empty_tree_is_verbatim() {
        let tree = GroupingTree::new();
        assert_eq!(tree.path(&tokens("/some/42")), vec!["some", "42"]);
    }

    #[test]
    fn test_divergent_children_promote_to_parent() {
        let tree = trained(&["/x/abc", "/x/123"]);
        assert_eq!(tree.path(&tokens("/x/zzz")), vec!["x", "AlphaNumeric"]);

        let nodes = tree.nodes(DEFAULT_DUMP_TOP_N);
        assert_eq!(nodes[1].label, "AlphaNumeric");
    }

    #[test]
    fn test_promotion_lifts_cardinality_limit() {
        let mut tree = GroupingTree::new();
        for i in 0..60 {
            tree.add(&tokens(&format!("/x/w{i}")));
        }
        for _ in 0..100 {
            tree.add(&tokens("/x/keep"));
        }
        // Words stopped tracking new values after 50.
        assert_eq!(tree.path(&tokens("/x/keep")), vec!["x", "Words"]);

        tree.add(&tokens("/x/a.b"));
        for _ in 0..100 {
            tree.add(&tokens("/x/again"));
        }
        assert_eq!(tree.nodes(DEFAULT_DUMP_TOP_N)[1].label, "AlphaNumeric");
        assert_eq!(tree.path(&tokens("/x/again")), vec!["x", "again"]);
        assert_eq!(tree.path(&tokens("/x/w3")), vec!["x", "AlphaNumeric"]);
    }

    #[test]
    fn test_single_child_kind_keeps_specific_label() {
        let tree = trained(&["/x/1", "/x/2", "/x/3"]);
        let nodes = tree.nodes(DEFAULT_DUMP_TOP_N);
        assert_eq!(nodes[1].label, "Number");
    }

    #[test]
    fn test_frequent_literal_is_preserved() {
        let mut tree = GroupingTree::new();
        for i in 0..60 {
            tree.add(&tokens(&format!("/en/{}", i)));
            tree.add(&tokens(&format!("/en/{}", i + 1000)));
        }
        tree.add(&tokens("/fr/1"));
        assert_eq!(tree.path(&tokens("/en/5")), vec!["en", "Number"]);
        assert_eq!(tree.path(&tokens("/fr/5")), vec!["Words", "Number"]);
    }

    #[test]
    fn test_edges_are_idempotent() {
        let mut tree = trained(&["/a/b/1", "/a/c/2"]);
        let before = tree.node_count();
        for _ in 0..10 {
            tree.add(&tokens("/a/b/1"));
            tree.add(&tokens("/a/c/2"));
        }
        assert_eq!(tree.node_count(), before);
    }

    #[test]
    fn test_dump_format() {
        let mut tree = GroupingTree::new();
        for i in 0..10 {
            tree.add(&tokens(&format!("/docs/{i}")));
        }
        let dump = tree.dump(DEFAULT_DUMP_TOP_N);
        assert_eq!(dump, "/Words: [docs](10)\n  /Number: (10)");
    }

    #[test]
    fn test_nodes_are_preorder_and_sorted() {
        let tree = trained(&["/2020/x", "/abc/1"]);
        let labels: Vec<(usize, String)> = tree
            .nodes(DEFAULT_DUMP_TOP_N)
            .into_iter()
            .map(|n| (n.depth, n.label))
            .collect();
        assert_eq!(
            labels,
            vec![
                (0, "Words".to_string()),
                (1, "Number".to_string()),
                (0, "YYYY".to_string()),
                (1, "Words".to_string()),
            ]
        );
    }

    #[test]
    fn test_deep_paths_do_not_recurse() {
        let deep = "/a".repeat(10_000);
        let mut tree = GroupingTree::new();
        tree.add(&tokens(&deep));
        assert_eq!(tree.node_count(), 10_000);
        assert_eq!(tree.path(&tokens(&deep)).len(), 10_000);
        assert_eq!(tree.nodes(1).len(), 10_000);
        drop(tree);
    }
}
