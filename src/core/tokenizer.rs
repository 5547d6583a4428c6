//! Splits a path into labeled tokens using a classifier chain.

use crate::core::classifier::PathTokenClassifier;
use crate::core::label::Label;

/// One classified segment of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathToken {
    /// The raw text, trailing separators stripped.
    pub token: String,
    pub label: Label,
}

/// Tokenize `path` with `classifiers`.
///
/// Leading separators are skipped, the chain is run against the remainder
/// and the match is consumed. Input no classifier recognises becomes an
/// `Unknown` token covering the rest of that segment. A classifier that
/// returns something other than a non-empty prefix of the remainder ends
/// tokenization with the whole remainder as one `Unknown` token, which
/// guarantees termination.
pub fn label_path_tokens<C>(path: &str, classifiers: &[C]) -> Vec<PathToken>
where
    C: PathTokenClassifier,
{
    let mut tokens = Vec::new();
    let mut remainder = path;

    loop {
        remainder = remainder.trim_start_matches('/');
        if remainder.is_empty() {
            break;
        }

        let (label, matched) = classify(remainder, classifiers);
        if matched.is_empty() || !remainder.starts_with(matched) {
            tracing::debug!(
                remainder,
                matched,
                "classifier returned a match that is not a prefix, treating remainder as unknown"
            );
            tokens.push(PathToken {
                token: remainder.to_string(),
                label: Label::unknown(),
            });
            break;
        }

        tokens.push(PathToken {
            token: matched.trim_end_matches('/').to_string(),
            label,
        });
        remainder = &remainder[matched.len()..];
    }

    tokens
}

/// Run the chain against `remainder`; first non-zero label wins.
fn classify<'a, C>(remainder: &'a str, classifiers: &[C]) -> (Label, &'a str)
where
    C: PathTokenClassifier,
{
    for classifier in classifiers {
        if let Some((label, matched)) = classifier.check(remainder) {
            if !label.is_zero() {
                return (label, matched);
            }
        }
    }

    let segment_end = remainder.find('/').map_or(remainder.len(), |i| i + 1);
    (Label::unknown(), &remainder[..segment_end])
}
