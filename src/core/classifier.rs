//! Path token classifiers.
//!
//! A classifier looks at the unconsumed remainder of a path and, when it
//! recognises a prefix, returns a [`Label`] together with the exact prefix it
//! consumed. The prefix is expected to end at or before the next `/`.
//!
//! Order matters: the grouper tries classifiers in sequence and the first
//! match wins, so constrained patterns (dates, years) come before general
//! ones.

use std::sync::{Arc, LazyLock};

use chrono::Datelike;
use regex::Regex;

use crate::core::label::{Label, LabelFields};
use crate::error::{Result, UrlGroupError};

static REGEX_YYYY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}(?:/|$)").expect("year pattern is valid"));
static REGEX_YYYYMMDD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}/(?:0[1-9]|1[0-2])/(?:0[1-9]|[12][0-9]|3[01])(?:/|$)")
        .expect("date pattern is valid")
});
static REGEX_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9\-_. ]+(?:/|$)").expect("alphanumeric pattern is valid")
});
static REGEX_NUMBERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:/|$)").expect("number pattern is valid"));
static REGEX_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z0-9]+[-_]?)+(?:/|$)").expect("words pattern is valid")
});
static REGEX_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+(?:/|$)").expect("letters pattern is valid"));

/// Earliest year the default year classifier accepts.
pub const DEFAULT_YEAR_START: i32 = 1900;

/// Default distinct-value budget for the `Words` and `Letters` labels.
pub const DEFAULT_WORDS_LIMIT: usize = 50;

/// Recognises a prefix of a path.
///
/// Returns `None` (or a zero label) when the remainder doesn't match. On a
/// match, the returned slice tells the grouper how much of the path to
/// consume; it must be a non-empty prefix of `remainder`.
pub trait PathTokenClassifier: Send + Sync {
    fn check<'a>(&self, remainder: &'a str) -> Option<(Label, &'a str)>;
}

impl<T: PathTokenClassifier + ?Sized> PathTokenClassifier for Box<T> {
    fn check<'a>(&self, remainder: &'a str) -> Option<(Label, &'a str)> {
        (**self).check(remainder)
    }
}

impl<T: PathTokenClassifier + ?Sized> PathTokenClassifier for Arc<T> {
    fn check<'a>(&self, remainder: &'a str) -> Option<(Label, &'a str)> {
        (**self).check(remainder)
    }
}

/// Emits a fixed label for whatever an anchored pattern matches.
#[derive(Debug, Clone)]
pub struct RegexClassifier {
    regex: Regex,
    label: Label,
}

impl RegexClassifier {
    /// Wrap an already-compiled pattern.
    ///
    /// Only matches starting at the beginning of the remainder count, so a
    /// pattern without a leading `^` still classifies the current segment.
    pub fn new(regex: Regex, label: Label) -> Self {
        Self { regex, label }
    }

    /// Compile `pattern` and wrap it.
    pub fn from_pattern(pattern: &str, label: Label) -> Result<Self> {
        if label.is_zero() {
            return Err(UrlGroupError::classifier(format!(
                "pattern '{}' has an empty label value",
                pattern
            )));
        }
        let regex = Regex::new(pattern)?;
        Ok(Self::new(regex, label))
    }
}

impl PathTokenClassifier for RegexClassifier {
    fn check<'a>(&self, remainder: &'a str) -> Option<(Label, &'a str)> {
        let found = self.regex.find(remainder)?;
        if found.start() != 0 || found.as_str().is_empty() {
            return None;
        }
        Some((self.label.clone(), found.as_str()))
    }
}

/// Matches a leading four-digit year within `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearClassifier {
    pub start: i32,
    pub end: i32,
}

impl YearClassifier {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }
}

impl Default for YearClassifier {
    /// 1900 through the current year.
    fn default() -> Self {
        Self::new(DEFAULT_YEAR_START, chrono::Utc::now().year())
    }
}

impl PathTokenClassifier for YearClassifier {
    fn check<'a>(&self, remainder: &'a str) -> Option<(Label, &'a str)> {
        let matched = REGEX_YYYY.find(remainder)?.as_str();
        let year: i32 = matched[..4].parse().ok()?;
        if year < self.start || year > self.end {
            return None;
        }
        Some((Label::new(LabelFields::new("YYYY", false, 0)), matched))
    }
}

/// Groups several specific classifiers under a general one.
///
/// The parent runs first; if it matches, the children are tried in order
/// against the parent's match. A matching child yields its own fields with
/// the parent's fields attached, so trees see one edge for all children but
/// keep the specific label until two different children meet at the same
/// position.
pub struct NestedClassifier {
    parent: Box<dyn PathTokenClassifier>,
    children: Vec<Box<dyn PathTokenClassifier>>,
}

impl NestedClassifier {
    pub fn new(
        parent: Box<dyn PathTokenClassifier>,
        children: Vec<Box<dyn PathTokenClassifier>>,
    ) -> Self {
        Self { parent, children }
    }
}

impl PathTokenClassifier for NestedClassifier {
    fn check<'a>(&self, remainder: &'a str) -> Option<(Label, &'a str)> {
        let (parent_label, matched) = self
            .parent
            .check(remainder)
            .filter(|(label, _)| !label.is_zero())?;

        for child in &self.children {
            if let Some((child_label, _)) = child.check(matched) {
                if !child_label.is_zero() {
                    return Some((
                        Label::nested(child_label.fields, parent_label.fields),
                        matched,
                    ));
                }
            }
        }

        Some((Label::new(parent_label.fields), matched))
    }
}

/// Matches a fixed literal prefix, such as `"api/"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixClassifier {
    prefix: String,
    label: Label,
}

impl PrefixClassifier {
    pub fn new(prefix: impl Into<String>, label: Label) -> Self {
        Self {
            prefix: prefix.into(),
            label,
        }
    }
}

impl PathTokenClassifier for PrefixClassifier {
    fn check<'a>(&self, remainder: &'a str) -> Option<(Label, &'a str)> {
        if self.prefix.is_empty() || !remainder.starts_with(&self.prefix) {
            return None;
        }
        Some((self.label.clone(), &remainder[..self.prefix.len()]))
    }
}

/// `YYYY/MM/DD` dates with valid month and day ranges.
pub fn yyyymmdd_classifier() -> RegexClassifier {
    RegexClassifier::new(
        REGEX_YYYYMMDD.clone(),
        Label::new(LabelFields::new("YYYY/MM/DD", false, 0)),
    )
}

/// Letters, digits, dashes, underscores, dots and spaces.
pub fn alphanumeric_classifier() -> RegexClassifier {
    RegexClassifier::new(
        REGEX_ALPHANUMERIC.clone(),
        Label::new(LabelFields::new("AlphaNumeric", true, 0)),
    )
}

/// Digits only.
pub fn number_classifier() -> RegexClassifier {
    RegexClassifier::new(
        REGEX_NUMBERS.clone(),
        Label::new(LabelFields::new("Number", false, 0)),
    )
}

/// Alphanumeric words joined by dashes or underscores.
pub fn words_classifier(cardinality_limit: usize) -> RegexClassifier {
    RegexClassifier::new(
        REGEX_WORDS.clone(),
        Label::new(LabelFields::new("Words", true, cardinality_limit)),
    )
}

/// Letters only.
pub fn letters_classifier(cardinality_limit: usize) -> RegexClassifier {
    RegexClassifier::new(
        REGEX_LETTERS.clone(),
        Label::new(LabelFields::new("Letters", true, cardinality_limit)),
    )
}

/// Tunables for the built-in classifier chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultChain {
    pub year_start: i32,
    pub year_end: i32,
    pub words_cardinality_limit: usize,
    pub letters_cardinality_limit: usize,
}

impl Default for DefaultChain {
    fn default() -> Self {
        let years = YearClassifier::default();
        Self {
            year_start: years.start,
            year_end: years.end,
            words_cardinality_limit: DEFAULT_WORDS_LIMIT,
            letters_cardinality_limit: DEFAULT_WORDS_LIMIT,
        }
    }
}

impl DefaultChain {
    /// Build the chain: full dates, years, then alphanumeric runs refined
    /// into numbers, words or letters.
    pub fn build(&self) -> Vec<Box<dyn PathTokenClassifier>> {
        vec![
            Box::new(yyyymmdd_classifier()),
            Box::new(YearClassifier::new(self.year_start, self.year_end)),
            Box::new(NestedClassifier::new(
                Box::new(alphanumeric_classifier()),
                vec![
                    Box::new(number_classifier()),
                    Box::new(words_classifier(self.words_cardinality_limit)),
                    Box::new(letters_classifier(self.letters_cardinality_limit)),
                ],
            )),
        ]
    }
}

/// The built-in classifier chain with default tunables.
pub fn default_classifiers() -> Vec<Box<dyn PathTokenClassifier>> {
    DefaultChain::default().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match<'a>(
        classifiers: &[Box<dyn PathTokenClassifier>],
        remainder: &'a str,
    ) -> Option<(Label, &'a str)> {
        classifiers.iter().find_map(|c| c.check(remainder))
    }

    #[test]
    fn test_regex_classifier_match() {
        let (label, matched) = number_classifier().check("123/abc").unwrap();
        assert_eq!(label.fields.value, "Number");
        assert_eq!(matched, "123/");
    }

    #[test]
    fn test_regex_classifier_no_match() {
        assert!(number_classifier().check("12a/abc").is_none());
    }

    #[test]
    fn test_regex_classifier_only_matches_at_start() {
        let label = Label::new(LabelFields::new("Hash", false, 0));
        let classifier = RegexClassifier::from_pattern("[0-9a-f]{32}(?:/|$)", label).unwrap();
        let hash = "0123456789abcdef0123456789abcdef";

        let mid_path = format!("users/{hash}/profile");
        assert!(classifier.check(&mid_path).is_none());

        let at_start = format!("{hash}/profile");
        let (label, matched) = classifier.check(&at_start).unwrap();
        assert_eq!(label.fields.value, "Hash");
        assert_eq!(matched, format!("{hash}/"));
    }

    #[test]
    fn test_regex_classifier_from_invalid_pattern() {
        let label = Label::new(LabelFields::new("Broken", true, 0));
        let err = RegexClassifier::from_pattern("^(unclosed", label).unwrap_err();
        assert!(matches!(err, UrlGroupError::Classifier { .. }));
    }

    #[test]
    fn test_regex_classifier_rejects_zero_label() {
        let err = RegexClassifier::from_pattern("^abc", Label::default()).unwrap_err();
        assert!(err.to_string().contains("empty label"));
    }

    #[test]
    fn test_yyyymmdd_classifier() {
        let (label, matched) = yyyymmdd_classifier().check("2013/11/20/post").unwrap();
        assert_eq!(label.fields.value, "YYYY/MM/DD");
        assert_eq!(matched, "2013/11/20/");

        assert!(yyyymmdd_classifier().check("2013/13/20").is_none());
        assert!(yyyymmdd_classifier().check("2013/11/32").is_none());
        assert!(yyyymmdd_classifier().check("2013/00/10").is_none());
        assert!(yyyymmdd_classifier().check("2013/11/20x").is_none());
    }

    #[test]
    fn test_year_classifier_in_range() {
        let years = YearClassifier::new(1900, 2020);
        let (label, matched) = years.check("2013/archive").unwrap();
        assert_eq!(label.fields.value, "YYYY");
        assert!(!label.fields.important);
        assert_eq!(matched, "2013/");
        assert!(years.check("1900").is_some());
        assert!(years.check("2020").is_some());
    }

    #[test]
    fn test_year_classifier_out_of_range() {
        let years = YearClassifier::new(1900, 2020);
        assert!(years.check("1899").is_none());
        assert!(years.check("2021/").is_none());
        assert!(years.check("4567").is_none());
    }

    #[test]
    fn test_year_classifier_requires_exact_digits() {
        let years = YearClassifier::new(1900, 2020);
        assert!(years.check("20134").is_none());
        assert!(years.check("201").is_none());
    }

    #[test]
    fn test_year_classifier_default_ends_this_year() {
        let years = YearClassifier::default();
        assert_eq!(years.start, DEFAULT_YEAR_START);
        assert_eq!(years.end, chrono::Utc::now().year());
    }

    #[test]
    fn test_nested_child_match_carries_parent() {
        let nested = NestedClassifier::new(
            Box::new(alphanumeric_classifier()),
            vec![Box::new(number_classifier())],
        );
        let (label, matched) = nested.check("42/next").unwrap();
        assert_eq!(label.fields.value, "Number");
        assert_eq!(label.parent.as_ref().unwrap().value, "AlphaNumeric");
        assert_eq!(matched, "42/");
    }

    #[test]
    fn test_nested_falls_back_to_parent() {
        let nested = NestedClassifier::new(
            Box::new(alphanumeric_classifier()),
            vec![Box::new(number_classifier())],
        );
        let (label, matched) = nested.check("index.html").unwrap();
        assert_eq!(label.fields.value, "AlphaNumeric");
        assert!(label.parent.is_none());
        assert_eq!(matched, "index.html");
    }

    #[test]
    fn test_nested_parent_miss_is_miss() {
        let nested = NestedClassifier::new(
            Box::new(alphanumeric_classifier()),
            vec![Box::new(number_classifier())],
        );
        assert!(nested.check("@home").is_none());
    }

    #[test]
    fn test_nested_children_see_only_parent_match() {
        // The child would match the whole remainder, but only the parent's
        // match is offered to it.
        let parent = PrefixClassifier::new("ab/", Label::new(LabelFields::new("Pair", true, 0)));
        let child = RegexClassifier::from_pattern(
            "^abcd",
            Label::new(LabelFields::new("Quad", true, 0)),
        )
        .unwrap();
        let nested = NestedClassifier::new(Box::new(parent), vec![Box::new(child)]);
        let (label, _) = nested.check("ab/cd").unwrap();
        assert_eq!(label.fields.value, "Pair");
    }

    #[test]
    fn test_prefix_classifier() {
        let special = PrefixClassifier::new(
            "foo/",
            Label::new(LabelFields::new("SpecialToken", true, 0)),
        );
        let (label, matched) = special.check("foo/bar").unwrap();
        assert_eq!(label.fields.value, "SpecialToken");
        assert_eq!(matched, "foo/");
        assert!(special.check("bar/foo").is_none());
    }

    #[test]
    fn test_default_chain_labels() {
        let chain = default_classifiers();
        let value = |s: &str| first_match(&chain, s).map(|(l, _)| l.fields.value);

        assert_eq!(value("2013/11/20/x").as_deref(), Some("YYYY/MM/DD"));
        assert_eq!(value("2013/x").as_deref(), Some("YYYY"));
        assert_eq!(value("123456").as_deref(), Some("Number"));
        assert_eq!(
            value("spill-marlin-elaborate").as_deref(),
            Some("Words")
        );
        assert_eq!(value("snake_case_slug").as_deref(), Some("Words"));
        assert_eq!(value("PMFKQYGHBQWKZYB").as_deref(), Some("Words"));
        assert_eq!(value("index.html").as_deref(), Some("AlphaNumeric"));
        assert_eq!(value("%E2%9C%93"), None);
    }

    #[test]
    fn test_default_chain_out_of_range_year_is_number() {
        let chain = default_classifiers();
        let (label, _) = first_match(&chain, "1234/").unwrap();
        assert_eq!(label.fields.value, "Number");
    }

    #[test]
    fn test_default_chain_respects_limits() {
        let chain = DefaultChain {
            words_cardinality_limit: 7,
            ..DefaultChain::default()
        }
        .build();
        let (label, _) = first_match(&chain, "some-slug").unwrap();
        assert_eq!(label.fields.cardinality_limit, 7);
    }

    #[test]
    fn test_boxed_and_shared_classifiers() {
        let boxed: Box<dyn PathTokenClassifier> = Box::new(number_classifier());
        assert!(boxed.check("7").is_some());

        let shared: Arc<dyn PathTokenClassifier> = Arc::new(number_classifier());
        assert!(shared.check("7").is_some());
    }
}
