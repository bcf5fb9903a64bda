use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::{Arc, LazyLock},
};

use regex::Regex;

use crate::{
    PatternError,
    compiler::{CaseSensitivity, Component, Placeholders, compile_component, compile_path_regex},
    parser::{RawPattern, parse_pattern},
    paths::{is_rooted, join, normalize_path},
};

/// Text of the pattern matching every entry
const ANYTHING_TEXT: &str = "**/*.*";

static ANYTHING: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new(ANYTHING_TEXT).expect("the 'anything' pattern must always compile")
});

/// Options for pattern matching
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternOpts {
    /// Ignore case sensitivity during matching
    ///
    /// This makes `a` match both lowercase `a` and uppercase `A`
    ///
    /// Disabled by default
    pub case_insensitive: bool,
}

impl PatternOpts {
    pub(crate) fn case_sensitivity(self) -> CaseSensitivity {
        if self.case_insensitive {
            CaseSensitivity::Insensitive
        } else {
            CaseSensitivity::Sensitive
        }
    }
}

/// A pattern that can be matched against `/`-separated paths
///
/// # Syntax
///
/// * Normal characters match themselves
/// * `*` matches one or more characters inside a path segment
/// * `**` as a whole segment matches zero or more segments, e.g. `**/*.txt` matches `a.txt`, `dir/a.txt` and so on
/// * `[abc]` matches any of `a`, `b` or `c` (no ranges, no negation)
/// * A last segment ending with `.*` also matches its bare stem, e.g. `a.*` matches `a`, `a.txt` and `a.tar.gz`
/// * `.` and empty segments are ignored
/// * A leading `/` makes the pattern *rooted*: it only matches from the root directory
/// * `;` separates several patterns, a path matching any of them matches the whole
///
/// Relative patterns match any path ending with the pattern, starting at a segment boundary:
/// `b/*.txt` matches `/a/b/c.txt`. There is no escaping and no single-character wildcard.
///
/// # Identity
///
/// A pattern is a cheap handle over immutable compiled data. Clones share that data, which
/// [`Pattern::ptr_eq`] observes, while `==` compares the normalized text and options.
#[derive(Debug, Clone)]
pub struct Pattern {
    inner: Arc<PatternInner>,
}

#[derive(Debug)]
struct PatternInner {
    /// Normalized text, sub-patterns joined by `;`
    text: String,

    /// The patterns making up this one, never empty
    sub_patterns: Vec<SubPattern>,

    /// Does this pattern absorb any combination it takes part in?
    anything: bool,
}

/// A single, `;`-free, compiled pattern
#[derive(Debug, Clone)]
pub(crate) struct SubPattern {
    /// Normalized text
    pub text: String,

    /// Does the pattern start from the root directory?
    pub rooted: bool,

    /// The components the walker resolves one after the other
    pub components: Vec<Component>,

    /// Matcher for full paths
    regex: Regex,

    opts: PatternOpts,
}

impl SubPattern {
    fn compile(input: &str, opts: PatternOpts) -> Result<Self, PatternError> {
        Self::from_raw(input, &Self::parse(input)?, opts)
    }

    /// Parse a single sub-pattern, rejecting template placeholders
    fn parse(input: &str) -> Result<RawPattern, PatternError> {
        let raw = parse_pattern(input)?;

        if let Some(name) = raw.placeholders().first() {
            return Err(PatternError::malformed(
                input,
                format!("placeholder '{{{name}}}' is only supported in templates"),
            ));
        }

        Ok(raw)
    }

    fn from_raw(
        input: &str,
        raw: &RawPattern,
        opts: PatternOpts,
    ) -> Result<Self, PatternError> {
        let case_sensitivity = opts.case_sensitivity();
        let to_malformed = |err: regex::Error| PatternError::malformed(input, err.to_string());

        let components = raw
            .components
            .iter()
            .enumerate()
            .map(|(i, component)| {
                compile_component(component, i + 1 == raw.components.len(), case_sensitivity)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(to_malformed)?;

        let regex = Regex::new(&compile_path_regex(
            raw,
            case_sensitivity,
            Placeholders::Wildcard,
        ))
        .map_err(to_malformed)?;

        Ok(Self {
            text: raw.to_glob(),
            rooted: raw.rooted,
            components,
            regex,
            opts,
        })
    }

    /// Match against a normalized path
    pub(crate) fn is_match(&self, path: &str) -> bool {
        if self.rooted || is_rooted(path) {
            self.regex.is_match(path)
        } else {
            self.regex.is_match(&format!("/{path}"))
        }
    }

    fn same_as(&self, other: &SubPattern) -> bool {
        self.text == other.text && self.opts == other.opts
    }
}

impl Pattern {
    /// Parse a pattern with the default options
    pub fn new(input: &str) -> Result<Self, PatternError> {
        Self::new_with_opts(input, PatternOpts::default())
    }

    /// Parse a pattern
    pub fn new_with_opts(input: &str, opts: PatternOpts) -> Result<Self, PatternError> {
        let mut sub_patterns = vec![];

        for text in input.split(';').filter(|text| !text.is_empty()) {
            push_distinct(&mut sub_patterns, SubPattern::compile(text, opts)?);
        }

        if sub_patterns.is_empty() {
            return Err(PatternError::malformed(input, "pattern is empty"));
        }

        Ok(Self::from_sub_patterns(sub_patterns))
    }

    /// Get the normalized text [`Pattern::new`] would give, without compiling anything
    pub(crate) fn canonical_text(input: &str) -> Result<String, PatternError> {
        let mut texts: Vec<String> = vec![];

        for text in input.split(';').filter(|text| !text.is_empty()) {
            let text = SubPattern::parse(text)?.to_glob();

            if !texts.contains(&text) {
                texts.push(text);
            }
        }

        if texts.is_empty() {
            return Err(PatternError::malformed(input, "pattern is empty"));
        }

        Ok(texts.join(";"))
    }

    /// The pattern matching every entry, equivalent to `**/*.*`
    ///
    /// Always returns the same shared handle.
    pub fn anything() -> Self {
        ANYTHING.clone()
    }

    /// Build the union of several patterns
    ///
    /// * [`None`] values are ignored
    /// * If a pattern matching anything is provided, it is returned as is
    /// * If a single distinct pattern is provided, it is returned as is
    /// * Otherwise a new pattern is built from all distinct sub-patterns, in order
    ///
    /// Fails if no pattern is provided at all.
    pub fn combine<'a, I, P>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Option<&'a Pattern>>,
    {
        let mut distinct: Vec<&'a Pattern> = vec![];

        for pattern in patterns {
            let pattern: Option<&'a Pattern> = pattern.into();

            let Some(pattern) = pattern else {
                continue;
            };

            if pattern.is_anything() {
                return Ok(pattern.clone());
            }

            if !distinct
                .iter()
                .any(|other| Self::ptr_eq(other, pattern) || *other == pattern)
            {
                distinct.push(pattern);
            }
        }

        match distinct.as_slice() {
            [] => Err(PatternError::EmptyCombination),
            [single] => Ok((*single).clone()),
            _ => {
                let mut sub_patterns = vec![];

                for pattern in &distinct {
                    for sub_pattern in &pattern.inner.sub_patterns {
                        push_distinct(&mut sub_patterns, sub_pattern.clone());
                    }
                }

                Ok(Self::from_sub_patterns(sub_patterns))
            }
        }
    }

    /// Prefix all relative sub-patterns with a base path
    ///
    /// If the pattern is rooted, it is returned as is. Rooted sub-patterns of a partially rooted
    /// pattern are kept unchanged.
    ///
    /// `concat("a", "*.cs;*.vb")` gives `a/*.cs;a/*.vb`.
    pub fn concat(base: &str, pattern: &Pattern) -> Result<Self, PatternError> {
        if pattern.is_rooted() {
            return Ok(pattern.clone());
        }

        let base = normalize_path(base);
        let mut sub_patterns = vec![];

        for sub_pattern in &pattern.inner.sub_patterns {
            let sub_pattern = if sub_pattern.rooted {
                sub_pattern.clone()
            } else {
                SubPattern::compile(&join(&base, &sub_pattern.text), sub_pattern.opts)?
            };

            push_distinct(&mut sub_patterns, sub_pattern);
        }

        Ok(Self::from_sub_patterns(sub_patterns))
    }

    fn from_sub_patterns(sub_patterns: Vec<SubPattern>) -> Self {
        let text = sub_patterns
            .iter()
            .map(|sub_pattern| sub_pattern.text.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let anything = matches!(
            sub_patterns.as_slice(),
            [single] if single.text == ANYTHING_TEXT && single.opts == PatternOpts::default()
        );

        Self {
            inner: Arc::new(PatternInner {
                text,
                sub_patterns,
                anything,
            }),
        }
    }

    /// Check if two handles point to the very same pattern
    pub fn ptr_eq(a: &Pattern, b: &Pattern) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Get the normalized text of the pattern
    pub fn as_str(&self) -> &str {
        &self.inner.text
    }

    /// Iterate over the normalized text of each sub-pattern
    pub fn sub_patterns(&self) -> impl Iterator<Item = &str> {
        self.inner
            .sub_patterns
            .iter()
            .map(|sub_pattern| sub_pattern.text.as_str())
    }

    pub(crate) fn compiled(&self) -> &[SubPattern] {
        &self.inner.sub_patterns
    }

    /// Check if the pattern matches anything (see [`Pattern::anything`])
    pub fn is_anything(&self) -> bool {
        self.inner.anything
    }

    /// Check if all sub-patterns are rooted (only match from the root directory)
    pub fn is_rooted(&self) -> bool {
        self.inner
            .sub_patterns
            .iter()
            .all(|sub_pattern| sub_pattern.rooted)
    }

    /// Get the regular expression used to match full paths
    ///
    /// Multiple sub-patterns are joined as an alternation.
    pub fn to_regex(&self) -> String {
        match self.inner.sub_patterns.as_slice() {
            [single] => single.regex.as_str().to_owned(),
            sub_patterns => sub_patterns
                .iter()
                .map(|sub_pattern| format!("(?:{})", sub_pattern.regex.as_str()))
                .collect::<Vec<_>>()
                .join("|"),
        }
    }

    /// Match the pattern against a path
    ///
    /// The path is normalized first. Relative paths never match rooted patterns.
    pub fn is_match(&self, path: &str) -> bool {
        let path = normalize_path(path);

        self.inner
            .sub_patterns
            .iter()
            .any(|sub_pattern| sub_pattern.is_match(&path))
    }
}

fn push_distinct(sub_patterns: &mut Vec<SubPattern>, sub_pattern: SubPattern) {
    if !sub_patterns.iter().any(|other| other.same_as(&sub_pattern)) {
        sub_patterns.push(sub_pattern);
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
            || (self.inner.sub_patterns.len() == other.inner.sub_patterns.len()
                && self
                    .inner
                    .sub_patterns
                    .iter()
                    .zip(&other.inner.sub_patterns)
                    .all(|(a, b)| a.same_as(b)))
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for sub_pattern in &self.inner.sub_patterns {
            sub_pattern.text.hash(state);
            sub_pattern.opts.hash(state);
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.text)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
