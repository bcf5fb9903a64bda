use std::{collections::HashSet, sync::LazyLock};

use parsy::{Parser, char, choice, end, filter, just, not, silent_choice};

use crate::PatternError;

/// Parse a single (non-`;`-separated) glob string into a [`RawPattern`]
pub static PATTERN_PARSER: LazyLock<Box<dyn Parser<RawPattern> + Send + Sync>> =
    LazyLock::new(|| {
        let normal_char = filter(|c| !SPECIAL_CHARS.contains(&c));

        let chars_matcher = choice::<CharsMatcher, _>((
            //
            // Literal characters
            //
            normal_char
                .repeated_into_container::<String>()
                .at_least(1)
                .map(CharsMatcher::Literal),
            //
            // Wildcard
            //
            char('*')
                .followed_by(not(char('*')).critical(
                    "Wildcard components '**' must be preceded by and followed by a path separator",
                ))
                .map(|_| CharsMatcher::AnyChars),
            //
            // Character alternates
            //
            char('[')
                .ignore_then(
                    filter(|c| !SPECIAL_CHARS.contains(&c))
                        .repeated_into_vec()
                        .at_least(1)
                        .critical("expected at least one character to match"),
                )
                .then_ignore(char(']').critical_auto_msg())
                .map(CharsMatcher::OneOfChars),
            //
            // Named placeholders (templates only)
            //
            char('{')
                .ignore_then(
                    filter(|c| c.is_ascii_alphanumeric() || c == '_')
                        .repeated_into_container::<String>()
                        .at_least(1)
                        .critical("expected a placeholder name made of letters, digits or '_'"),
                )
                .then_ignore(char('}').critical_auto_msg())
                .map(CharsMatcher::Placeholder),
        ));

        let dir_sep = silent_choice((char('/'), char('\\')));

        let component = choice::<RawComponent, _>((
            //
            // Wildcard
            //
            just("**")
                .followed_by(silent_choice((dir_sep, end())).critical(
                    "Wildcard components '**' must be preceded and followed by path separators",
                ))
                .map(|_| RawComponent::Wildcard),
            //
            // Character matchers
            //
            chars_matcher
                .repeated_into_vec()
                .map(|matchers| match matchers.as_slice() {
                    [] => RawComponent::Literal(String::new()),
                    [CharsMatcher::Literal(lit)] => RawComponent::Literal(lit.to_owned()),
                    _ => RawComponent::Suite(matchers),
                }),
        ));

        let pattern = dir_sep
            .or_not()
            .then(component.separated_by_into_vec(dir_sep))
            .validate_or_dynamic_critical(|(_, components)| {
                for component in components {
                    if matches!(component, RawComponent::Literal(lit) if lit == "..") {
                        return Err("Cannot use '..' components in patterns".into());
                    }
                }

                Ok(())
            })
            .map(|(root, components)| RawPattern {
                rooted: root.is_some(),
                components: normalize_components(components),
            });

        Box::new(pattern.full())
    });

/// List of characters that are never matched literally
static SPECIAL_CHARS: LazyLock<HashSet<char>> =
    LazyLock::new(|| HashSet::from(['[', ']', '{', '}', '*', '/', '\\', ';']));

/// Parse a single glob string
///
/// Fails if the string is not valid, or if nothing is left once `.` and empty segments are removed.
pub fn parse_pattern(input: &str) -> Result<RawPattern, PatternError> {
    let raw = PATTERN_PARSER
        .parse_str(input)
        .map(|parsed| parsed.data)
        .map_err(|err| PatternError::malformed(input, format!("{err:?}")))?;

    if raw.components.is_empty() {
        return Err(PatternError::malformed(input, "pattern has no path segment"));
    }

    Ok(raw)
}

/// Remove empty and `.` components, and collapse consecutive `**` components
fn normalize_components(components: Vec<RawComponent>) -> Vec<RawComponent> {
    let mut normalized: Vec<RawComponent> = Vec::with_capacity(components.len());

    for component in components {
        match &component {
            RawComponent::Literal(lit) if lit.is_empty() || lit == "." => continue,
            RawComponent::Wildcard if matches!(normalized.last(), Some(RawComponent::Wildcard)) => {
                continue;
            }
            _ => normalized.push(component),
        }
    }

    normalized
}

/// A parsed raw pattern
///
/// This is intended to be compiled using the [`crate::compiler`] module.
#[derive(Debug)]
pub struct RawPattern {
    /// Does the pattern start from the root directory?
    pub rooted: bool,

    /// Path components, without any `.` or empty one
    pub components: Vec<RawComponent>,
}

impl RawPattern {
    /// List the names of all placeholders, in order of appearance
    pub fn placeholders(&self) -> Vec<&str> {
        self.components
            .iter()
            .filter_map(|component| match component {
                RawComponent::Suite(matchers) => Some(matchers),
                RawComponent::Literal(_) | RawComponent::Wildcard => None,
            })
            .flatten()
            .filter_map(|matcher| match matcher {
                CharsMatcher::Placeholder(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Write the pattern back as a normalized glob string
    ///
    /// Placeholders are written as `*` wildcards, which makes the output the plain glob
    /// a template enumerates with.
    pub fn to_glob(&self) -> String {
        let mut out = String::new();

        if self.rooted {
            out.push('/');
        }

        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }

            match component {
                RawComponent::Literal(lit) => out.push_str(lit),
                RawComponent::Wildcard => out.push_str("**"),
                RawComponent::Suite(matchers) => {
                    for matcher in matchers {
                        match matcher {
                            CharsMatcher::Literal(lit) => out.push_str(lit),
                            CharsMatcher::AnyChars | CharsMatcher::Placeholder(_) => {
                                // A single wildcard covers adjacent ones
                                if !out.ends_with('*') {
                                    out.push('*');
                                }
                            }
                            CharsMatcher::OneOfChars(chars) => {
                                out.push('[');
                                out.extend(chars);
                                out.push(']');
                            }
                        }
                    }
                }
            }
        }

        out
    }
}

#[derive(Debug)]
pub enum RawComponent {
    /// The component matches a literal string
    Literal(String),

    /// The component matches using a suite of matchers
    Suite(Vec<CharsMatcher>),

    /// The component matches any suite of directories
    Wildcard,
}

#[derive(Debug)]
pub enum CharsMatcher {
    /// Match one or more characters
    AnyChars,

    /// Match a specific suite of characters
    Literal(String),

    /// Match a single character among the listed ones
    OneOfChars(Vec<char>),

    /// Capture one or more characters under a name
    Placeholder(String),
}
