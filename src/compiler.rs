use regex::Regex;

use crate::parser::{CharsMatcher, RawComponent, RawPattern};

/// One or more characters of a single path segment, as few as possible
const ANY_CHARS: &str = r"[^/\:]+?";

/// Zero or more whole path segments, each followed by a separator
const ANY_DIRS: &str = r"([^/\:]+/)*";

/// A single non-empty path segment
const ONE_SEGMENT: &str = r"[^/\:]+";

/// Optional dotted suffix used by trailing `.*` segments
const OPTIONAL_SUFFIX: &str = r"(\.[^/\:]*)?";

#[derive(Debug, Clone)]
pub enum Component {
    Regex(Regex),
    Literal(String),
    Wildcard,
}

/// Determine if the built regular expressions should use case sensitivity or not
#[derive(Debug, Clone, Copy)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

/// Determine how placeholders are compiled
#[derive(Debug, Clone, Copy)]
pub enum Placeholders {
    /// Placeholders become named capture groups
    Capture,

    /// Placeholders behave like `*`
    Wildcard,
}

/// Compile a parsed component to the form the walker uses
///
/// Wildcard and (case-sensitive) literal components remain the same, as the walker resolves them
/// without listing directories, while matchers combinations are compiled into regular expressions
/// that are applied to a single entry name.
pub fn compile_component(
    component: &RawComponent,
    is_last: bool,
    case_sensitivity: CaseSensitivity,
) -> Result<Component, regex::Error> {
    match component {
        RawComponent::Wildcard => Ok(Component::Wildcard),

        RawComponent::Literal(lit) => match case_sensitivity {
            CaseSensitivity::Insensitive => Regex::new(&format!("(?i)^{}$", regex::escape(lit)))
                .map(Component::Regex),
            CaseSensitivity::Sensitive => Ok(Component::Literal(lit.clone())),
        },

        RawComponent::Suite(chars_matchers) => {
            let mut regex = match case_sensitivity {
                CaseSensitivity::Sensitive => String::new(),
                CaseSensitivity::Insensitive => String::from("(?i)"),
            };

            regex.push('^');
            compile_suite(chars_matchers, is_last, Placeholders::Wildcard, &mut regex);
            regex.push('$');

            Regex::new(&regex).map(Component::Regex)
        }
    }
}

/// Build the regular expression matching full paths for a parsed pattern
///
/// * Rooted patterns are anchored at both ends, relative ones only at the end
/// * Every segment is preceded by a separator, so relative patterns only match from a segment boundary
/// * `**` absorbs the separator that follows it, and is not preceded by one when it starts a relative pattern
pub fn compile_path_regex(
    pattern: &RawPattern,
    case_sensitivity: CaseSensitivity,
    placeholders: Placeholders,
) -> String {
    let RawPattern { rooted, components } = pattern;

    let mut out = match case_sensitivity {
        CaseSensitivity::Sensitive => String::new(),
        CaseSensitivity::Insensitive => String::from("(?i)"),
    };

    if *rooted {
        out.push('^');
    }

    let mut needs_separator = true;

    for (i, component) in components.iter().enumerate() {
        let is_last = i + 1 == components.len();

        match component {
            RawComponent::Wildcard => {
                let opens_relative_pattern = i == 0 && !rooted;

                if needs_separator && !opens_relative_pattern {
                    out.push('/');
                }

                out.push_str(ANY_DIRS);

                if is_last {
                    out.push_str(ONE_SEGMENT);
                }

                needs_separator = opens_relative_pattern;
            }

            RawComponent::Literal(lit) => {
                if needs_separator {
                    out.push('/');
                }

                out.push_str(&regex::escape(lit));
                needs_separator = true;
            }

            RawComponent::Suite(chars_matchers) => {
                if needs_separator {
                    out.push('/');
                }

                compile_suite(chars_matchers, is_last, placeholders, &mut out);
                needs_separator = true;
            }
        }
    }

    out.push('$');
    out
}

/// Compile the matchers of a single segment
///
/// The resulting expression is appended to the provided mutable string reference
fn compile_suite(
    chars_matchers: &[CharsMatcher],
    is_last: bool,
    placeholders: Placeholders,
    out: &mut String,
) {
    // A last segment ending with `.*` also matches its bare stem
    if is_last
        && let [rest @ .., CharsMatcher::Literal(lit), CharsMatcher::AnyChars] = chars_matchers
        && let Some(stem) = lit.strip_suffix('.')
    {
        for matcher in rest {
            compile_chars_matcher(matcher, placeholders, out);
        }

        out.push_str(&regex::escape(stem));
        out.push_str(OPTIONAL_SUFFIX);
        return;
    }

    for matcher in chars_matchers {
        compile_chars_matcher(matcher, placeholders, out);
    }
}

/// Compile a [`CharsMatcher`] to a regular expression
///
/// The resulting expression is appended to the provided mutable string reference
fn compile_chars_matcher(chars_matcher: &CharsMatcher, placeholders: Placeholders, out: &mut String) {
    match chars_matcher {
        CharsMatcher::AnyChars => out.push_str(ANY_CHARS),
        CharsMatcher::Literal(lit) => out.push_str(&regex::escape(lit)),
        CharsMatcher::OneOfChars(chars) => {
            out.push('(');

            for (i, c) in chars.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }

                out.push_str(&regex::escape(&c.to_string()));
            }

            out.push(')');
        }
        CharsMatcher::Placeholder(name) => match placeholders {
            Placeholders::Capture => {
                out.push_str("(?<");
                out.push_str(name);
                out.push('>');
                out.push_str(ANY_CHARS);
                out.push(')');
            }
            Placeholders::Wildcard => out.push_str(ANY_CHARS),
        },
    }
}
