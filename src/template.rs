use std::{borrow::Cow, fmt, io, str::FromStr};

use regex::Regex;

use crate::{
    Controller, Pattern, PatternError, PatternOpts, Walker,
    compiler::{Placeholders, compile_path_regex},
    parser::parse_pattern,
    paths::{is_rooted, normalize_path},
};

/// A pattern with named placeholders, capturing parts of the paths it matches
///
/// Templates use the same syntax as [`Pattern`], plus `{name}` placeholders that behave like `*`
/// and capture what they matched. Names are made of ASCII letters, digits and `_`, cannot start
/// with a digit, and must be unique inside a template. Templates cannot contain `;`.
///
/// ```
/// use globtree::Template;
///
/// let template = Template::new("{name}/{file}.cs").unwrap();
/// let matched = template.match_path("Properties/AssemblyInfo.cs").unwrap();
///
/// assert_eq!(matched.get("name"), Some("Properties"));
/// assert_eq!(matched.get("file"), Some("AssemblyInfo"));
/// assert_eq!(matched.to_string(), "Properties/AssemblyInfo.cs");
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    /// Source text
    text: String,

    /// Matcher with one named group per placeholder
    regex: Regex,

    /// Placeholder names, in order of appearance
    names: Vec<String>,

    rooted: bool,

    /// Plain glob used to enumerate candidates
    glob: Pattern,
}

impl Template {
    /// Parse a template with the default options
    pub fn new(input: &str) -> Result<Self, PatternError> {
        Self::new_with_opts(input, PatternOpts::default())
    }

    /// Parse a template
    pub fn new_with_opts(input: &str, opts: PatternOpts) -> Result<Self, PatternError> {
        let raw = parse_pattern(input)?;

        let mut names: Vec<String> = vec![];

        for name in raw.placeholders() {
            if name.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(PatternError::malformed(
                    input,
                    format!("placeholder name '{{{name}}}' cannot start with a digit"),
                ));
            }

            if names.iter().any(|other| other == name) {
                return Err(PatternError::malformed(
                    input,
                    format!("placeholder '{{{name}}}' is used more than once"),
                ));
            }

            names.push(name.to_owned());
        }

        let regex = Regex::new(&compile_path_regex(
            &raw,
            opts.case_sensitivity(),
            Placeholders::Capture,
        ))
        .map_err(|err| PatternError::malformed(input, err.to_string()))?;

        let glob = Pattern::new_with_opts(&raw.to_glob(), opts)?;

        Ok(Self {
            text: input.to_owned(),
            regex,
            names,
            rooted: raw.rooted,
            glob,
        })
    }

    /// Get the source text of the template
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Get the placeholder names, in order of appearance
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Get the plain glob the template enumerates with
    ///
    /// Each placeholder is replaced by a `*` wildcard.
    pub fn glob(&self) -> &Pattern {
        &self.glob
    }

    /// Match the template against a path, capturing the placeholders' values
    ///
    /// The path is normalized first. Relative paths never match rooted templates.
    pub fn match_path(&self, path: &str) -> Option<TemplateMatch> {
        let path = normalize_path(path);

        let values = {
            let subject = if self.rooted || is_rooted(&path) {
                Cow::Borrowed(path.as_str())
            } else {
                Cow::Owned(format!("/{path}"))
            };

            let captures = self.regex.captures(&subject)?;

            self.names
                .iter()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|value| (name.clone(), value.as_str().to_owned()))
                })
                .collect()
        };

        Some(TemplateMatch { path, values })
    }

    /// Enumerate the matches from the controller's working directory
    pub fn enumerate<C: Controller>(&self, controller: C) -> TemplateMatches<C> {
        self.enumerate_from("", controller)
    }

    /// Enumerate the matches from a starting directory
    ///
    /// See [`Walker::new`] for how the starting directory is resolved.
    pub fn enumerate_from<C: Controller>(
        &self,
        start_dir: &str,
        controller: C,
    ) -> TemplateMatches<C> {
        TemplateMatches {
            template: self.clone(),
            walker: Walker::new(self.glob.clone(), start_dir, controller),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Template {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A path matched by a [`Template`], with the values of its placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    path: String,
    values: Vec<(String, String)>,
}

impl TemplateMatch {
    /// Get the matched path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the value captured by a placeholder
    ///
    /// Returns [`None`] if the template has no placeholder with this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(other, _)| other == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over the captured `(name, value)` pairs, in placeholder order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Display for TemplateMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Iterator over the matches of a [`Template`]
///
/// Walks the template's plain glob and captures the placeholders of each yielded path.
/// Controller errors are forwarded unchanged.
pub struct TemplateMatches<C> {
    template: Template,
    walker: Walker<C>,
}

impl<C: Controller> Iterator for TemplateMatches<C> {
    type Item = Result<TemplateMatch, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = match self.walker.next()? {
                Ok(path) => path,
                Err(err) => return Some(Err(err)),
            };

            match self.template.match_path(&path) {
                Some(matched) => return Some(Ok(matched)),
                None => {
                    tracing::trace!(
                        path = %path,
                        template = %self.template,
                        "dropping path not matched by the template"
                    );
                }
            }
        }
    }
}
