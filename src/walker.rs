use std::{
    collections::{HashSet, VecDeque},
    io,
};

use crate::{
    Controller, Pattern,
    compiler::Component,
    paths::{file_name, is_rooted, join, normalize_path},
    pattern::SubPattern,
};

/// Create a walker yielding every entry the pattern selects from a starting directory
///
/// Strictly equivalent to [`Walker::new`] with a clone of the pattern.
pub fn filter_directory<C: Controller>(
    pattern: &Pattern,
    start_dir: &str,
    controller: C,
) -> Walker<C> {
    Walker::new(pattern.clone(), start_dir, controller)
}

/// Walker implementation, yielding entries that match the provided pattern
///
/// Relative sub-patterns are resolved from the starting directory, rooted ones from the controller's
/// root directory, whatever the starting directory is.
///
/// Yielded results may be [`Err`] variants when the controller fails to list a directory. The walk
/// goes on with the remaining directories if more items are requested.
///
/// For more informations on how pattern matching works, see [`Pattern`].
///
/// # Traversal rules
///
/// - Literal segments are resolved with existence checks, their parent directory is never listed
/// - Wildcard segments list directories, and only descend into the ones with a matching name
/// - `**` segments descend into every directory
/// - Every yielded path is accepted by the pattern's regular expression
/// - A path is yielded at most once, even if several sub-patterns select it
/// - Sub-patterns are walked in order, directories in the order the controller lists them
pub struct Walker<C> {
    /// The pattern to apply to all entries
    pattern: Pattern,

    /// Directory relative sub-patterns start from
    start_dir: String,

    controller: C,

    /// Index of the next sub-pattern to walk
    next_sub_pattern: usize,

    /// Walk of the current sub-pattern
    scan: Option<Scan>,

    /// Paths that were already yielded
    yielded: HashSet<String>,
}

/// (Internal) State of the walk for a single sub-pattern
struct Scan {
    /// Index of the walked sub-pattern
    sub_pattern: usize,

    /// Directories to expand, with the index of the component to match inside them
    pending: Vec<(String, usize)>,

    /// Entries waiting for the final check
    candidates: VecDeque<String>,

    /// Directories that were already expanded, with the component index
    expanded: HashSet<(String, usize)>,
}

impl<C: Controller> Walker<C> {
    /// Create a walker that will yield entries matching the provided pattern
    ///
    /// An empty or `.` starting directory means the controller's working directory. A relative one
    /// is resolved from it.
    pub fn new(pattern: Pattern, start_dir: &str, controller: C) -> Self {
        let start_dir = normalize_path(start_dir);
        let working_dir = normalize_path(controller.working_directory());

        let start_dir = if start_dir.is_empty() {
            working_dir
        } else if is_rooted(&start_dir) {
            start_dir
        } else {
            join(&working_dir, &start_dir)
        };

        Self {
            pattern,
            start_dir,
            controller,
            next_sub_pattern: 0,
            scan: None,
            yielded: HashSet::new(),
        }
    }

    /// Get the pattern the walker applies
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Get the directory relative sub-patterns are walked from
    pub fn start_dir(&self) -> &str {
        &self.start_dir
    }
}

impl<C: Controller> Iterator for Walker<C> {
    type Item = Result<String, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(scan) = self.scan.as_mut() else {
                // Move on to the next sub-pattern, if any
                let sub_pattern = self.pattern.compiled().get(self.next_sub_pattern)?;

                let base_dir = if sub_pattern.rooted {
                    normalize_path(self.controller.root_directory())
                } else {
                    self.start_dir.clone()
                };

                tracing::debug!(
                    pattern = %sub_pattern.text,
                    base_dir = %base_dir,
                    "walking directory tree"
                );

                self.scan = Some(Scan::new(self.next_sub_pattern, base_dir));
                self.next_sub_pattern += 1;
                continue;
            };

            let sub_pattern = &self.pattern.compiled()[scan.sub_pattern];

            // Yield pending candidates before going any deeper
            if let Some(candidate) = scan.candidates.pop_front() {
                if sub_pattern.is_match(&candidate) && self.yielded.insert(candidate.clone()) {
                    return Some(Ok(candidate));
                }

                continue;
            }

            let Some((dir, index)) = scan.pending.pop() else {
                self.scan = None;
                continue;
            };

            if let Err(err) = scan.expand(sub_pattern, &self.controller, dir, index) {
                return Some(Err(err));
            }
        }
    }
}

impl Scan {
    fn new(sub_pattern: usize, base_dir: String) -> Self {
        Self {
            sub_pattern,
            pending: vec![(base_dir, 0)],
            candidates: VecDeque::new(),
            expanded: HashSet::new(),
        }
    }

    /// Match the component at `index` inside `dir`
    ///
    /// Matching entries either become candidates (last component) or directories to expand.
    fn expand(
        &mut self,
        sub_pattern: &SubPattern,
        controller: &impl Controller,
        dir: String,
        index: usize,
    ) -> io::Result<()> {
        if !self.expanded.insert((dir.clone(), index)) {
            return Ok(());
        }

        let is_last = index + 1 == sub_pattern.components.len();

        match &sub_pattern.components[index] {
            Component::Literal(name) => {
                let path = join(&dir, name);

                if is_last {
                    if controller.file_exists(&path) || controller.directory_exists(&path) {
                        self.candidates.push_back(path);
                    }
                } else if controller.directory_exists(&path) {
                    tracing::trace!(path = %path, "resolved literal directory");
                    self.pending.push((path, index + 1));
                }
            }

            Component::Regex(regex) => {
                tracing::trace!(dir = %dir, "listing directory");

                if is_last {
                    self.candidates.extend(
                        controller
                            .enumerate_entries(&dir)?
                            .into_iter()
                            .filter(|entry| regex.is_match(file_name(entry))),
                    );
                } else {
                    // Reversed so the first listed directory is expanded first
                    self.pending.extend(
                        controller
                            .enumerate_directories(&dir)?
                            .into_iter()
                            .rev()
                            .filter(|subdir| regex.is_match(file_name(subdir)))
                            .map(|subdir| (subdir, index + 1)),
                    );
                }
            }

            Component::Wildcard => {
                tracing::trace!(dir = %dir, "listing directory");

                if is_last {
                    self.candidates.extend(controller.enumerate_entries(&dir)?);
                }

                self.pending.extend(
                    controller
                        .enumerate_directories(&dir)?
                        .into_iter()
                        .rev()
                        .map(|subdir| (subdir, index)),
                );

                // Zero directory level, expanded first
                if !is_last {
                    self.pending.push((dir, index + 1));
                }
            }
        }

        Ok(())
    }
}
