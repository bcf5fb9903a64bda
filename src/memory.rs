use std::{
    collections::{HashMap, HashSet},
    io,
    sync::{Mutex, PoisonError},
};

use crate::{
    Controller,
    paths::{SEPARATOR, is_rooted, join, normalize_path},
};

/// In-memory controller over a synthetic directory tree
///
/// Entries are listed in insertion order. Every listing is recorded, which allows observing
/// which directories a walker had to enumerate.
///
/// ```
/// use globtree::{MemoryController, Pattern, filter_directory};
///
/// let controller = MemoryController::from_paths(["/a/b.txt", "/a/c.csv", "/a/e/"]);
/// let pattern = Pattern::new("**/*.csv").unwrap();
///
/// let found = filter_directory(&pattern, "/", &controller)
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
///
/// assert_eq!(found, ["/a/c.csv"]);
/// ```
#[derive(Debug)]
pub struct MemoryController {
    root_dir: String,
    working_dir: String,

    /// Children of each directory, in insertion order
    children: HashMap<String, Vec<String>>,

    files: HashSet<String>,

    /// Directories whose listing fails
    unreadable: HashSet<String>,

    listed: Mutex<Vec<String>>,
}

impl MemoryController {
    /// Create a tree only containing the root directory, which is also the working directory
    pub fn new() -> Self {
        let root_dir = String::from(SEPARATOR);

        Self {
            children: HashMap::from([(root_dir.clone(), vec![])]),
            working_dir: root_dir.clone(),
            root_dir,
            files: HashSet::new(),
            unreadable: HashSet::new(),
            listed: Mutex::new(vec![]),
        }
    }

    /// Create a tree from a list of paths
    ///
    /// Paths ending with a separator are directories, others are files.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut controller = Self::new();

        for path in paths {
            let path = path.as_ref();

            if path.ends_with(SEPARATOR) {
                controller.add_dir(path);
            } else {
                controller.add_file(path);
            }
        }

        controller
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.add_file(path);
        self
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        self.add_dir(path);
        self
    }

    /// Set the working directory, creating it if needed
    pub fn with_working_directory(mut self, path: &str) -> Self {
        let path = self.resolve(path);
        self.add_dir(&path);
        self.working_dir = path;
        self
    }

    /// Make listing a directory fail with a permission error
    pub fn with_unreadable(mut self, path: &str) -> Self {
        let path = self.resolve(path);
        self.unreadable.insert(path);
        self
    }

    /// Add a file, creating its parent directories if needed
    ///
    /// Adding a path that already exists does nothing.
    pub fn add_file(&mut self, path: &str) {
        let path = self.resolve(path);

        if self.files.contains(&path) || self.children.contains_key(&path) {
            return;
        }

        if let Some(parent) = parent_of(&path) {
            self.add_dir(&parent);
            self.children.entry(parent).or_default().push(path.clone());
        }

        self.files.insert(path);
    }

    /// Add a directory, creating its parent directories if needed
    ///
    /// Adding a path that already exists does nothing.
    pub fn add_dir(&mut self, path: &str) {
        let path = self.resolve(path);

        if self.files.contains(&path) || self.children.contains_key(&path) {
            return;
        }

        if let Some(parent) = parent_of(&path) {
            self.add_dir(&parent);
            self.children.entry(parent).or_default().push(path.clone());
        }

        self.children.insert(path, vec![]);
    }

    /// Get the list of directories that were enumerated so far, in order
    pub fn listed_directories(&self) -> Vec<String> {
        self.listed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn resolve(&self, path: &str) -> String {
        let path = normalize_path(path);

        if is_rooted(&path) {
            path
        } else {
            join(&self.working_dir, &path)
        }
    }

    fn list(&self, path: &str, keep: impl Fn(&str) -> bool) -> io::Result<Vec<String>> {
        let path = self.resolve(path);

        self.listed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.clone());

        if self.unreadable.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot read directory '{path}'"),
            ));
        }

        Ok(self
            .children
            .get(&path)
            .map(|children| {
                children
                    .iter()
                    .filter(|child| keep(child))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl Default for MemoryController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for MemoryController {
    fn root_directory(&self) -> &str {
        &self.root_dir
    }

    fn working_directory(&self) -> &str {
        &self.working_dir
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.contains(&self.resolve(path))
    }

    fn directory_exists(&self, path: &str) -> bool {
        self.children.contains_key(&self.resolve(path))
    }

    fn enumerate_files(&self, path: &str) -> io::Result<Vec<String>> {
        self.list(path, |child| self.files.contains(child))
    }

    fn enumerate_directories(&self, path: &str) -> io::Result<Vec<String>> {
        self.list(path, |child| self.children.contains_key(child))
    }

    fn enumerate_entries(&self, path: &str) -> io::Result<Vec<String>> {
        self.list(path, |_| true)
    }
}

/// Get the parent of a normalized, rooted path
fn parent_of(path: &str) -> Option<String> {
    match path.rfind(SEPARATOR)? {
        _ if path == "/" => None,
        0 => Some(String::from(SEPARATOR)),
        pos => Some(path[..pos].to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_are_created() {
        let controller = MemoryController::from_paths(["/a/b/c.txt", "/d/"]);

        assert!(controller.directory_exists("/a"));
        assert!(controller.directory_exists("/a/b"));
        assert!(controller.file_exists("/a/b/c.txt"));
        assert!(!controller.file_exists("/a/b"));
        assert!(controller.directory_exists("/d"));
        assert!(!controller.directory_exists("/e"));
    }

    #[test]
    fn listings_keep_insertion_order() {
        let controller = MemoryController::from_paths(["/z.txt", "/a/", "/m.txt"]);

        assert_eq!(
            controller.enumerate_entries("/").unwrap(),
            ["/z.txt", "/a", "/m.txt"]
        );
        assert_eq!(controller.enumerate_files("/").unwrap(), ["/z.txt", "/m.txt"]);
        assert_eq!(controller.enumerate_directories("/").unwrap(), ["/a"]);
        assert!(controller.enumerate_entries("/missing").unwrap().is_empty());

        assert_eq!(controller.listed_directories(), ["/", "/", "/", "/missing"]);
    }

    #[test]
    fn relative_paths_use_the_working_directory() {
        let controller = MemoryController::new()
            .with_working_directory("/work")
            .with_file("src/main.rs");

        assert!(controller.file_exists("/work/src/main.rs"));
        assert!(controller.file_exists("src/main.rs"));
    }

    #[test]
    fn unreadable_directories_fail() {
        let controller = MemoryController::from_paths(["/a/b.txt"]).with_unreadable("/a");

        let err = controller.enumerate_files("/a").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
