use std::{fs, io, path::Path};

use crate::paths::{is_rooted, join, normalize_path, to_slash_path};

/// Read-only filesystem access used by [`crate::Walker`]
///
/// All paths are `/`-separated strings. Enumerations return the full path of each child.
///
/// Implementations are expected to be total for absent paths: existence checks return `false`
/// and enumerations return an empty list. Any error they do return is forwarded by the walker
/// unchanged.
pub trait Controller {
    /// The root directory, which rooted patterns start from
    fn root_directory(&self) -> &str;

    /// The directory relative patterns start from when no other is provided
    fn working_directory(&self) -> &str;

    /// Check if a file exists at the provided path
    fn file_exists(&self, path: &str) -> bool;

    /// Check if a directory exists at the provided path
    fn directory_exists(&self, path: &str) -> bool;

    /// List the files inside a directory
    fn enumerate_files(&self, path: &str) -> io::Result<Vec<String>>;

    /// List the directories inside a directory
    fn enumerate_directories(&self, path: &str) -> io::Result<Vec<String>>;

    /// List all entries inside a directory
    ///
    /// Defaults to the files followed by the directories.
    fn enumerate_entries(&self, path: &str) -> io::Result<Vec<String>> {
        let mut entries = self.enumerate_files(path)?;
        entries.extend(self.enumerate_directories(path)?);
        Ok(entries)
    }
}

impl<C: Controller + ?Sized> Controller for &C {
    fn root_directory(&self) -> &str {
        (**self).root_directory()
    }

    fn working_directory(&self) -> &str {
        (**self).working_directory()
    }

    fn file_exists(&self, path: &str) -> bool {
        (**self).file_exists(path)
    }

    fn directory_exists(&self, path: &str) -> bool {
        (**self).directory_exists(path)
    }

    fn enumerate_files(&self, path: &str) -> io::Result<Vec<String>> {
        (**self).enumerate_files(path)
    }

    fn enumerate_directories(&self, path: &str) -> io::Result<Vec<String>> {
        (**self).enumerate_directories(path)
    }

    fn enumerate_entries(&self, path: &str) -> io::Result<Vec<String>> {
        (**self).enumerate_entries(path)
    }
}

/// Controller over the real filesystem
///
/// * Symbolic links are always followed
/// * Entries are listed in name order
/// * Entries whose name is not valid UTF-8 are skipped, with a warning
/// * Listing a directory that doesn't exist yields no entry
#[derive(Debug, Clone)]
pub struct FsController {
    root_dir: String,
    working_dir: String,
}

impl FsController {
    /// Create a controller resolving relative patterns from the provided directory
    ///
    /// The directory is canonicalized, which fails if it does not exist. Fails with
    /// [`io::ErrorKind::InvalidData`] if its path is not valid UTF-8.
    pub fn new(working_dir: &Path) -> io::Result<Self> {
        let working_dir = fs::canonicalize(working_dir)?;

        let working_dir = to_slash_path(&working_dir).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("path '{}' is not valid UTF-8", working_dir.display()),
            )
        })?;

        Ok(Self {
            root_dir: String::from("/"),
            working_dir,
        })
    }

    /// Create a controller resolving relative patterns from the current directory
    pub fn current() -> io::Result<Self> {
        Self::new(&std::env::current_dir()?)
    }

    /// Resolve a path relative to the working directory
    fn resolve(&self, path: &str) -> String {
        let path = normalize_path(path);

        if is_rooted(&path) {
            path
        } else {
            join(&self.working_dir, &path)
        }
    }

    fn read_dir(&self, path: &str, keep: impl Fn(&Path) -> bool) -> io::Result<Vec<String>> {
        let path = self.resolve(path);

        if !Path::new(&path).is_dir() {
            return Ok(vec![]);
        }

        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            // Removed since the check above
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err),
        };

        let mut names = vec![];

        for entry in entries {
            let entry = entry?;

            if !keep(&entry.path()) {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => {
                    tracing::warn!(
                        dir = %path,
                        name = %name.to_string_lossy(),
                        "skipping entry with a non UTF-8 name"
                    );
                }
            }
        }

        names.sort();

        Ok(names.iter().map(|name| join(&path, name)).collect())
    }
}

impl Controller for FsController {
    fn root_directory(&self) -> &str {
        &self.root_dir
    }

    fn working_directory(&self) -> &str {
        &self.working_dir
    }

    fn file_exists(&self, path: &str) -> bool {
        Path::new(&self.resolve(path)).is_file()
    }

    fn directory_exists(&self, path: &str) -> bool {
        Path::new(&self.resolve(path)).is_dir()
    }

    fn enumerate_files(&self, path: &str) -> io::Result<Vec<String>> {
        self.read_dir(path, Path::is_file)
    }

    fn enumerate_directories(&self, path: &str) -> io::Result<Vec<String>> {
        self.read_dir(path, Path::is_dir)
    }

    fn enumerate_entries(&self, path: &str) -> io::Result<Vec<String>> {
        self.read_dir(path, |_| true)
    }
}

