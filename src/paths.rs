use std::path::{MAIN_SEPARATOR, Path};

/// The only separator used in paths exchanged with [`crate::Controller`]s
pub const SEPARATOR: char = '/';

/// Normalize a path
///
/// * `\` separators are rewritten to `/`
/// * Empty and `.` components are removed
/// * A leading separator is kept, a trailing one is not
pub fn normalize_path(path: &str) -> String {
    let rooted = path.starts_with(['/', '\\']);

    let mut normalized = if rooted {
        String::from(SEPARATOR)
    } else {
        String::new()
    };

    for component in path.split(['/', '\\']) {
        if component.is_empty() || component == "." {
            continue;
        }

        if !normalized.is_empty() && !normalized.ends_with(SEPARATOR) {
            normalized.push(SEPARATOR);
        }

        normalized.push_str(component);
    }

    normalized
}

/// Check if a path starts from the root directory
pub fn is_rooted(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Join a child name onto a directory, with exactly one separator between them
pub fn join(dir: &str, name: &str) -> String {
    let name = name.trim_start_matches(SEPARATOR);

    if dir.is_empty() {
        return name.to_owned();
    }

    let mut joined = String::with_capacity(dir.len() + name.len() + 1);
    joined.push_str(dir);

    if !dir.ends_with(SEPARATOR) {
        joined.push(SEPARATOR);
    }

    joined.push_str(name);
    joined
}

/// Get the last component of a path
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Convert a host path to a `/`-separated string
///
/// Returns [`None`] if the path is not valid UTF-8.
pub fn to_slash_path(path: &Path) -> Option<String> {
    let path = path.to_str()?;

    if MAIN_SEPARATOR == SEPARATOR {
        Some(path.to_owned())
    } else {
        Some(path.replace(MAIN_SEPARATOR, "/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizing() {
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("."), "");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
        assert_eq!(normalize_path("./a/./b/"), "a/b");
        assert_eq!(normalize_path("/a//b/."), "/a/b");
        assert_eq!(normalize_path("a\\b\\c"), "a/b/c");
        assert_eq!(normalize_path("\\a"), "/a");
    }

    #[test]
    fn joining() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
        assert_eq!(join("/a/", "b"), "/a/b");
        assert_eq!(join("", "b"), "b");
        assert_eq!(join("a", "/b"), "a/b");
    }

    #[test]
    fn file_names() {
        assert_eq!(file_name("/a/b.txt"), "b.txt");
        assert_eq!(file_name("b.txt"), "b.txt");
        assert_eq!(file_name("/"), "");
    }
}
