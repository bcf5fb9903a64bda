//! Globtree is a library designed for finding all items in a directory tree that match a *glob pattern*,
//! and for extracting named values from the paths it finds.
//!
//! # Examples
//!
//! ```rust,no_run
//! use globtree::glob_current_dir;
//!
//! let walker = glob_current_dir("**/*.rs").unwrap();
//!
//! for path in walker {
//!   println!("{}", path.unwrap());
//! }
//! ```
//!
//! Patterns are compiled to regular expressions, and can be combined with [`Pattern::combine`] or
//! prefixed with [`Pattern::concat`]. Walking the filesystem goes through the [`Controller`] trait,
//! implemented for the real filesystem by [`FsController`] and for synthetic trees by
//! [`MemoryController`].
//!
//! All paths are `/`-separated strings, whatever the platform.
//!
//! * Literal segments are resolved without listing their parent directory
//! * Directories that cannot contain a match are never listed
//! * The starting directory is not yielded in the results
//! * Symbolic links are followed by [`FsController`]
//! * No guarantee is given as for the order the results are yielded in
//!
//! # Syntax
//!
//! See [`Pattern`] and [`Template`].

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(unused_crate_dependencies)]

mod cache;
mod compiler;
mod controller;
mod error;
mod memory;
mod parser;
mod paths;
mod pattern;
mod template;
mod walker;

use std::path::Path;

use anyhow::{Context, Result};

// Only used by integration tests
#[cfg(test)]
use tempfile as _;

pub use self::{
    cache::PatternCache,
    controller::{Controller, FsController},
    error::PatternError,
    memory::MemoryController,
    paths::normalize_path,
    pattern::{Pattern, PatternOpts},
    template::{Template, TemplateMatch, TemplateMatches},
    walker::{Walker, filter_directory},
};

/// Match a pattern against a directory
///
/// For details on how patterns are applied, see [`Walker::new`]
pub fn glob(pattern: &str, dir: &Path) -> Result<Walker<FsController>> {
    glob_with(pattern, dir, PatternOpts::default())
}

/// Match a pattern against a directory
///
/// For details on how patterns are applied, see [`Walker::new`]
pub fn glob_with(pattern: &str, dir: &Path, opts: PatternOpts) -> Result<Walker<FsController>> {
    let pattern =
        Pattern::new_with_opts(pattern, opts).context("Failed to parse provided pattern")?;

    let controller = FsController::new(dir)
        .with_context(|| format!("Failed to open directory '{}'", dir.display()))?;

    Ok(Walker::new(pattern, "", controller))
}

/// Match a pattern against the current directory
///
/// Strictly equivalent to calling [`glob`] with the path to the current directory
///
/// For details on how patterns are applied, see [`Walker`]
pub fn glob_current_dir(pattern: &str) -> Result<Walker<FsController>> {
    let current_dir =
        std::env::current_dir().context("Failed to get path of the current directory")?;

    glob(pattern, &current_dir)
}

/// Match a template against a directory
///
/// For details on how templates are applied, see [`Template::enumerate`]
pub fn glob_template(template: &str, dir: &Path) -> Result<TemplateMatches<FsController>> {
    let template = Template::new(template).context("Failed to parse provided template")?;

    let controller = FsController::new(dir)
        .with_context(|| format!("Failed to open directory '{}'", dir.display()))?;

    Ok(template.enumerate(controller))
}
