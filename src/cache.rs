use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{Pattern, PatternError, PatternOpts};

/// Memo of compiled patterns, keyed by their normalized text and options
///
/// Compiling the same text twice through a cache returns the very same pattern (see
/// [`Pattern::ptr_eq`]), and so do texts that normalize the same way, e.g. `./a` and `a`.
/// Failed compilations are not cached.
///
/// The cache is an ordinary value: create one wherever patterns should be shared and pass it
/// around. It can be used from several threads at once.
#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: Mutex<HashMap<(String, PatternOpts), Pattern>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached pattern for this text, or compile it with the default options
    pub fn get_or_compile(&self, input: &str) -> Result<Pattern, PatternError> {
        self.get_or_compile_with_opts(input, PatternOpts::default())
    }

    /// Get the cached pattern for this text and options, or compile it
    pub fn get_or_compile_with_opts(
        &self,
        input: &str,
        opts: PatternOpts,
    ) -> Result<Pattern, PatternError> {
        let key = (Pattern::canonical_text(input)?, opts);

        if let Some(pattern) = self.lock().get(&key) {
            tracing::trace!(pattern = input, "pattern cache hit");
            return Ok(pattern.clone());
        }

        tracing::trace!(pattern = input, "pattern cache miss");

        let pattern = Pattern::new_with_opts(&key.0, opts)?;

        // Another thread may have compiled the same text in the meantime
        Ok(self.lock().entry(key).or_insert(pattern).clone())
    }

    /// Number of cached patterns
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove all cached patterns
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(String, PatternOpts), Pattern>> {
        self.patterns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_gives_same_pattern() {
        let cache = PatternCache::new();

        let a = cache.get_or_compile("**/*.cs").unwrap();
        let b = cache.get_or_compile("**/*.cs").unwrap();
        let c = Pattern::new("**/*.cs").unwrap();

        assert!(Pattern::ptr_eq(&a, &b));
        assert!(!Pattern::ptr_eq(&a, &c));
        assert_eq!(a, c);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn options_are_part_of_the_key() {
        let cache = PatternCache::new();

        let sensitive = cache.get_or_compile("*.cs").unwrap();
        let insensitive = cache
            .get_or_compile_with_opts(
                "*.cs",
                PatternOpts {
                    case_insensitive: true,
                },
            )
            .unwrap();

        assert!(!Pattern::ptr_eq(&sensitive, &insensitive));
        assert_ne!(sensitive, insensitive);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn equivalent_texts_share_a_pattern() {
        let cache = PatternCache::new();

        let a = cache.get_or_compile("a").unwrap();

        for equivalent in ["./a", "a/", ".//a", "a;./a", ";a;"] {
            let other = cache.get_or_compile(equivalent).unwrap();
            assert!(
                Pattern::ptr_eq(&a, &other),
                "'{equivalent}' did not reuse the cached pattern"
            );
        }

        let b = cache.get_or_compile("a\\*.rs").unwrap();
        assert!(Pattern::ptr_eq(&b, &cache.get_or_compile("./a/*.rs").unwrap()));
        assert_eq!(b.as_str(), "a/*.rs");

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = PatternCache::new();

        assert!(cache.get_or_compile("[abc").is_err());
        assert!(cache.is_empty());

        cache.get_or_compile("a").unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
