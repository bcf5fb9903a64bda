use thiserror::Error;

/// Errors raised while building patterns and templates
///
/// Filesystem failures are not part of this type: walkers yield the
/// [`std::io::Error`] reported by their [`crate::Controller`] unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern text cannot be parsed or compiled
    #[error("malformed pattern '{pattern}': {reason}")]
    Malformed { pattern: String, reason: String },

    /// [`crate::Pattern::combine`] was called without any usable pattern
    #[error("cannot combine an empty set of patterns")]
    EmptyCombination,
}

impl PatternError {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            pattern: pattern.to_owned(),
            reason: reason.into(),
        }
    }
}
