//! Configuration of a context.

use crate::language::Equivalence;

/// Settings that change how a [`Context`](crate::Context) resolves text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// Separator used by `\lines` when its separator parameter is empty and
    ///     no `defaultLineSeparator` definition exists.
    pub default_line_separator: String,
    /// Syllable separator passed to analyzers when `\trslit` does not give one.
    pub syllable_separator: Option<String>,
    /// Strictness of language matching for multilingual definitions.
    pub equivalence: Equivalence,
    /// If set, resolution that nests deeper than this fails with a depth exceeded error.
    ///
    /// This is off by default, in which case reference cycles recurse until the stack overflows.
    pub max_resolution_depth: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_line_separator: " / ".into(),
            syllable_separator: None,
            equivalence: Equivalence::StrictWithWildcards,
            max_resolution_depth: None,
        }
    }
}

impl Settings {
    pub fn with_default_line_separator<T: Into<String>>(mut self, separator: T) -> Self {
        self.default_line_separator = separator.into();
        self
    }

    pub fn with_syllable_separator<T: Into<String>>(mut self, separator: T) -> Self {
        self.syllable_separator = Some(separator.into());
        self
    }

    pub fn with_equivalence(mut self, equivalence: Equivalence) -> Self {
        self.equivalence = equivalence;
        self
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = Some(depth);
        self
    }
}
