//! Translation collections and language lookup.
//!
//! A translation collection is an ordered list of language-tagged elements.
//! Looking up the element for a language works like this:
//!
//! 1. find an element whose language matches the requested language;
//! 1. otherwise, use the element tagged with the [`KnownLanguage::Default`] language;
//! 1. otherwise, there is no match and [None] is returned.
//!     Whether that is an error is up to the caller.
//!
//! Matching is either by [`KnownLanguage`] (exact), or by [`LanguageInfo`]
//!     under an [`Equivalence`], which is how dialects and wildcards are handled.

use std::collections::HashMap;

use crate::definition::DefId;
use crate::inline::Run;
use crate::language::{Equivalence, KnownLanguage, LanguageInfo};

/// Elements that carry a language and font.
pub trait Multilingual {
    fn language(&self) -> Option<&LanguageInfo>;

    fn font(&self) -> Option<&str> {
        None
    }

    fn known_language(&self) -> Option<KnownLanguage> {
        self.language().map(LanguageInfo::known)
    }
}

/// An ordered collection of language-tagged elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationCollection<T> {
    items: Vec<T>,
}

impl<T> Default for TranslationCollection<T> {
    fn default() -> Self {
        TranslationCollection { items: vec![] }
    }
}

impl<T: Multilingual> TranslationCollection<T> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    fn position_by_language(&self, language: KnownLanguage) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.known_language() == Some(language))
    }

    fn default_position(&self) -> Option<usize> {
        self.position_by_language(KnownLanguage::Default)
    }

    /// Returns the element for a known language, falling back to the default element.
    pub fn get_by_language(&self, language: KnownLanguage) -> Option<&T> {
        self.position_by_language(language)
            .or_else(|| self.default_position())
            .map(|i| &self.items[i])
    }

    /// Returns the first element whose language is equivalent to the given one,
    ///     falling back to the default element.
    pub fn get_by_language_info(
        &self,
        language: &LanguageInfo,
        equivalence: Equivalence,
    ) -> Option<&T> {
        self.position_by_language_info(language, equivalence)
            .or_else(|| self.default_position())
            .map(|i| &self.items[i])
    }

    fn position_by_language_info(
        &self,
        language: &LanguageInfo,
        equivalence: Equivalence,
    ) -> Option<usize> {
        self.items.iter().position(|item| match item.language() {
            None => false,
            Some(l) => l.is_equivalent_to(language, equivalence),
        })
    }
}

impl<T> IntoIterator for TranslationCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: Multilingual> FromIterator<T> for TranslationCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        TranslationCollection {
            items: iter.into_iter().collect(),
        }
    }
}

/// A collection of runs, one per language, used for multilingual values
///     like the default line separator.
///
/// In addition to the list, the collection keeps an index from known language
///     to position so that lookups by known language are O(1).
/// Dialect-aware lookups scan the list.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationRunCollection {
    runs: TranslationCollection<Run>,
    index: HashMap<KnownLanguage, usize>,
}

impl TranslationRunCollection {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a run.
    ///
    /// When two runs have the same known language, the index keeps the first one,
    ///     which is also the one a linear scan would find.
    pub fn push(&mut self, run: Run) {
        if let Some(language) = run.known_language() {
            self.index.entry(language).or_insert(self.runs.len());
        }
        self.runs.push(run);
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.runs.iter()
    }

    /// Returns the run for a known language, falling back to the default run.
    pub fn get_by_language(&self, language: KnownLanguage) -> Option<&Run> {
        self.index
            .get(&language)
            .or_else(|| self.index.get(&KnownLanguage::Default))
            .and_then(|i| self.runs.get(*i))
    }

    /// Returns the run for a language, falling back to the default run.
    ///
    /// With [`Equivalence::LanguageOnly`] the index answers directly;
    ///     otherwise the runs are scanned so that region and dialect are respected.
    pub fn get_by_language_info(
        &self,
        language: &LanguageInfo,
        equivalence: Equivalence,
    ) -> Option<&Run> {
        match equivalence {
            Equivalence::LanguageOnly if language.known() != KnownLanguage::Unknown => {
                self.get_by_language(language.known())
            }
            _ => self.runs.get_by_language_info(language, equivalence),
        }
    }
}

impl FromIterator<Run> for TranslationRunCollection {
    fn from_iter<I: IntoIterator<Item = Run>>(iter: I) -> Self {
        let mut collection = TranslationRunCollection::new();
        for run in iter {
            collection.push(run);
        }
        collection
    }
}

/// One language version of a document: a language, a font and the root section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Translation {
    pub language: LanguageInfo,
    pub font: Option<String>,
    pub root: DefId,
}

impl Multilingual for Translation {
    fn language(&self) -> Option<&LanguageInfo> {
        Some(&self.language)
    }

    fn font(&self) -> Option<&str> {
        self.font.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, language: &str) -> Run {
        Run::new(text).with_language(LanguageInfo::parse(language).unwrap())
    }

    fn info(s: &str) -> LanguageInfo {
        LanguageInfo::parse(s).unwrap()
    }

    #[test]
    fn falls_back_to_default_language() {
        let runs: TranslationRunCollection =
            [run("X", "default"), run("Y", "ar")].into_iter().collect();
        assert_eq!(
            runs.get_by_language(KnownLanguage::Greek).map(|r| r.text.as_str()),
            Some("X")
        );
        assert_eq!(
            runs.get_by_language(KnownLanguage::Arabic).map(|r| r.text.as_str()),
            Some("Y")
        );
    }

    #[test]
    fn no_match_without_default() {
        let runs: TranslationRunCollection = [run("Y", "ar")].into_iter().collect();
        assert_eq!(runs.get_by_language(KnownLanguage::Greek), None);
        assert_eq!(
            runs.get_by_language_info(&info("el"), Equivalence::StrictWithWildcards),
            None
        );
    }

    #[test]
    fn index_and_scan_agree_on_duplicates() {
        let runs: TranslationRunCollection =
            [run("first", "en-US"), run("second", "en-GB")].into_iter().collect();
        assert_eq!(
            runs.get_by_language(KnownLanguage::English).unwrap().text,
            "first"
        );
        assert_eq!(
            runs.get_by_language_info(&info("en"), Equivalence::StrictWithWildcards)
                .unwrap()
                .text,
            "first"
        );
        assert_eq!(
            runs.get_by_language_info(&info("en-GB"), Equivalence::Strict)
                .unwrap()
                .text,
            "second"
        );
    }

    #[test]
    fn dialect_matching_depends_on_strictness() {
        let runs: TranslationRunCollection =
            [run("Bohairic", "cop-boh"), run("fallback", "default")]
                .into_iter()
                .collect();
        assert_eq!(
            runs.get_by_language_info(&info("cop"), Equivalence::StrictWithWildcards)
                .unwrap()
                .text,
            "Bohairic"
        );
        assert_eq!(
            runs.get_by_language_info(&info("cop"), Equivalence::Strict)
                .unwrap()
                .text,
            "fallback"
        );
        assert_eq!(
            runs.get_by_language_info(&info("cop-sah"), Equivalence::LanguageOnly)
                .unwrap()
                .text,
            "Bohairic"
        );
    }

    #[test]
    fn generic_collection_lookup() {
        let collection: TranslationCollection<Translation> = [
            Translation {
                language: info("en"),
                font: None,
                root: DefId::new(0),
            },
            Translation {
                language: info("cop-boh"),
                font: Some("CS Avva Shenouda".into()),
                root: DefId::new(1),
            },
        ]
        .into_iter()
        .collect();
        assert_eq!(
            collection.get_by_language(KnownLanguage::Coptic).unwrap().root,
            DefId::new(1)
        );
        assert_eq!(collection.get_by_language(KnownLanguage::Arabic), None);
        assert_eq!(
            collection
                .get_by_language_info(&info("*"), Equivalence::StrictWithWildcards)
                .unwrap()
                .root,
            DefId::new(0)
        );
    }
}
