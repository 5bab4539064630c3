//! Linguistic analyzers.
//!
//! The `\ipa`, `\trslit` and `\abv` commands delegate to the [`Analyzer`]
//!     registered for the language of the text they are invoked in.
//! Analyzers are external collaborators; this module provides the trait and a
//!     table-driven implementation, [`TableAnalyzer`], with built-in Coptic tables.

use std::collections::HashMap;

use crate::language::{KnownLanguage, LanguageInfo};

/// Linguistic operations for one source language.
pub trait Analyzer: std::fmt::Debug {
    /// Transcribes text into the International Phonetic Alphabet.
    fn ipa_transcribe(&self, text: &str) -> String;

    /// Transliterates text into the script of the target language.
    ///
    /// Returns [None] if the analyzer has no mapping to the target.
    fn transliterate(
        &self,
        text: &str,
        target: &LanguageInfo,
        syllable_separator: Option<&str>,
    ) -> Option<String>;

    /// Expands an abbreviation key, or returns its abbreviated form if `keep_abbreviated` is true.
    ///
    /// Returns [None] if the key is not known.
    fn resolve_abbreviation(&self, key: &str, keep_abbreviated: bool) -> Option<String>;
}

/// A replacement table applied by longest match.
#[derive(Debug, Clone, Default)]
pub struct Table {
    // Sorted by decreasing key length so the first match is the longest.
    entries: Vec<(Vec<char>, String)>,
    preserve_case: bool,
}

impl Table {
    pub fn new<I, K, V>(entries: I) -> Table
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries: Vec<(Vec<char>, String)> = entries
            .into_iter()
            .map(|(k, v)| (k.as_ref().chars().map(lower).collect(), v.into()))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Table {
            entries,
            preserve_case: false,
        }
    }

    /// When set, a match that starts with an uppercase character is capitalized.
    pub fn preserving_case(mut self) -> Self {
        self.preserve_case = true;
        self
    }

    /// Applies the table. Characters that no entry matches are kept.
    pub fn apply(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut result = String::with_capacity(text.len());
        let mut i = 0;
        'outer: while i < chars.len() {
            for (key, value) in &self.entries {
                if key.is_empty() || i + key.len() > chars.len() {
                    continue;
                }
                let matches = key
                    .iter()
                    .zip(&chars[i..])
                    .all(|(k, c)| *k == lower(*c));
                if !matches {
                    continue;
                }
                if self.preserve_case && chars[i].is_uppercase() {
                    let mut value_chars = value.chars();
                    if let Some(first) = value_chars.next() {
                        result.extend(first.to_uppercase());
                        result.push_str(value_chars.as_str());
                    }
                } else {
                    result.push_str(value);
                }
                i += key.len();
                continue 'outer;
            }
            result.push(chars[i]);
            i += 1;
        }
        result
    }
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// An analyzer driven by replacement tables and an abbreviation dictionary.
#[derive(Debug, Clone, Default)]
pub struct TableAnalyzer {
    ipa: Table,
    transliterations: HashMap<KnownLanguage, Table>,
    // key -> (expanded, abbreviated)
    abbreviations: HashMap<String, (String, String)>,
}

impl TableAnalyzer {
    pub fn new(ipa: Table) -> TableAnalyzer {
        TableAnalyzer {
            ipa,
            ..Default::default()
        }
    }

    pub fn with_transliteration(mut self, target: KnownLanguage, table: Table) -> Self {
        self.transliterations.insert(target, table);
        self
    }

    pub fn with_abbreviation<K, E, A>(mut self, key: K, expanded: E, abbreviated: A) -> Self
    where
        K: AsRef<str>,
        E: Into<String>,
        A: Into<String>,
    {
        self.abbreviations.insert(
            key.as_ref().to_lowercase(),
            (expanded.into(), abbreviated.into()),
        );
        self
    }

    /// Tables for Bohairic Coptic written in Unicode.
    pub fn coptic() -> TableAnalyzer {
        const JENKIM: &str = "\u{0300}";
        const OVERLINE: &str = "\u{0305}";
        let english = Table::new([
            ("ⲟⲩ", "ou"),
            ("ⲁ", "a"),
            ("ⲃ", "v"),
            ("ⲅ", "g"),
            ("ⲇ", "d"),
            ("ⲉ", "e"),
            ("ⲍ", "z"),
            ("ⲏ", "ee"),
            ("ⲑ", "th"),
            ("ⲓ", "i"),
            ("ⲕ", "k"),
            ("ⲗ", "l"),
            ("ⲙ", "m"),
            ("ⲛ", "n"),
            ("ⲝ", "x"),
            ("ⲟ", "o"),
            ("ⲡ", "p"),
            ("ⲣ", "r"),
            ("ⲥ", "s"),
            ("ⲧ", "t"),
            ("ⲩ", "y"),
            ("ⲫ", "ph"),
            ("ⲭ", "kh"),
            ("ⲯ", "ps"),
            ("ⲱ", "o"),
            ("ϣ", "sh"),
            ("ϥ", "f"),
            ("ϧ", "kh"),
            ("ϩ", "h"),
            ("ϫ", "j"),
            ("ϭ", "ch"),
            ("ϯ", "ti"),
            (JENKIM, ""),
            (OVERLINE, ""),
        ])
        .preserving_case();
        let ipa = Table::new([
            ("ⲟⲩ", "u"),
            ("ⲁ", "a"),
            ("ⲃ", "v"),
            ("ⲅ", "ɣ"),
            ("ⲇ", "d"),
            ("ⲉ", "e"),
            ("ⲍ", "z"),
            ("ⲏ", "iː"),
            ("ⲑ", "tʰ"),
            ("ⲓ", "i"),
            ("ⲕ", "k"),
            ("ⲗ", "l"),
            ("ⲙ", "m"),
            ("ⲛ", "n"),
            ("ⲝ", "ks"),
            ("ⲟ", "o"),
            ("ⲡ", "p"),
            ("ⲣ", "r"),
            ("ⲥ", "s"),
            ("ⲧ", "t"),
            ("ⲩ", "i"),
            ("ⲫ", "f"),
            ("ⲭ", "kʰ"),
            ("ⲯ", "ps"),
            ("ⲱ", "oː"),
            ("ϣ", "ʃ"),
            ("ϥ", "f"),
            ("ϧ", "x"),
            ("ϩ", "h"),
            ("ϫ", "dʒ"),
            ("ϭ", "tʃ"),
            ("ϯ", "ti"),
            (JENKIM, ""),
            (OVERLINE, ""),
        ]);
        TableAnalyzer::new(ipa)
            .with_transliteration(KnownLanguage::English, english)
            .with_abbreviation("lord", "ⲡϭⲟⲓⲥ", "ⲡ\u{0305}ⲟ\u{0305}ⲥ\u{0305}")
            .with_abbreviation("jesus", "ⲓⲏⲥⲟⲩⲥ", "ⲓ\u{0305}ⲏ\u{0305}ⲥ\u{0305}")
            .with_abbreviation("christ", "ⲡⲓⲭⲣⲓⲥⲧⲟⲥ", "ⲡ\u{0305}ⲭ\u{0305}ⲥ\u{0305}")
            .with_abbreviation("god", "ⲫⲛⲟⲩϯ", "ⲫ\u{0305}ϯ\u{0305}")
    }
}

impl Analyzer for TableAnalyzer {
    fn ipa_transcribe(&self, text: &str) -> String {
        self.ipa.apply(text)
    }

    // Table transliteration works letter by letter, so the syllable separator is not used.
    fn transliterate(
        &self,
        text: &str,
        target: &LanguageInfo,
        _syllable_separator: Option<&str>,
    ) -> Option<String> {
        self.transliterations
            .get(&target.known())
            .map(|table| table.apply(text))
    }

    fn resolve_abbreviation(&self, key: &str, keep_abbreviated: bool) -> Option<String> {
        self.abbreviations
            .get(&key.to_lowercase())
            .map(|(expanded, abbreviated)| {
                if keep_abbreviated {
                    abbreviated.clone()
                } else {
                    expanded.clone()
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_wins() {
        let table = Table::new([("a", "1"), ("ab", "2"), ("abc", "3")]);
        assert_eq!(table.apply("abcaba"), "321");
        assert_eq!(table.apply("xyz"), "xyz");
    }

    #[test]
    fn coptic_transliteration_preserves_case() {
        let analyzer = TableAnalyzer::coptic();
        let english = LanguageInfo::new(KnownLanguage::English);
        assert_eq!(
            analyzer.transliterate("Ⲡϭⲟⲓⲥ", &english, None).as_deref(),
            Some("Pchois")
        );
        assert_eq!(
            analyzer.transliterate("ⲛⲟⲩϯ", &english, Some("-")).as_deref(),
            Some("nouti")
        );
    }

    #[test]
    fn coptic_transliteration_to_unsupported_target() {
        let analyzer = TableAnalyzer::coptic();
        let arabic = LanguageInfo::new(KnownLanguage::Arabic);
        assert_eq!(analyzer.transliterate("ⲁ", &arabic, None), None);
    }

    #[test]
    fn coptic_ipa() {
        assert_eq!(TableAnalyzer::coptic().ipa_transcribe("ϣⲟⲩ"), "ʃu");
    }

    #[test]
    fn abbreviations() {
        let analyzer = TableAnalyzer::coptic();
        assert_eq!(
            analyzer.resolve_abbreviation("Lord", false).as_deref(),
            Some("ⲡϭⲟⲓⲥ")
        );
        assert_eq!(
            analyzer.resolve_abbreviation("god", true).as_deref(),
            Some("ⲫ\u{0305}ϯ\u{0305}")
        );
        assert_eq!(analyzer.resolve_abbreviation("pharaoh", false), None);
    }
}
