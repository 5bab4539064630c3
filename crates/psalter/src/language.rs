//! Language identities
//!
//! Two levels of language identity are used throughout Psalter.
//! A [`KnownLanguage`] is a closed enumeration of the languages the engine knows about.
//! A [`LanguageInfo`] is a richer identity that adds a region, a variant (dialect)
//!     and an optional secondary language.
//! The secondary language marks text that is written in the script of another language;
//!     for example Coptic text transliterated into English letters is `cop/en`.
//!
//! Language infos are compared using [`LanguageInfo::is_equivalent_to`]
//!     under a configurable [`Equivalence`].

use std::fmt;
use std::str::FromStr;

/// A language the engine knows about.
///
/// The [`KnownLanguage::Default`] language tags the element of a translation
///     collection that is used when no better match exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KnownLanguage {
    Default,
    Coptic,
    Greek,
    English,
    Arabic,
    French,
    Spanish,
    German,
    Dutch,
    Italian,
    Latin,
    Hebrew,
    Aramaic,
    Syriac,
    Amharic,
    Armenian,
    /// The International Phonetic Alphabet, used as the target of IPA transcription.
    Ipa,
    /// A language tag that is none of the above.
    Unknown,
}

const TAGS: &[(KnownLanguage, &str)] = &[
    (KnownLanguage::Default, "default"),
    (KnownLanguage::Coptic, "cop"),
    (KnownLanguage::Greek, "el"),
    (KnownLanguage::English, "en"),
    (KnownLanguage::Arabic, "ar"),
    (KnownLanguage::French, "fr"),
    (KnownLanguage::Spanish, "es"),
    (KnownLanguage::German, "de"),
    (KnownLanguage::Dutch, "nl"),
    (KnownLanguage::Italian, "it"),
    (KnownLanguage::Latin, "la"),
    (KnownLanguage::Hebrew, "he"),
    (KnownLanguage::Aramaic, "arc"),
    (KnownLanguage::Syriac, "syc"),
    (KnownLanguage::Amharic, "am"),
    (KnownLanguage::Armenian, "hy"),
    (KnownLanguage::Ipa, "ipa"),
    (KnownLanguage::Unknown, "und"),
];

// Alternative tags accepted when parsing.
const ALIASES: &[(&str, KnownLanguage)] = &[
    ("grc", KnownLanguage::Greek),
    ("gr", KnownLanguage::Greek),
    ("cr", KnownLanguage::Coptic),
    ("x-ipa", KnownLanguage::Ipa),
];

impl KnownLanguage {
    /// The canonical tag of the language.
    pub fn tag(self) -> &'static str {
        TAGS.iter()
            .find(|(language, _)| *language == self)
            .map(|(_, tag)| *tag)
            .unwrap_or("und")
    }

    /// Looks up a known language by tag, ignoring case.
    ///
    /// ```
    /// # use psalter::KnownLanguage;
    /// assert_eq!(KnownLanguage::from_tag("COP"), Some(KnownLanguage::Coptic));
    /// assert_eq!(KnownLanguage::from_tag("grc"), Some(KnownLanguage::Greek));
    /// assert_eq!(KnownLanguage::from_tag("tlh"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<KnownLanguage> {
        TAGS.iter()
            .find(|(_, t)| t.eq_ignore_ascii_case(tag))
            .map(|(language, _)| *language)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(t, _)| t.eq_ignore_ascii_case(tag))
                    .map(|(_, language)| *language)
            })
    }
}

impl fmt::Display for KnownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// How strictly two [`LanguageInfo`]s are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Equivalence {
    /// Every component must be equal. "Coptic" does not match "Coptic, Bohairic".
    Strict,
    /// Components missing on either side, and the `*` language, match anything.
    /// "Coptic" matches "Coptic, Bohairic", but "Coptic, Sahidic" does not.
    #[default]
    StrictWithWildcards,
    /// Only the primary language is compared.
    LanguageOnly,
}

/// A language identity with optional region, variant and secondary language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LanguageInfo {
    known: KnownLanguage,
    tag: String,
    region: Option<String>,
    variant: Option<String>,
    secondary: Option<Box<LanguageInfo>>,
}

impl LanguageInfo {
    pub fn new(known: KnownLanguage) -> LanguageInfo {
        LanguageInfo {
            known,
            tag: known.tag().to_string(),
            region: None,
            variant: None,
            secondary: None,
        }
    }

    /// The language info that matches every language under [`Equivalence::StrictWithWildcards`].
    pub fn wildcard() -> LanguageInfo {
        LanguageInfo {
            known: KnownLanguage::Unknown,
            tag: "*".into(),
            region: None,
            variant: None,
            secondary: None,
        }
    }

    /// Parses a tag like `cop`, `cop-boh`, `en-US` or `cop/en`.
    ///
    /// The first subtag is the language.
    /// Later two-letter or three-digit subtags are regions; other subtags are variants.
    /// A secondary language follows a `/`.
    /// Returns [None] if the tag or any subtag is empty.
    ///
    /// ```
    /// # use psalter::{KnownLanguage, LanguageInfo};
    /// let info = LanguageInfo::parse("cop-boh/en").unwrap();
    /// assert_eq!(info.known(), KnownLanguage::Coptic);
    /// assert_eq!(info.variant(), Some("boh"));
    /// assert_eq!(info.secondary().unwrap().known(), KnownLanguage::English);
    /// assert_eq!(info.to_string(), "cop-boh/en");
    /// ```
    pub fn parse(s: &str) -> Option<LanguageInfo> {
        let s = s.trim();
        let (primary, secondary) = match s.split_once('/') {
            None => (s, None),
            Some((primary, secondary)) => (primary, Some(LanguageInfo::parse(secondary)?)),
        };
        let mut subtags = primary.split(['-', '_']);
        let tag = subtags.next().filter(|t| !t.is_empty())?;
        let mut info = if tag == "*" {
            LanguageInfo::wildcard()
        } else {
            match KnownLanguage::from_tag(tag) {
                Some(known) => LanguageInfo::new(known),
                None => LanguageInfo {
                    known: KnownLanguage::Unknown,
                    tag: tag.to_ascii_lowercase(),
                    region: None,
                    variant: None,
                    secondary: None,
                },
            }
        };
        for subtag in subtags {
            if subtag.is_empty() {
                return None;
            }
            let is_region = (subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()))
                || (subtag.len() == 3 && subtag.chars().all(|c| c.is_ascii_digit()));
            if is_region && info.region.is_none() {
                info.region = Some(subtag.to_ascii_uppercase());
            } else if info.variant.is_none() {
                info.variant = Some(subtag.to_ascii_lowercase());
            } else {
                return None;
            }
        }
        info.secondary = secondary.map(Box::new);
        Some(info)
    }

    pub fn with_region<T: Into<String>>(mut self, region: T) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_variant<T: Into<String>>(mut self, variant: T) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_secondary(mut self, secondary: LanguageInfo) -> Self {
        self.secondary = Some(Box::new(secondary));
        self
    }

    pub fn known(&self) -> KnownLanguage {
        self.known
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn secondary(&self) -> Option<&LanguageInfo> {
        self.secondary.as_deref()
    }

    pub fn is_wildcard(&self) -> bool {
        self.tag == "*"
    }

    /// This language with the secondary language stripped.
    pub fn primary(&self) -> LanguageInfo {
        LanguageInfo {
            secondary: None,
            ..self.clone()
        }
    }

    fn same_primary(&self, other: &LanguageInfo) -> bool {
        match (self.known, other.known) {
            (KnownLanguage::Unknown, KnownLanguage::Unknown) => {
                self.tag.eq_ignore_ascii_case(&other.tag)
            }
            (a, b) => a == b,
        }
    }

    /// Reports whether two language infos identify the same language under the given equivalence.
    ///
    /// ```
    /// # use psalter::{KnownLanguage, LanguageInfo};
    /// # use psalter::language::Equivalence;
    /// let coptic = LanguageInfo::new(KnownLanguage::Coptic);
    /// let bohairic = LanguageInfo::parse("cop-boh").unwrap();
    /// assert!(coptic.is_equivalent_to(&bohairic, Equivalence::StrictWithWildcards));
    /// assert!(!coptic.is_equivalent_to(&bohairic, Equivalence::Strict));
    /// ```
    pub fn is_equivalent_to(&self, other: &LanguageInfo, equivalence: Equivalence) -> bool {
        match equivalence {
            Equivalence::Strict => {
                self.same_primary(other)
                    && optional_eq(&self.region, &other.region)
                    && optional_eq(&self.variant, &other.variant)
                    && match (&self.secondary, &other.secondary) {
                        (None, None) => true,
                        (Some(a), Some(b)) => a.is_equivalent_to(b, Equivalence::Strict),
                        _ => false,
                    }
            }
            Equivalence::StrictWithWildcards => {
                if self.is_wildcard() || other.is_wildcard() {
                    return true;
                }
                let wild_eq = |a: &Option<String>, b: &Option<String>| match (a, b) {
                    (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                    _ => true,
                };
                self.same_primary(other)
                    && wild_eq(&self.region, &other.region)
                    && wild_eq(&self.variant, &other.variant)
                    && match (&self.secondary, &other.secondary) {
                        (Some(a), Some(b)) => {
                            a.is_equivalent_to(b, Equivalence::StrictWithWildcards)
                        }
                        _ => true,
                    }
            }
            Equivalence::LanguageOnly => self.same_primary(other),
        }
    }
}

fn optional_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

impl From<KnownLanguage> for LanguageInfo {
    fn from(known: KnownLanguage) -> Self {
        LanguageInfo::new(known)
    }
}

impl FromStr for LanguageInfo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageInfo::parse(s).ok_or_else(|| format!["invalid language tag `{s}`"])
    }
}

impl fmt::Display for LanguageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        if let Some(region) = &self.region {
            write!(f, "-{region}")?;
        }
        if let Some(variant) = &self.variant {
            write!(f, "-{variant}")?;
        }
        if let Some(secondary) = &self.secondary {
            write!(f, "/{secondary}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(s: &str) -> LanguageInfo {
        LanguageInfo::parse(s).unwrap()
    }

    #[test]
    fn parse_region_and_variant() {
        let l = info("en-us");
        assert_eq!(l.known(), KnownLanguage::English);
        assert_eq!(l.region(), Some("US"));
        assert_eq!(l.variant(), None);

        let l = info("cop-EG-sah");
        assert_eq!(l.region(), Some("EG"));
        assert_eq!(l.variant(), Some("sah"));
    }

    #[test]
    fn parse_unknown_language_keeps_tag() {
        let l = info("Tlh");
        assert_eq!(l.known(), KnownLanguage::Unknown);
        assert_eq!(l.tag(), "tlh");
    }

    #[test]
    fn parse_rejects_empty_subtags() {
        assert_eq!(LanguageInfo::parse(""), None);
        assert_eq!(LanguageInfo::parse("cop-"), None);
        assert_eq!(LanguageInfo::parse("cop/"), None);
        assert_eq!(LanguageInfo::parse("cop-boh-sah-x"), None);
    }

    #[test]
    fn display_round_trips_canonical_tags() {
        for tag in ["cop", "cop-boh", "en-US", "cop/en", "ar-EG/en-US", "*"] {
            assert_eq!(info(tag).to_string(), tag);
        }
    }

    #[test]
    fn dialects_under_each_equivalence() {
        let coptic = info("cop");
        let bohairic = info("cop-boh");
        let sahidic = info("cop-sah");

        assert!(!coptic.is_equivalent_to(&bohairic, Equivalence::Strict));
        assert!(coptic.is_equivalent_to(&bohairic, Equivalence::StrictWithWildcards));
        assert!(bohairic.is_equivalent_to(&coptic, Equivalence::StrictWithWildcards));
        assert!(!bohairic.is_equivalent_to(&sahidic, Equivalence::StrictWithWildcards));
        assert!(bohairic.is_equivalent_to(&sahidic, Equivalence::LanguageOnly));
    }

    #[test]
    fn wildcard_matches_anything_only_when_permissive() {
        let wildcard = info("*");
        let arabic = info("ar");
        assert!(wildcard.is_equivalent_to(&arabic, Equivalence::StrictWithWildcards));
        assert!(!wildcard.is_equivalent_to(&arabic, Equivalence::Strict));
    }

    #[test]
    fn secondary_language_is_compared() {
        let transliterated = info("cop/en");
        let plain = info("cop");
        assert!(!transliterated.is_equivalent_to(&plain, Equivalence::Strict));
        assert!(transliterated.is_equivalent_to(&plain, Equivalence::StrictWithWildcards));
        assert!(!transliterated
            .is_equivalent_to(&info("cop/ar"), Equivalence::StrictWithWildcards));
        assert_eq!(transliterated.primary(), plain);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_json() {
        let l = info("cop-boh/en");
        let serialized = serde_json::to_string(&l).unwrap();
        let deserialized: LanguageInfo = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, l);
    }
}
