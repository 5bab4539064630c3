//! Fonts and legacy character maps.
//!
//! Many liturgical texts were typed in legacy 8-bit fonts that draw, for example,
//!     Coptic letters in place of Latin ones.
//! Text in such a font is stored as the Latin characters that were typed.
//! A legacy font in Psalter is a character map from those characters to Unicode;
//!     a Unicode font has no map.

use std::collections::HashMap;

/// Name of the built-in legacy Coptic font.
pub const CS_AVVA_SHENOUDA: &str = "CS Avva Shenouda";

/// How the characters of a font are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    Unicode,
    /// Characters are drawn as the mapped string. Unmapped characters are kept.
    Legacy(HashMap<char, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    name: String,
    encoding: Encoding,
}

impl Font {
    pub fn unicode<T: Into<String>>(name: T) -> Font {
        Font {
            name: name.into(),
            encoding: Encoding::Unicode,
        }
    }

    pub fn legacy<T, I, S>(name: T, map: I) -> Font
    where
        T: Into<String>,
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        Font {
            name: name.into(),
            encoding: Encoding::Legacy(map.into_iter().map(|(c, s)| (c, s.into())).collect()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unicode(&self) -> bool {
        matches!(self.encoding, Encoding::Unicode)
    }

    /// Converts text encoded in this font to Unicode.
    pub fn convert(&self, text: &str) -> String {
        match &self.encoding {
            Encoding::Unicode => text.to_string(),
            Encoding::Legacy(map) => {
                let mut s = String::with_capacity(text.len() * 2);
                for c in text.chars() {
                    match map.get(&c) {
                        None => s.push(c),
                        Some(mapped) => s.push_str(mapped),
                    }
                }
                s
            }
        }
    }
}

/// The fonts known to a context, by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    fonts: HashMap<String, Font>,
}

impl Registry {
    /// A registry with no fonts.
    pub fn new() -> Registry {
        Default::default()
    }

    /// A registry with the built-in fonts.
    pub fn with_built_ins() -> Registry {
        let mut registry = Registry::new();
        registry.insert(cs_avva_shenouda());
        registry
    }

    /// Adds a font, replacing any font with the same name.
    pub fn insert(&mut self, font: Font) {
        self.fonts.insert(font.name.to_lowercase(), font);
    }

    pub fn get(&self, name: &str) -> Option<&Font> {
        self.fonts.get(&name.to_lowercase())
    }

    /// Converts text in the named font to Unicode.
    ///
    /// Fonts that are not registered are assumed to be Unicode fonts.
    pub fn convert(&self, font_name: &str, text: &str) -> String {
        match self.get(font_name) {
            Some(font) => font.convert(text),
            None => {
                log::warn!("font `{font_name}` is not registered; treating it as a Unicode font");
                text.to_string()
            }
        }
    }
}

/// The Coptic Standard layout used by the CS family of fonts.
fn cs_avva_shenouda() -> Font {
    const LETTERS: &[(char, char, char, char)] = &[
        // (typed lower, typed upper, Unicode lower, Unicode upper)
        ('a', 'A', 'ⲁ', 'Ⲁ'),
        ('b', 'B', 'ⲃ', 'Ⲃ'),
        ('g', 'G', 'ⲅ', 'Ⲅ'),
        ('d', 'D', 'ⲇ', 'Ⲇ'),
        ('e', 'E', 'ⲉ', 'Ⲉ'),
        ('z', 'Z', 'ⲍ', 'Ⲍ'),
        ('y', 'Y', 'ⲏ', 'Ⲏ'),
        (';', ':', 'ⲑ', 'Ⲑ'),
        ('i', 'I', 'ⲓ', 'Ⲓ'),
        ('k', 'K', 'ⲕ', 'Ⲕ'),
        ('l', 'L', 'ⲗ', 'Ⲗ'),
        ('m', 'M', 'ⲙ', 'Ⲙ'),
        ('n', 'N', 'ⲛ', 'Ⲛ'),
        ('x', 'X', 'ⲝ', 'Ⲝ'),
        ('o', 'O', 'ⲟ', 'Ⲟ'),
        ('p', 'P', 'ⲡ', 'Ⲡ'),
        ('r', 'R', 'ⲣ', 'Ⲣ'),
        ('c', 'C', 'ⲥ', 'Ⲥ'),
        ('t', 'T', 'ⲧ', 'Ⲧ'),
        ('u', 'U', 'ⲩ', 'Ⲩ'),
        ('v', 'V', 'ⲫ', 'Ⲫ'),
        (',', '<', 'ⲭ', 'Ⲭ'),
        ('\'', '"', 'ⲯ', 'Ⲯ'),
        ('w', 'W', 'ⲱ', 'Ⲱ'),
        ('s', 'S', 'ϣ', 'Ϣ'),
        ('f', 'F', 'ϥ', 'Ϥ'),
        ('q', 'Q', 'ϧ', 'Ϧ'),
        ('h', 'H', 'ϩ', 'Ϩ'),
        ('j', 'J', 'ϫ', 'Ϫ'),
        ('[', '@', 'ϭ', 'Ϭ'),
        (']', '#', 'ϯ', 'Ϯ'),
    ];
    let mut map: Vec<(char, String)> = Vec::with_capacity(LETTERS.len() * 2 + 2);
    for (lower, upper, unicode_lower, unicode_upper) in LETTERS {
        map.push((*lower, unicode_lower.to_string()));
        map.push((*upper, unicode_upper.to_string()));
    }
    // The jenkim is typed after the letter it sits on, like a combining mark.
    map.push(('`', "\u{0300}".to_string()));
    map.push(('=', "\u{0305}".to_string()));
    Font::legacy(CS_AVVA_SHENOUDA, map)
}
