//! Commands backed by the linguistic analyzer: abbreviations, IPA and transliteration
//!
//! The analyzer used is the one registered for the language in effect at the command.
//! Text is converted from legacy fonts to Unicode before it is given to the analyzer,
//!     and the result is Unicode, so the result's font tag is cleared.

use super::*;
use crate::error::{ArgumentError, DefinitionNotFoundError, UnsupportedLanguageError};
use crate::inline::{FontTag, Run};
use crate::language::KnownLanguage;

pub const ABV_DOC: &str = r"Expand an abbreviation

Usage: `\abv{key}` or `\abv{key|keep abbreviated}`

The key is looked up in the abbreviation dictionary of the current language.
If the second parameter is true, the abbreviated form is inserted instead of the expansion.
The inserted text keeps the language it is written in; unlike `\ipa` and `\trslit`,
    no secondary language is added.
";

pub const IPA_DOC: &str = r"Transcribe text into the International Phonetic Alphabet

Usage: `\ipa{text}`
";

pub const TRSLIT_DOC: &str = r"Transliterate text into the script of another language

Usage: `\trslit{target language|text}` or `\trslit{target language|text|syllable separator}`

The result is tagged with the current language and the target as its secondary language.
";

/// Get the `\abv` command.
pub fn get_abv() -> BuiltIn {
    BuiltIn::new(Kind::Abbreviation).with_doc(ABV_DOC)
}

/// Get the `\ipa` command.
pub fn get_ipa() -> BuiltIn {
    BuiltIn::new(Kind::IpaTranscribe).with_doc(IPA_DOC)
}

/// Get the `\trslit` command.
pub fn get_trslit() -> BuiltIn {
    BuiltIn::new(Kind::Transliterate).with_doc(TRSLIT_DOC)
}

pub(crate) fn execute_abv(
    name: &str,
    parameters: &mut [Inline],
    input: &mut ExecutionInput,
) -> psalter::Result<Outcome> {
    let (key, keep) = match &*parameters {
        [key] => (input.text(key), false),
        [key, keep] => {
            let keep_text = input.text(keep);
            match parse_bool(&keep_text) {
                Some(keep) => (input.text(key), keep),
                None => {
                    return Err(ArgumentError::new(
                        name,
                        format!["`{}` is not a boolean", keep_text.trim()],
                    )
                    .into())
                }
            }
        }
        _ => return Err(ArgumentError::count(name, "1 or 2", parameters.len()).into()),
    };
    let key = key.trim();
    let text = match input.analyzer()?.resolve_abbreviation(key, keep) {
        None => {
            return Err(DefinitionNotFoundError::new(key)
                .with_detail("the key is not in the abbreviation dictionary of the language")
                .into())
        }
        Some(text) => text,
    };
    Ok(output_run(text, input.language().cloned(), None))
}

pub(crate) fn execute_ipa(
    name: &str,
    parameters: &mut [Inline],
    input: &mut ExecutionInput,
) -> psalter::Result<Outcome> {
    let text = match &*parameters {
        [text] => input.normalized_text(text),
        _ => return Err(ArgumentError::count(name, "exactly 1", parameters.len()).into()),
    };
    let ipa = input.analyzer()?.ipa_transcribe(&text);
    Ok(output_run(
        ipa,
        input.language().cloned(),
        Some(LanguageInfo::new(KnownLanguage::Ipa)),
    ))
}

pub(crate) fn execute_trslit(
    name: &str,
    parameters: &mut [Inline],
    input: &mut ExecutionInput,
) -> psalter::Result<Outcome> {
    let (target, text, separator) = match &*parameters {
        [target, text] => (input.text(target), input.normalized_text(text), None),
        [target, text, separator] => (
            input.text(target),
            input.normalized_text(text),
            Some(input.text(separator)).filter(|s| !s.is_empty()),
        ),
        _ => return Err(ArgumentError::count(name, "2 or 3", parameters.len()).into()),
    };
    let target = match LanguageInfo::parse(&target) {
        None => {
            return Err(ArgumentError::new(
                name,
                format!["`{}` is not a language tag", target.trim()],
            )
            .into())
        }
        Some(target) => target,
    };
    let separator = separator.or_else(|| input.settings().syllable_separator.clone());
    let result = input
        .analyzer()?
        .transliterate(&text, &target, separator.as_deref());
    let result = match result {
        None => {
            let source = input
                .language()
                .map(|l| l.primary().to_string())
                .unwrap_or_default();
            return Err(UnsupportedLanguageError::new(source)
                .with_target(target.to_string())
                .into());
        }
        Some(result) => result,
    };
    Ok(output_run(result, input.language().cloned(), Some(target)))
}

/// Builds the output run.
///
/// With a target, the run is marked as written in the target's script:
///     the target becomes the secondary language if a language is set, and the
///     primary language otherwise.
fn output_run(
    text: String,
    language: Option<LanguageInfo>,
    target: Option<LanguageInfo>,
) -> Outcome {
    let language = match (language, target) {
        (Some(language), Some(target)) => Some(language.primary().with_secondary(target)),
        (None, Some(target)) => Some(target),
        (language, None) => language,
    };
    let mut run = Run::new(text);
    run.tags.language = language;
    run.tags.font = FontTag::Cleared;
    Output::Inline(Box::new(Inline::Run(run))).into()
}
