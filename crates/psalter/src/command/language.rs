//! The `\language` command

use super::*;
use crate::error::ArgumentError;
use crate::inline::Span;

pub const LANGUAGE_DOC: &str = r"Tag text with a language

Usage: `\language{tag|text}`

Commands in the text run with the given language in effect,
    so for example `\ipa` uses the analyzer of that language.
";

/// Get the `\language` command.
pub fn get_language() -> BuiltIn {
    BuiltIn::new(Kind::Language).with_doc(LANGUAGE_DOC)
}

pub(crate) fn execute_language(
    name: &str,
    parameters: &mut [Inline],
    input: &mut ExecutionInput,
) -> psalter::Result<Outcome> {
    let count = parameters.len();
    let (tag, text) = match parameters {
        [tag, text] => (tag, text),
        _ => return Err(ArgumentError::count(name, "exactly 2", count).into()),
    };
    input.resolve(tag)?;
    let tag = input.text(tag);
    let language = match LanguageInfo::parse(&tag) {
        None => {
            return Err(
                ArgumentError::new(name, format!["`{}` is not a language tag", tag.trim()]).into(),
            )
        }
        Some(language) => language,
    };
    let mut tags = input.tags().clone();
    tags.language = Some(language.clone());
    input.resolve_with(text, &tags)?;
    let mut span = Span::new(vec![text.clone()]);
    span.tags.language = Some(language);
    Ok(Output::Inline(Box::new(Inline::Span(span))).into())
}
