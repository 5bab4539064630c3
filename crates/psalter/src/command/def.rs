//! The `\def` command

use super::*;
use crate::definition::DefKind;
use crate::error::{ArgumentError, DefinitionNotFoundError};
use crate::inline::{FontTag, Run};

pub const DEF_DOC: &str = r"Insert the text of another definition

Usage: `\def{key}`

The key is looked up in the scope of the current document first, and then in the global scope.
If the definition holds text with commands in it, those commands are handled first.
If the definition is a multilingual value, the value for the current language is inserted;
    if there is no value for the language, the default value is used.
";

/// Get the `\def` command.
pub fn get_def() -> BuiltIn {
    BuiltIn::new(Kind::Definition).with_doc(DEF_DOC)
}

pub(crate) fn execute_def(
    name: &str,
    parameters: &mut [Inline],
    input: &mut ExecutionInput,
) -> psalter::Result<Outcome> {
    let key = match &*parameters {
        [key] => input.text(key),
        _ => return Err(ArgumentError::count(name, "exactly 1", parameters.len()).into()),
    };
    let key = key.trim();
    let target = input.lookup(key)?;
    input.register_reference(target);
    if let DefKind::Translations(runs) = input.context().definition(target).kind() {
        let run = select_run(runs, input.language(), input.settings().equivalence);
        return match run {
            Some(run) => Ok(Output::Inline(Box::new(Inline::Run(run))).into()),
            None => Err(DefinitionNotFoundError::new(key)
                .with_detail(format![
                    "the definition has no value for language `{}` and no default value",
                    input
                        .language()
                        .map(LanguageInfo::to_string)
                        .unwrap_or_else(|| "default".into())
                ])
                .into()),
        };
    }
    input.handle_commands(target)?;
    log::debug!("\\{name}{{{key}}} resolved to definition {target}");
    Ok(Output::Definition(target).into())
}

/// Selects the run of a multilingual value for a language.
///
/// The selected run is Unicode unless it names its own font.
pub(crate) fn select_run(
    runs: &crate::translation::TranslationRunCollection,
    language: Option<&LanguageInfo>,
    equivalence: crate::language::Equivalence,
) -> Option<Run> {
    let run = match language {
        None => runs.get_by_language(crate::language::KnownLanguage::Default),
        Some(language) => runs.get_by_language_info(language, equivalence),
    };
    run.map(|run| {
        let mut run = run.clone();
        if run.tags.font == FontTag::Inherit {
            run.tags.font = FontTag::Cleared;
        }
        run
    })
}
