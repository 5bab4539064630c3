//! The `\lines` command

use super::*;
use crate::definition::DefKind;
use crate::error::ArgumentError;
use crate::inline::{FontTag, Run, Span};

/// Key of the multilingual definition used when `\lines` is given an empty separator.
pub const DEFAULT_LINE_SEPARATOR_KEY: &str = "defaultLineSeparator";

pub const LINES_DOC: &str = r"Join lines with a separator

Usage: `\lines{separator|line 1|line 2|...}`

If the separator is empty, the `defaultLineSeparator` definition is used;
    if it is a multilingual value, the value for the current language is used.
If there is no such definition, the separator from the settings is used.
";

/// Get the `\lines` command.
pub fn get_lines() -> BuiltIn {
    BuiltIn::new(Kind::Lines).with_doc(LINES_DOC)
}

pub(crate) fn execute_lines(
    name: &str,
    parameters: &mut [Inline],
    input: &mut ExecutionInput,
) -> psalter::Result<Outcome> {
    let (separator, lines) = match parameters.split_first() {
        None => return Err(ArgumentError::count(name, "at least 1", 0).into()),
        Some(split) => split,
    };
    let separator = if input.text(separator).is_empty() {
        default_separator(input)?
    } else {
        separator.clone()
    };
    let mut inlines = Vec::with_capacity(lines.len() * 2);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            inlines.push(separator.clone());
        }
        inlines.push(line.clone());
    }
    Ok(Output::Inline(Box::new(Inline::Span(Span::new(inlines)))).into())
}

fn default_separator(input: &mut ExecutionInput) -> psalter::Result<Inline> {
    let target = match input.try_lookup(DEFAULT_LINE_SEPARATOR_KEY) {
        None => {
            let mut run = Run::new(input.settings().default_line_separator.clone());
            run.tags.font = FontTag::Cleared;
            return Ok(Inline::Run(run));
        }
        Some(target) => target,
    };
    input.register_reference(target);
    if let DefKind::Translations(runs) = input.context().definition(target).kind() {
        if let Some(run) = def::select_run(runs, input.language(), input.settings().equivalence) {
            return Ok(Inline::Run(run));
        }
        let mut run = Run::new(input.settings().default_line_separator.clone());
        run.tags.font = FontTag::Cleared;
        return Ok(Inline::Run(run));
    }
    input.handle_commands(target)?;
    // Converted here, since the font pass does not reach the separator's definition.
    let mut run = Run::new(input.context().normalized_text(target));
    run.tags.font = FontTag::Cleared;
    Ok(Inline::Run(run))
}
