//! The `\footnote` command

use super::*;
use crate::error::ArgumentError;
use crate::inline::{FontTag, Run, Span};

pub const FOOTNOTE_DOC: &str = r"Number a footnote

Usage: `\footnote{body}` or `\footnote{annotated text|body}`

Footnotes are numbered from 1 in the order they are executed, per document.
The command renders as the annotated text followed by the mark `[n]`;
    the body is added to the document's list of footnotes.
";

/// Get the `\footnote` command.
pub fn get_footnote() -> BuiltIn {
    BuiltIn::new(Kind::Footnote).with_doc(FOOTNOTE_DOC)
}

pub(crate) fn execute_footnote(
    name: &str,
    parameters: &mut [Inline],
    input: &mut ExecutionInput,
) -> psalter::Result<Outcome> {
    let (annotated, body) = match &*parameters {
        [body] => (None, body),
        [annotated, body] => (Some(annotated), body),
        _ => return Err(ArgumentError::count(name, "1 or 2", parameters.len()).into()),
    };
    let number = input.next_footnote_number();
    let mut mark = Run::new(format!["[{number}]"]);
    mark.tags.font = FontTag::Cleared;
    let mut inlines: Vec<Inline> = annotated.into_iter().cloned().collect();
    inlines.push(Inline::Run(mark));
    // The body leaves its owner, so it carries the owner's tags with it.
    let mut body = Span::new(vec![body.clone()]);
    body.tags = input.tags().clone();
    log::debug!("footnote [{number}] in definition {}", input.owner());
    Ok(Outcome {
        output: Output::Inline(Box::new(Inline::Span(Span::new(inlines)))),
        footnote: Some(FootnoteInline {
            number,
            body: Box::new(Inline::Span(body)),
        }),
    })
}
