//! Psalter commands.
//!
//! The set of commands is closed: every command is one of the variants of [`Kind`].
//! The parser resolves names to kinds through a [`Map`] while it parses,
//!     so an unknown name is reported before anything executes.
//!
//! A command is executed at most once.
//! Unless the command says otherwise, its parameters are resolved
//!     (that is, the commands inside them are executed) before the command itself runs.
//! The ternary and language commands resolve their own parameters:
//!     the ternary only ever resolves the branch it selects.

use std::collections::HashMap;

use crate::analyzer::Analyzer;
use crate::context::Context;
use crate::definition::{DefId, DocId};
use crate::error;
use crate::inline::{FootnoteInline, Inline, InlineCommand, Output, Tags};
use crate::language::LanguageInfo;
use crate::prelude as psalter;
use crate::resolve::Scope;
use crate::settings::Settings;

pub mod conditional;
pub mod def;
pub mod footnote;
pub mod language;
pub mod lines;
pub mod linguistic;
mod map;

pub use map::Map;

/// The kinds of command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Definition,
    Boolean,
    Ternary,
    Lines,
    Footnote,
    Abbreviation,
    IpaTranscribe,
    Transliterate,
    Language,
}

impl Kind {
    /// Whether the command resolves its parameters itself.
    pub fn resolves_own_parameters(self) -> bool {
        matches!(self, Kind::Ternary | Kind::Language)
    }
}

/// A built-in command: a kind plus documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltIn {
    kind: Kind,
    doc: Option<&'static str>,
}

impl BuiltIn {
    pub fn new(kind: Kind) -> BuiltIn {
        BuiltIn { kind, doc: None }
    }

    /// Set the doc for this built-in command.
    pub fn with_doc(mut self, doc: &'static str) -> BuiltIn {
        self.doc = Some(doc);
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }
}

/// Returns all of the built-in commands, keyed by name.
///
/// Aliases appear as separate entries.
pub fn built_ins() -> HashMap<&'static str, BuiltIn> {
    HashMap::from([
        ("def", def::get_def()),
        ("true", conditional::get_true()),
        ("false", conditional::get_false()),
        ("ternary", conditional::get_ternary()),
        ("if", conditional::get_ternary()),
        ("lines", lines::get_lines()),
        ("footnote", footnote::get_footnote()),
        ("abv", linguistic::get_abv()),
        ("abbreviation", linguistic::get_abv()),
        ("ipa", linguistic::get_ipa()),
        ("trslit", linguistic::get_trslit()),
        ("transliterate", linguistic::get_trslit()),
        ("language", language::get_language()),
        ("lang", language::get_language()),
    ])
}

/// What executing a command produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub output: Output,
    pub footnote: Option<FootnoteInline>,
}

impl From<Output> for Outcome {
    fn from(output: Output) -> Self {
        Outcome {
            output,
            footnote: None,
        }
    }
}

/// Input to a command's execution.
///
/// This gives the command access to the context, to the node the command
///     appears in, and to the tags in effect at the command.
pub struct ExecutionInput<'a> {
    context: &'a mut Context,
    scope: &'a mut Scope,
    tags: Tags,
}

impl<'a> ExecutionInput<'a> {
    pub(crate) fn new(context: &'a mut Context, scope: &'a mut Scope, tags: Tags) -> Self {
        ExecutionInput {
            context,
            scope,
            tags,
        }
    }

    pub fn context(&self) -> &Context {
        self.context
    }

    pub fn settings(&self) -> &Settings {
        self.context.settings()
    }

    /// The tags in effect at the command.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// The language in effect at the command.
    pub fn language(&self) -> Option<&LanguageInfo> {
        self.tags.language.as_ref()
    }

    /// The node whose text contains the command.
    pub fn owner(&self) -> DefId {
        self.scope.owner
    }

    /// The document the owning node belongs to.
    pub fn doc(&self) -> Option<DocId> {
        self.scope.doc
    }

    /// Executes all commands in the inline, using the tags in effect at the command.
    pub fn resolve(&mut self, inline: &mut Inline) -> psalter::Result<()> {
        let tags = self.tags.clone();
        self.resolve_with(inline, &tags)
    }

    /// Executes all commands in the inline, using the given tags as the enclosing tags.
    pub fn resolve_with(&mut self, inline: &mut Inline, tags: &Tags) -> psalter::Result<()> {
        self.context.execute_inline(self.scope, inline, tags)
    }

    /// Handles the commands of another definition.
    pub fn handle_commands(&mut self, id: DefId) -> psalter::Result<()> {
        self.context.handle_commands(id)
    }

    /// The text the inline currently renders as.
    pub fn text(&self, inline: &Inline) -> String {
        self.context.inline_text(inline)
    }

    /// The text the inline renders as, with legacy fonts converted to Unicode.
    pub fn normalized_text(&self, inline: &Inline) -> String {
        self.context.normalized_inline_text(inline, &self.tags)
    }

    pub fn try_lookup(&self, key: &str) -> Option<DefId> {
        self.context.try_lookup_definition(key, self.scope.doc)
    }

    pub fn lookup(&self, key: &str) -> psalter::Result<DefId> {
        self.context.lookup_definition(key, self.scope.doc)
    }

    /// Records that the owning node consumed the target.
    pub fn register_reference(&mut self, target: DefId) {
        self.context.register_reference(target, self.scope.owner);
    }

    /// The analyzer for the language in effect at the command.
    pub fn analyzer(&self) -> psalter::Result<&dyn Analyzer> {
        let language = match &self.tags.language {
            None => return Err(error::UnsupportedLanguageError::new("und").into()),
            Some(language) => language,
        };
        match self.context.analyzer(language.known()) {
            None => Err(error::UnsupportedLanguageError::new(language.primary().to_string()).into()),
            Some(analyzer) => Ok(analyzer),
        }
    }

    /// Returns the next footnote number of the owning node's document.
    pub fn next_footnote_number(&mut self) -> u32 {
        self.context.next_footnote_number(self.scope.doc)
    }

    pub(crate) fn context_mut(&mut self) -> &mut Context {
        self.context
    }
}

/// Executes a command that has not been executed yet.
pub(crate) fn execute(
    command: &mut InlineCommand,
    mut input: ExecutionInput,
) -> psalter::Result<Outcome> {
    let kind = command.kind;
    if !kind.resolves_own_parameters() {
        for parameter in &mut command.parameters {
            input.resolve(parameter)?;
        }
    }
    let name = command.name.as_str();
    let parameters = &mut command.parameters;
    log::trace!("executing \\{name} with {} parameters", parameters.len());
    match kind {
        Kind::Definition => def::execute_def(name, parameters, &mut input),
        Kind::Boolean => conditional::execute_boolean(name, &mut input),
        Kind::Ternary => conditional::execute_ternary(name, parameters, &mut input),
        Kind::Lines => lines::execute_lines(name, parameters, &mut input),
        Kind::Footnote => footnote::execute_footnote(name, parameters, &mut input),
        Kind::Abbreviation => linguistic::execute_abv(name, parameters, &mut input),
        Kind::IpaTranscribe => linguistic::execute_ipa(name, parameters, &mut input),
        Kind::Transliterate => linguistic::execute_trslit(name, parameters, &mut input),
        Kind::Language => language::execute_language(name, parameters, &mut input),
    }
}

/// Converts text to a boolean: `true` and `false` in any case, or an integer where non-zero is true.
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        text.parse::<i64>().ok().map(|i| i != 0)
    }
}
