//! The two resolution passes.
//!
//! Both passes are driven by the caller, one node at a time, and recurse depth-first
//!     into whatever the node depends on.
//! A node that fails stays in the state it was in before the pass.

use crate::command::{self, ExecutionInput};
use crate::context::Context;
use crate::definition::{DefId, DefKind, DocId, Resolution};
use crate::error::{DepthExceededError, Error, OrderingError, PropagationContext};
use crate::font;
use crate::inline::{Evaluation, FontTag, FootnoteInline, Inline, InlineCommand, Output, Tags};
use crate::parse;
use crate::prelude as psalter;

/// The node whose text is being resolved.
pub(crate) struct Scope {
    pub(crate) owner: DefId,
    pub(crate) doc: Option<DocId>,
    // Footnotes produced while resolving the node; routed to the document if the node succeeds.
    footnotes: Vec<FootnoteInline>,
}

impl Context {
    /// Runs the command pass on a node.
    ///
    /// Stanzas and paragraphs parse their source and execute every command in it.
    /// Sections handle their title and all of their children, returning the first error.
    /// Part references look up and handle their target.
    /// Calling this again after it succeeded does nothing.
    pub fn handle_commands(&mut self, id: DefId) -> psalter::Result<()> {
        self.enter()?;
        let result = self.handle_commands_impl(id);
        self.depth -= 1;
        result.map_err(|err| {
            Error::new_propagated(
                PropagationContext::Commands {
                    node: id,
                    key: self.definitions[id.index()].key.clone(),
                },
                err,
            )
        })
    }

    fn handle_commands_impl(&mut self, id: DefId) -> psalter::Result<()> {
        let definition = &self.definitions[id.index()];
        match &definition.kind {
            DefKind::Stanza(content) | DefKind::Paragraph(content) => {
                if content.commands_handled() {
                    return Ok(());
                }
                let source = content.source().to_string();
                let inlines = self.resolve_source(id, &source)?;
                if let DefKind::Stanza(content) | DefKind::Paragraph(content) =
                    &mut self.definitions[id.index()].kind
                {
                    content.set_commands_resolved(inlines);
                }
                log::debug!("handled commands in definition {id}");
                Ok(())
            }
            DefKind::Section(section) => {
                let title = section
                    .title
                    .as_ref()
                    .filter(|title| !title.commands_handled())
                    .map(|title| title.source().to_string());
                let children = section.children.clone();
                let mut first_error: Option<Box<Error>> = None;
                if let Some(source) = title {
                    match self.resolve_source(id, &source) {
                        Ok(inlines) => {
                            if let DefKind::Section(section) = &mut self.definitions[id.index()].kind {
                                if let Some(title) = &mut section.title {
                                    title.set_commands_resolved(inlines);
                                }
                            }
                        }
                        Err(err) => {
                            first_error.get_or_insert(err);
                        }
                    }
                }
                for child in children {
                    if let Err(err) = self.handle_commands(child) {
                        first_error.get_or_insert(err);
                    }
                }
                match first_error {
                    None => Ok(()),
                    Some(err) => Err(err),
                }
            }
            DefKind::PartReference(reference) => {
                let target = match reference.target {
                    Some(target) => target,
                    None => {
                        let key = reference.target_key.clone();
                        let target = self.lookup_definition(&key, definition.doc)?;
                        self.register_reference(target, id);
                        if let DefKind::PartReference(reference) =
                            &mut self.definitions[id.index()].kind
                        {
                            reference.target = Some(target);
                        }
                        log::debug!("part reference {id} resolved `{key}` to {target}");
                        target
                    }
                };
                self.handle_commands(target)
            }
            DefKind::Boolean(_) | DefKind::Integer(_) | DefKind::Translations(_) => Ok(()),
        }
    }

    /// Parses source text owned by a node and executes its commands.
    fn resolve_source(&mut self, owner: DefId, source: &str) -> psalter::Result<Vec<Inline>> {
        let mut inlines = parse::parse(source, &self.commands)?;
        let tags = self.effective_tags(owner);
        let mut scope = Scope {
            owner,
            doc: self.definitions[owner.index()].doc,
            footnotes: vec![],
        };
        for inline in &mut inlines {
            self.execute_inline(&mut scope, inline, &tags)?;
        }
        self.route_footnotes(scope.doc, scope.footnotes);
        Ok(inlines)
    }

    /// Executes every pending command in an inline.
    pub(crate) fn execute_inline(
        &mut self,
        scope: &mut Scope,
        inline: &mut Inline,
        enclosing: &Tags,
    ) -> psalter::Result<()> {
        match inline {
            Inline::Run(_) => Ok(()),
            Inline::Span(span) => {
                let tags = span.tags.inherit(enclosing);
                for inline in &mut span.inlines {
                    self.execute_inline(scope, inline, &tags)?;
                }
                Ok(())
            }
            Inline::Command(command) => self.execute_command(scope, command, enclosing),
        }
    }

    fn execute_command(
        &mut self,
        scope: &mut Scope,
        command: &mut InlineCommand,
        enclosing: &Tags,
    ) -> psalter::Result<()> {
        if command.is_evaluated() {
            return Ok(());
        }
        let tags = command.tags.inherit(enclosing);
        let outcome = command::execute(command, ExecutionInput::new(self, scope, tags))
            .map_err(|err| {
                Error::new_propagated(
                    PropagationContext::Command {
                        name: command.name.clone(),
                    },
                    err,
                )
            })?;
        if let Some(footnote) = &outcome.footnote {
            scope.footnotes.push(footnote.clone());
        }
        command.evaluation = Evaluation::Evaluated {
            output: outcome.output,
            footnote: outcome.footnote,
        };
        Ok(())
    }

    /// Runs the font pass on a node.
    ///
    /// Text in a legacy font is converted to Unicode, except text that carries a
    ///     secondary (transliteration) language.
    /// The commands of the node must have been handled; otherwise this is an ordering error.
    /// Calling this again after it succeeded does nothing.
    pub fn handle_font(&mut self, id: DefId) -> psalter::Result<()> {
        self.enter()?;
        let result = self.handle_font_impl(id);
        self.depth -= 1;
        result.map_err(|err| {
            Error::new_propagated(
                PropagationContext::Font {
                    node: id,
                    key: self.definitions[id.index()].key.clone(),
                },
                err,
            )
        })
    }

    fn handle_font_impl(&mut self, id: DefId) -> psalter::Result<()> {
        match &self.definitions[id.index()].kind {
            DefKind::Stanza(content) | DefKind::Paragraph(content) => {
                let targets = match content.resolution() {
                    Resolution::Unparsed(_) => return Err(OrderingError { node: id }.into()),
                    Resolution::FullyResolved(_) => return Ok(()),
                    Resolution::CommandsResolved(resolved) => definition_targets(resolved.inlines()),
                };
                for target in targets {
                    self.handle_font(target)?;
                }
                self.remap_content(id, false);
                log::debug!("remapped fonts in definition {id}");
                Ok(())
            }
            DefKind::Section(section) => {
                let children = section.children.clone();
                let mut first_error: Option<Box<Error>> = None;
                if let Some(title) = &section.title {
                    match title.resolution() {
                        Resolution::Unparsed(_) => {
                            first_error.get_or_insert(OrderingError { node: id }.into());
                        }
                        Resolution::FullyResolved(_) => {}
                        Resolution::CommandsResolved(resolved) => {
                            for target in definition_targets(resolved.inlines()) {
                                if let Err(err) = self.handle_font(target) {
                                    first_error.get_or_insert(err);
                                }
                            }
                            if first_error.is_none() {
                                self.remap_content(id, true);
                            }
                        }
                    }
                }
                for child in children {
                    if let Err(err) = self.handle_font(child) {
                        first_error.get_or_insert(err);
                    }
                }
                match first_error {
                    None => Ok(()),
                    Some(err) => Err(err),
                }
            }
            DefKind::PartReference(reference) => match reference.target {
                None => Err(OrderingError { node: id }.into()),
                Some(target) => self.handle_font(target),
            },
            DefKind::Boolean(_) | DefKind::Integer(_) | DefKind::Translations(_) => Ok(()),
        }
    }

    /// Advances the content of a node, or the title of a section, to fully resolved.
    fn remap_content(&mut self, id: DefId, is_title: bool) {
        let tags = self.effective_tags(id);
        let doc = self.definitions[id.index()].doc;
        let footnotes = {
            let Context {
                definitions, fonts, ..
            } = &mut *self;
            let content = match &mut definitions[id.index()].kind {
                DefKind::Stanza(content) | DefKind::Paragraph(content) if !is_title => content,
                DefKind::Section(section) if is_title => match &mut section.title {
                    Some(title) => title,
                    None => return,
                },
                _ => return,
            };
            content.advance_font(|inline| remap_inline(fonts, inline, &tags));
            footnotes_in(content.inlines())
        };
        if !footnotes.is_empty() {
            self.reroute_footnotes(doc, footnotes);
        }
    }

    fn enter(&mut self) -> psalter::Result<()> {
        if let Some(max_depth) = self.settings().max_resolution_depth {
            if self.depth >= max_depth {
                return Err(DepthExceededError { max_depth }.into());
            }
        }
        self.depth += 1;
        Ok(())
    }
}

/// The definitions that command outputs in the inlines point to.
fn definition_targets(inlines: &[Inline]) -> Vec<DefId> {
    let mut targets = vec![];
    for inline in inlines {
        inline.visit(&mut |inline| {
            if let Inline::Command(command) = inline {
                if let Some(Output::Definition(id)) = command.output() {
                    targets.push(*id);
                }
            }
        });
    }
    targets
}

/// The footnotes produced by the commands in the inlines.
fn footnotes_in(inlines: &[Inline]) -> Vec<FootnoteInline> {
    let mut footnotes = vec![];
    for inline in inlines {
        inline.visit(&mut |inline| {
            if let Inline::Command(command) = inline {
                if let Evaluation::Evaluated {
                    footnote: Some(footnote),
                    ..
                } = &command.evaluation
                {
                    footnotes.push(footnote.clone());
                }
            }
        });
    }
    footnotes
}

/// Converts the runs of an inline that are in a legacy font.
///
/// A converted run is Unicode, so its font tag is cleared.
/// A run in a transliterated language is left alone but its font tag is cleared too.
fn remap_inline(fonts: &font::Registry, inline: &mut Inline, enclosing: &Tags) {
    match inline {
        Inline::Run(run) => {
            let tags = run.tags.inherit(enclosing);
            if tags.is_transliterated() {
                run.tags.font = FontTag::Cleared;
            } else if let Some(font) = tags.font_name() {
                log::trace!("remapping {:?} from font `{font}`", run.text);
                run.text = fonts.convert(font, &run.text);
                run.tags.font = FontTag::Cleared;
            }
        }
        Inline::Span(span) => {
            let tags = span.tags.inherit(enclosing);
            for inline in &mut span.inlines {
                remap_inline(fonts, inline, &tags);
            }
        }
        Inline::Command(command) => {
            let tags = command.tags.inherit(enclosing);
            for parameter in &mut command.parameters {
                remap_inline(fonts, parameter, &tags);
            }
            if let Evaluation::Evaluated { output, footnote } = &mut command.evaluation {
                if let Output::Inline(output) = output {
                    remap_inline(fonts, output, &tags);
                }
                if let Some(footnote) = footnote {
                    remap_inline(fonts, &mut footnote.body, &tags);
                }
            }
        }
    }
}
