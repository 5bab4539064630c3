//! The definition graph.
//!
//! Every node of every document is a [`Definition`] stored in the arena of a
//!     [`Context`](crate::Context) and addressed by a [`DefId`].
//! Ownership is top-down: a section owns its children, listed by id in order.
//! The links that point back up or across the graph
//!     (the parent, the owning document, the references) are plain ids
//!     and never keep anything alive.
//!
//! Nodes that hold text implement the content contract through [`Content`]:
//!     the source text plus the [`Resolution`] state of the two passes.

use std::fmt;

use crate::inline::{Inline, Run};
use crate::language::LanguageInfo;
use crate::translation::TranslationRunCollection;

/// Index of a definition in a context's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefId(usize);

impl DefId {
    pub fn new(index: usize) -> DefId {
        DefId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a document in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocId(usize);

impl DocId {
    pub(crate) fn new(index: usize) -> DocId {
        DocId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the definition graph.
#[derive(Debug, Clone)]
pub struct Definition {
    pub(crate) key: Option<String>,
    pub(crate) parent: Option<DefId>,
    pub(crate) doc: Option<DocId>,
    pub(crate) language: Option<LanguageInfo>,
    pub(crate) font: Option<String>,
    pub(crate) references: Vec<DefId>,
    pub(crate) kind: DefKind,
}

impl Definition {
    pub fn new(kind: DefKind) -> Definition {
        Definition {
            key: None,
            parent: None,
            doc: None,
            language: None,
            font: None,
            references: vec![],
            kind,
        }
    }

    pub fn with_key<T: Into<String>>(mut self, key: T) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_parent(mut self, parent: DefId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_language(mut self, language: LanguageInfo) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_font<T: Into<String>>(mut self, font: T) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn parent(&self) -> Option<DefId> {
        self.parent
    }

    pub fn doc(&self) -> Option<DocId> {
        self.doc
    }

    pub fn language(&self) -> Option<&LanguageInfo> {
        self.language.as_ref()
    }

    pub fn font(&self) -> Option<&str> {
        self.font.as_deref()
    }

    /// The nodes whose commands consumed this definition, in the order they did so.
    ///
    /// This list only ever grows.
    pub fn references(&self) -> &[DefId] {
        &self.references
    }

    pub fn kind(&self) -> &DefKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut DefKind {
        &mut self.kind
    }

    /// The body content of a stanza or paragraph.
    pub fn content(&self) -> Option<&Content> {
        match &self.kind {
            DefKind::Stanza(content) | DefKind::Paragraph(content) => Some(content),
            _ => None,
        }
    }
}

/// The variants of a definition.
#[derive(Debug, Clone)]
pub enum DefKind {
    Section(Section),
    Stanza(Content),
    Paragraph(Content),
    PartReference(PartReference),
    Boolean(bool),
    Integer(i64),
    /// A multilingual value.
    Translations(TranslationRunCollection),
}

impl DefKind {
    pub fn name(&self) -> &'static str {
        match self {
            DefKind::Section(_) => "section",
            DefKind::Stanza(_) => "stanza",
            DefKind::Paragraph(_) => "paragraph",
            DefKind::PartReference(_) => "part reference",
            DefKind::Boolean(_) => "boolean",
            DefKind::Integer(_) => "integer",
            DefKind::Translations(_) => "translations",
        }
    }
}

/// An ordered container of content parts with an optional title.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub(crate) title: Option<Content>,
    pub(crate) children: Vec<DefId>,
}

impl Section {
    pub fn new(title: Option<Content>) -> Section {
        Section {
            title,
            children: vec![],
        }
    }

    pub fn title(&self) -> Option<&Content> {
        self.title.as_ref()
    }

    pub fn children(&self) -> &[DefId] {
        &self.children
    }
}

/// Indirection to another content part, found by key when commands are handled.
#[derive(Debug, Clone)]
pub struct PartReference {
    pub(crate) target_key: String,
    pub(crate) target: Option<DefId>,
}

impl PartReference {
    pub fn new<T: Into<String>>(target_key: T) -> PartReference {
        PartReference {
            target_key: target_key.into(),
            target: None,
        }
    }

    pub fn target_key(&self) -> &str {
        &self.target_key
    }

    /// The resolved target, once commands have been handled.
    pub fn target(&self) -> Option<DefId> {
        self.target
    }
}

/// Parsed inlines of a node whose source has not been processed.
///
/// This is a single run holding the raw source.
#[derive(Debug, Clone, PartialEq)]
pub struct Unparsed {
    run: Inline,
}

/// Parsed inlines of a node whose commands have all been executed.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandsResolved {
    inlines: Vec<Inline>,
}

/// Parsed inlines of a node whose commands have been executed and whose fonts have been remapped.
#[derive(Debug, Clone, PartialEq)]
pub struct FullyResolved {
    inlines: Vec<Inline>,
}

impl CommandsResolved {
    pub(crate) fn new(inlines: Vec<Inline>) -> CommandsResolved {
        CommandsResolved { inlines }
    }

    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    /// Applies the font pass.
    ///
    /// This is the only way to obtain a [`FullyResolved`] value.
    pub(crate) fn remap<F: FnMut(&mut Inline)>(mut self, mut f: F) -> FullyResolved {
        for inline in &mut self.inlines {
            f(inline);
        }
        FullyResolved {
            inlines: self.inlines,
        }
    }
}

impl FullyResolved {
    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }
}

/// Where a content node is in its resolution.
///
/// ```text
/// Unparsed --(commands)--> CommandsResolved --(font)--> FullyResolved
/// ```
///
/// Assigning new source text returns the node to `Unparsed`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Unparsed(Unparsed),
    CommandsResolved(CommandsResolved),
    FullyResolved(FullyResolved),
}

impl Resolution {
    pub fn commands_handled(&self) -> bool {
        !matches!(self, Resolution::Unparsed(_))
    }

    pub fn font_handled(&self) -> bool {
        matches!(self, Resolution::FullyResolved(_))
    }
}

/// Source text and its resolution state.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    source: String,
    resolution: Resolution,
}

impl Content {
    pub fn new<T: Into<String>>(source: T) -> Content {
        let source = source.into();
        Content {
            resolution: Resolution::Unparsed(Unparsed {
                run: Inline::Run(Run::new(source.clone())),
            }),
            source,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replaces the source text and resets the node to unparsed.
    pub fn set_source<T: Into<String>>(&mut self, source: T) {
        *self = Content::new(source);
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn commands_handled(&self) -> bool {
        self.resolution.commands_handled()
    }

    pub fn font_handled(&self) -> bool {
        self.resolution.font_handled()
    }

    pub fn inlines(&self) -> &[Inline] {
        match &self.resolution {
            Resolution::Unparsed(unparsed) => std::slice::from_ref(&unparsed.run),
            Resolution::CommandsResolved(resolved) => resolved.inlines(),
            Resolution::FullyResolved(resolved) => resolved.inlines(),
        }
    }

    pub(crate) fn set_commands_resolved(&mut self, inlines: Vec<Inline>) {
        self.resolution = Resolution::CommandsResolved(CommandsResolved::new(inlines));
    }

    /// Runs the font pass transition if the node is in the `CommandsResolved` state.
    ///
    /// Returns false if the node is still unparsed.
    pub(crate) fn advance_font<F: FnMut(&mut Inline)>(&mut self, f: F) -> bool {
        let placeholder = Resolution::CommandsResolved(CommandsResolved::new(vec![]));
        match std::mem::replace(&mut self.resolution, placeholder) {
            unparsed @ Resolution::Unparsed(_) => {
                self.resolution = unparsed;
                false
            }
            Resolution::CommandsResolved(resolved) => {
                self.resolution = Resolution::FullyResolved(resolved.remap(f));
                true
            }
            fully @ Resolution::FullyResolved(_) => {
                self.resolution = fully;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_content_is_a_single_run() {
        let content = Content::new("Blessed are you");
        assert!(!content.commands_handled());
        assert!(!content.font_handled());
        assert_eq!(content.inlines(), &[Inline::run("Blessed are you")]);
    }

    #[test]
    fn set_source_resets() {
        let mut content = Content::new("a");
        content.set_commands_resolved(vec![Inline::run("x"), Inline::run("y")]);
        assert!(content.advance_font(|_| {}));
        assert!(content.font_handled());

        content.set_source("b");
        assert!(!content.commands_handled());
        assert!(!content.font_handled());
        assert_eq!(content.inlines(), &[Inline::run("b")]);
    }

    #[test]
    fn font_transition_requires_commands() {
        let mut content = Content::new("a");
        let mut calls = 0;
        assert!(!content.advance_font(|_| calls += 1));
        assert_eq!(calls, 0);
        assert!(!content.commands_handled());
    }

    #[test]
    fn font_transition_runs_once() {
        let mut content = Content::new("a");
        content.set_commands_resolved(vec![Inline::run("x")]);
        let mut calls = 0;
        assert!(content.advance_font(|_| calls += 1));
        assert!(content.advance_font(|_| calls += 1));
        assert_eq!(calls, 1);
    }
}
