//! The load context.
//!
//! A [`Context`] owns every definition of every document loaded into it,
//!     the global key scope, the command map, the fonts, the analyzers and the settings.
//! All resolution state is threaded through it by mutable reference.

use std::collections::HashMap;

use crate::analyzer::{Analyzer, TableAnalyzer};
use crate::command;
use crate::definition::{Content, DefId, DefKind, Definition, DocId, PartReference, Section};
use crate::error::DefinitionNotFoundError;
use crate::font;
use crate::inline::{FontTag, FootnoteInline, Inline, Output, Tags};
use crate::language::{KnownLanguage, LanguageInfo};
use crate::prelude as psalter;
use crate::settings::Settings;
use crate::translation::{Translation, TranslationCollection, TranslationRunCollection};

/// Footnote numbering and the footnotes routed so far.
#[derive(Debug, Clone, Default)]
struct Footnotes {
    counter: u32,
    routed: Vec<FootnoteInline>,
}

/// A document: metadata, translations and a key scope.
#[derive(Debug, Clone)]
pub struct Document {
    key: String,
    name: String,
    author: Option<String>,
    translations: TranslationCollection<Translation>,
    keys: HashMap<String, DefId>,
    footnotes: Footnotes,
}

impl Document {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn translations(&self) -> &TranslationCollection<Translation> {
        &self.translations
    }

    /// The footnotes of the document, in the order they were numbered.
    pub fn footnotes(&self) -> &[FootnoteInline] {
        &self.footnotes.routed
    }
}

/// The load context.
pub struct Context {
    pub(crate) definitions: Vec<Definition>,
    documents: Vec<Document>,
    global_keys: HashMap<String, DefId>,
    pub(crate) commands: command::Map,
    pub(crate) fonts: font::Registry,
    analyzers: HashMap<KnownLanguage, Box<dyn Analyzer>>,
    settings: Settings,
    // Footnotes of definitions that belong to no document.
    unscoped_footnotes: Footnotes,
    pub(crate) depth: usize,
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Default::default())
    }
}

impl Context {
    /// Returns a context with the built-in commands, fonts and analyzers.
    pub fn new(settings: Settings) -> Context {
        let mut context = Context {
            definitions: vec![],
            documents: vec![],
            global_keys: Default::default(),
            commands: Default::default(),
            fonts: font::Registry::with_built_ins(),
            analyzers: Default::default(),
            settings,
            unscoped_footnotes: Default::default(),
            depth: 0,
        };
        context.register_analyzer(KnownLanguage::Coptic, Box::new(TableAnalyzer::coptic()));
        context
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn commands(&self) -> &command::Map {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut command::Map {
        &mut self.commands
    }

    pub fn fonts(&self) -> &font::Registry {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut font::Registry {
        &mut self.fonts
    }

    /// Registers the analyzer for a source language, replacing any existing one.
    pub fn register_analyzer(&mut self, language: KnownLanguage, analyzer: Box<dyn Analyzer>) {
        self.analyzers.insert(language, analyzer);
    }

    pub fn analyzer(&self, language: KnownLanguage) -> Option<&dyn Analyzer> {
        self.analyzers.get(&language).map(Box::as_ref)
    }

    /// Returns the definition with the given id.
    ///
    /// Ids are only handed out by the context that owns the definition;
    ///     an id from another context may panic.
    pub fn definition(&self, id: DefId) -> &Definition {
        &self.definitions[id.index()]
    }

    pub fn get(&self, id: DefId) -> Option<&Definition> {
        self.definitions.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn document(&self, doc: DocId) -> &Document {
        &self.documents[doc.index()]
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, document)| (DocId::new(i), document))
    }

    // Builder API

    pub fn add_document<K: Into<String>, N: Into<String>>(&mut self, key: K, name: N) -> DocId {
        let doc = DocId::new(self.documents.len());
        self.documents.push(Document {
            key: key.into(),
            name: name.into(),
            author: None,
            translations: Default::default(),
            keys: Default::default(),
            footnotes: Default::default(),
        });
        doc
    }

    pub fn set_author<T: Into<String>>(&mut self, doc: DocId, author: T) {
        self.documents[doc.index()].author = Some(author.into());
    }

    /// Adds a translation to a document and returns its root section.
    pub fn add_translation(
        &mut self,
        doc: DocId,
        language: LanguageInfo,
        font: Option<&str>,
    ) -> DefId {
        let mut root = Definition::new(DefKind::Section(Section::default()))
            .with_language(language.clone());
        if let Some(font) = font {
            root = root.with_font(font);
        }
        let root = self.add_definition(root, Some(doc));
        self.documents[doc.index()].translations.push(Translation {
            language,
            font: font.map(str::to_string),
            root,
        });
        root
    }

    /// Returns the root section of the document's translation for a language.
    pub fn translation(&self, doc: DocId, language: &LanguageInfo) -> Option<DefId> {
        self.document(doc)
            .translations
            .get_by_language_info(language, self.settings.equivalence)
            .map(|translation| translation.root)
    }

    pub fn add_section(&mut self, parent: DefId, key: Option<&str>, title: Option<&str>) -> DefId {
        let section = Section::new(title.map(Content::new));
        self.add_child(parent, key, DefKind::Section(section))
    }

    pub fn add_stanza<T: Into<String>>(&mut self, parent: DefId, key: Option<&str>, source: T) -> DefId {
        self.add_child(parent, key, DefKind::Stanza(Content::new(source)))
    }

    pub fn add_paragraph<T: Into<String>>(
        &mut self,
        parent: DefId,
        key: Option<&str>,
        source: T,
    ) -> DefId {
        self.add_child(parent, key, DefKind::Paragraph(Content::new(source)))
    }

    pub fn add_part_reference<T: Into<String>>(
        &mut self,
        parent: DefId,
        key: Option<&str>,
        target_key: T,
    ) -> DefId {
        self.add_child(parent, key, DefKind::PartReference(PartReference::new(target_key)))
    }

    pub fn add_boolean<T: Into<String>>(&mut self, doc: Option<DocId>, key: T, value: bool) -> DefId {
        self.add_definition(Definition::new(DefKind::Boolean(value)).with_key(key), doc)
    }

    pub fn add_integer<T: Into<String>>(&mut self, doc: Option<DocId>, key: T, value: i64) -> DefId {
        self.add_definition(Definition::new(DefKind::Integer(value)).with_key(key), doc)
    }

    pub fn add_translations<T: Into<String>>(
        &mut self,
        doc: Option<DocId>,
        key: T,
        runs: TranslationRunCollection,
    ) -> DefId {
        self.add_definition(Definition::new(DefKind::Translations(runs)).with_key(key), doc)
    }

    /// Adds a stanza that belongs to no section.
    ///
    /// Its key, if any, is registered in the document's scope or the global scope.
    pub fn add_standalone_stanza<T: Into<String>>(
        &mut self,
        doc: Option<DocId>,
        key: Option<&str>,
        source: T,
    ) -> DefId {
        let mut definition = Definition::new(DefKind::Stanza(Content::new(source)));
        definition.key = key.map(str::to_string);
        self.add_definition(definition, doc)
    }

    fn add_child(&mut self, parent: DefId, key: Option<&str>, kind: DefKind) -> DefId {
        let doc = self.definition(parent).doc;
        let mut definition = Definition::new(kind).with_parent(parent);
        definition.key = key.map(str::to_string);
        let id = self.add_definition(definition, doc);
        match &mut self.definitions[parent.index()].kind {
            DefKind::Section(section) => section.children.push(id),
            other => log::warn!(
                "definition {id} added under {parent}, which is a {} and cannot have children",
                other.name()
            ),
        }
        id
    }

    /// Adds a definition to the arena and registers its key.
    ///
    /// The key goes in the document's scope if a document is given, and in the global scope otherwise.
    /// A key that is already registered in that scope is replaced.
    pub fn add_definition(&mut self, mut definition: Definition, doc: Option<DocId>) -> DefId {
        let id = DefId::new(self.definitions.len());
        definition.doc = doc;
        if let Some(key) = definition.key.clone() {
            let keys = match doc {
                None => &mut self.global_keys,
                Some(doc) => &mut self.documents[doc.index()].keys,
            };
            if let Some(previous) = keys.insert(key.clone(), id) {
                log::warn!("definition {id} replaces definition {previous} under the key `{key}`");
            }
        }
        self.definitions.push(definition);
        id
    }

    /// Reassigns the source text of a stanza, a paragraph or a section title.
    ///
    /// The node returns to the unparsed state.
    pub fn set_source_text<T: Into<String>>(&mut self, id: DefId, source: T) {
        match &mut self.definitions[id.index()].kind {
            DefKind::Stanza(content) | DefKind::Paragraph(content) => content.set_source(source),
            DefKind::Section(section) => match &mut section.title {
                Some(title) => title.set_source(source),
                None => section.title = Some(Content::new(source)),
            },
            other => log::warn!("cannot set the source text of {id}, a {}", other.name()),
        }
    }

    pub fn set_language(&mut self, id: DefId, language: LanguageInfo) {
        self.definitions[id.index()].language = Some(language);
    }

    pub fn set_font<T: Into<String>>(&mut self, id: DefId, font: T) {
        self.definitions[id.index()].font = Some(font.into());
    }

    // Lookup

    /// Looks up a key in the document's scope, then in the global scope.
    pub fn try_lookup_definition(&self, key: &str, doc: Option<DocId>) -> Option<DefId> {
        doc.and_then(|doc| self.documents[doc.index()].keys.get(key))
            .or_else(|| self.global_keys.get(key))
            .copied()
    }

    pub fn lookup_definition(&self, key: &str, doc: Option<DocId>) -> psalter::Result<DefId> {
        match self.try_lookup_definition(key, doc) {
            Some(id) => Ok(id),
            None => Err(DefinitionNotFoundError::new(key).into()),
        }
    }

    /// Records that `referencing` consumed `definition` through a command.
    pub fn register_reference(&mut self, definition: DefId, referencing: DefId) {
        log::trace!("definition {definition} referenced by {referencing}");
        self.definitions[definition.index()]
            .references
            .push(referencing);
    }

    pub fn references(&self, id: DefId) -> &[DefId] {
        &self.definitions[id.index()].references
    }

    /// The language and font in effect at a definition, inherited along the parent chain.
    pub fn effective_tags(&self, id: DefId) -> Tags {
        let mut language: Option<LanguageInfo> = None;
        let mut font: Option<String> = None;
        let mut next = Some(id);
        while let Some(id) = next {
            let definition = &self.definitions[id.index()];
            if language.is_none() {
                language = definition.language.clone();
            }
            if font.is_none() {
                font = definition.font.clone();
            }
            if language.is_some() && font.is_some() {
                break;
            }
            next = definition.parent;
        }
        Tags::new(language, font.map(FontTag::Named).unwrap_or_default())
    }

    // Footnotes

    pub(crate) fn next_footnote_number(&mut self, doc: Option<DocId>) -> u32 {
        let footnotes = self.footnotes_mut(doc);
        footnotes.counter += 1;
        footnotes.counter
    }

    pub(crate) fn route_footnotes(&mut self, doc: Option<DocId>, footnotes: Vec<FootnoteInline>) {
        self.footnotes_mut(doc).routed.extend(footnotes);
    }

    /// Replaces routed footnotes with the same numbers, once the font pass has converted them.
    pub(crate) fn reroute_footnotes(&mut self, doc: Option<DocId>, footnotes: Vec<FootnoteInline>) {
        let routed = &mut self.footnotes_mut(doc).routed;
        for footnote in footnotes {
            if let Some(slot) = routed.iter_mut().find(|f| f.number == footnote.number) {
                *slot = footnote;
            }
        }
    }

    fn footnotes_mut(&mut self, doc: Option<DocId>) -> &mut Footnotes {
        match doc {
            None => &mut self.unscoped_footnotes,
            Some(doc) => &mut self.documents[doc.index()].footnotes,
        }
    }

    /// The footnotes routed to a document, or to no document, in the order they were numbered.
    pub fn footnotes(&self, doc: Option<DocId>) -> &[FootnoteInline] {
        match doc {
            None => &self.unscoped_footnotes.routed,
            Some(doc) => &self.documents[doc.index()].footnotes.routed,
        }
    }

    // Consumption

    /// The text of a definition.
    ///
    /// Content whose commands have not been handled renders as its source.
    pub fn text(&self, id: DefId) -> String {
        self.render_definition(id, false)
    }

    /// The text of a definition with legacy fonts converted to Unicode.
    pub fn normalized_text(&self, id: DefId) -> String {
        self.render_definition(id, true)
    }

    /// The text an inline renders as.
    pub fn inline_text(&self, inline: &Inline) -> String {
        let mut s = String::new();
        self.render_inline(inline, &Tags::default(), false, &mut s);
        s
    }

    /// The text an inline renders as with legacy fonts converted,
    ///     given the tags in effect around the inline.
    pub fn normalized_inline_text(&self, inline: &Inline, enclosing: &Tags) -> String {
        let mut s = String::new();
        self.render_inline(inline, enclosing, true, &mut s);
        s
    }

    fn render_definition(&self, id: DefId, normalize: bool) -> String {
        let definition = &self.definitions[id.index()];
        match &definition.kind {
            DefKind::Stanza(content) | DefKind::Paragraph(content) => {
                self.render_content(content, &self.effective_tags(id), normalize)
            }
            DefKind::Section(section) => {
                let tags = self.effective_tags(id);
                let mut parts: Vec<String> = vec![];
                if let Some(title) = &section.title {
                    parts.push(self.render_content(title, &tags, normalize));
                }
                for child in &section.children {
                    parts.push(self.render_definition(*child, normalize));
                }
                parts.join("\n")
            }
            DefKind::PartReference(reference) => reference
                .target
                .map(|target| self.render_definition(target, normalize))
                .unwrap_or_default(),
            DefKind::Boolean(value) => value.to_string(),
            DefKind::Integer(value) => value.to_string(),
            DefKind::Translations(runs) => runs
                .get_by_language(KnownLanguage::Default)
                .or_else(|| runs.iter().next())
                .map(|run| {
                    let mut s = String::new();
                    self.render_inline(&Inline::Run(run.clone()), &Tags::default(), normalize, &mut s);
                    s
                })
                .unwrap_or_default(),
        }
    }

    fn render_content(&self, content: &Content, tags: &Tags, normalize: bool) -> String {
        let mut s = String::new();
        if !content.commands_handled() {
            match tags.font_name() {
                Some(font) if normalize && !tags.is_transliterated() => {
                    s.push_str(&self.fonts.convert(font, content.source()))
                }
                _ => s.push_str(content.source()),
            }
            return s;
        }
        for inline in content.inlines() {
            self.render_inline(inline, tags, normalize, &mut s);
        }
        s
    }

    fn render_inline(&self, inline: &Inline, enclosing: &Tags, normalize: bool, s: &mut String) {
        match inline {
            Inline::Run(run) => {
                let tags = run.tags.inherit(enclosing);
                match tags.font_name() {
                    Some(font) if normalize && !tags.is_transliterated() => {
                        s.push_str(&self.fonts.convert(font, &run.text))
                    }
                    _ => s.push_str(&run.text),
                }
            }
            Inline::Span(span) => {
                let tags = span.tags.inherit(enclosing);
                for inline in &span.inlines {
                    self.render_inline(inline, &tags, normalize, s);
                }
            }
            Inline::Command(command) => {
                let tags = command.tags.inherit(enclosing);
                match command.output() {
                    None => s.push_str(&command.source()),
                    Some(Output::Definition(id)) => {
                        s.push_str(&self.render_definition(*id, normalize))
                    }
                    Some(Output::Parameter(i)) => {
                        if let Some(parameter) = command.parameters.get(*i) {
                            self.render_inline(parameter, &tags, normalize, s);
                        }
                    }
                    Some(Output::Inline(output)) => self.render_inline(output, &tags, normalize, s),
                }
            }
        }
    }

    /// The number of rows a definition occupies: one per stanza or paragraph,
    ///     plus one per section title.
    ///
    /// This is recomputed on every call.
    pub fn count_rows(&self, id: DefId) -> usize {
        match &self.definitions[id.index()].kind {
            DefKind::Stanza(_) | DefKind::Paragraph(_) => 1,
            DefKind::Section(section) => {
                usize::from(section.title.is_some())
                    + section
                        .children
                        .iter()
                        .map(|child| self.count_rows(*child))
                        .sum::<usize>()
            }
            DefKind::PartReference(reference) => reference
                .target
                .map(|target| self.count_rows(target))
                .unwrap_or(0),
            DefKind::Boolean(_) | DefKind::Integer(_) | DefKind::Translations(_) => 0,
        }
    }

    /// Runs both passes over every translation of a document.
    ///
    /// Every translation is attempted; the first error is returned.
    pub fn resolve_document(&mut self, doc: DocId) -> psalter::Result<()> {
        let roots: Vec<DefId> = self.documents[doc.index()]
            .translations
            .iter()
            .map(|translation| translation.root)
            .collect();
        let mut first_error = None;
        for root in roots {
            let result = self
                .handle_commands(root)
                .and_then(|()| self.handle_font(root));
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        }
        log::debug!(
            "resolved document `{}`",
            self.documents[doc.index()].key
        );
        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("definitions", &self.definitions.len())
            .field("documents", &self.documents.len())
            .field("settings", &self.settings)
            .finish()
    }
}
