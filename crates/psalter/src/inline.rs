//! The parsed-text model.
//!
//! Source text is parsed into a sequence of [`Inline`]s:
//!     literal [`Run`]s, grouping [`Span`]s, and pending [`InlineCommand`]s.
//! Executing a command does not replace the command inline in the tree;
//!     instead the command records its output, and the output is what
//!     the text of the command inline renders as.
//!
//! Every inline carries [`Tags`]: an optional language and a font tag.
//! Tags that are not set are inherited from the enclosing inline, and ultimately
//!     from the definition that owns the text.

use crate::command;
use crate::definition::DefId;
use crate::language::LanguageInfo;
use crate::translation::Multilingual;

/// The font tag of an inline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontTag {
    /// Use the font of the enclosing element.
    #[default]
    Inherit,
    /// The text is encoded in this font.
    Named(String),
    /// The text is Unicode and must not be remapped, whatever the enclosing font.
    Cleared,
}

/// Language and font tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tags {
    pub language: Option<LanguageInfo>,
    pub font: FontTag,
}

impl Tags {
    pub fn new(language: Option<LanguageInfo>, font: FontTag) -> Tags {
        Tags { language, font }
    }

    /// Returns these tags with unset values taken from the enclosing tags.
    pub fn inherit(&self, enclosing: &Tags) -> Tags {
        Tags {
            language: self
                .language
                .clone()
                .or_else(|| enclosing.language.clone()),
            font: match &self.font {
                FontTag::Inherit => enclosing.font.clone(),
                other => other.clone(),
            },
        }
    }

    /// The name of the font the text is encoded in, if any.
    pub fn font_name(&self) -> Option<&str> {
        match &self.font {
            FontTag::Named(name) => Some(name),
            FontTag::Inherit | FontTag::Cleared => None,
        }
    }

    /// Whether the text has been transliterated, i.e. carries a secondary language.
    pub fn is_transliterated(&self) -> bool {
        self.language
            .as_ref()
            .map(|l| l.secondary().is_some())
            .unwrap_or(false)
    }
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Run {
    pub text: String,
    pub tags: Tags,
}

impl Run {
    pub fn new<T: Into<String>>(text: T) -> Run {
        Run {
            text: text.into(),
            tags: Default::default(),
        }
    }

    pub fn with_language(mut self, language: LanguageInfo) -> Self {
        self.tags.language = Some(language);
        self
    }

    pub fn with_font<T: Into<String>>(mut self, font: T) -> Self {
        self.tags.font = FontTag::Named(font.into());
        self
    }
}

impl Multilingual for Run {
    fn language(&self) -> Option<&LanguageInfo> {
        self.tags.language.as_ref()
    }

    fn font(&self) -> Option<&str> {
        self.tags.font_name()
    }
}

/// An ordered group of inlines.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub inlines: Vec<Inline>,
    pub tags: Tags,
}

impl Span {
    pub fn new(inlines: Vec<Inline>) -> Span {
        Span {
            inlines,
            tags: Default::default(),
        }
    }
}

/// What an executed command renders as.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Output {
    /// A definition in the context; renders as that definition's text.
    Definition(DefId),
    /// One of the command's own parameters; renders as that parameter.
    Parameter(usize),
    /// An inline synthesized by the command.
    Inline(Box<Inline>),
}

/// A footnote produced by a command.
///
/// The command's output holds the footnote mark; the body is placed elsewhere by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootnoteInline {
    pub number: u32,
    pub body: Box<Inline>,
}

/// The evaluation state of a command.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Evaluation {
    #[default]
    Pending,
    Evaluated {
        output: Output,
        footnote: Option<FootnoteInline>,
    },
}

/// A command invocation found in source text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InlineCommand {
    /// The name as written in the source, without the backslash.
    pub name: String,
    pub kind: command::Kind,
    /// One inline per parameter, in source order.
    pub parameters: Vec<Inline>,
    pub tags: Tags,
    pub evaluation: Evaluation,
}

impl InlineCommand {
    pub fn new<T: Into<String>>(name: T, kind: command::Kind, parameters: Vec<Inline>) -> Self {
        InlineCommand {
            name: name.into(),
            kind,
            parameters,
            tags: Default::default(),
            evaluation: Evaluation::Pending,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self.evaluation, Evaluation::Evaluated { .. })
    }

    pub fn output(&self) -> Option<&Output> {
        match &self.evaluation {
            Evaluation::Pending => None,
            Evaluation::Evaluated { output, .. } => Some(output),
        }
    }

    pub fn footnote(&self) -> Option<&FootnoteInline> {
        match &self.evaluation {
            Evaluation::Pending => None,
            Evaluation::Evaluated { footnote, .. } => footnote.as_ref(),
        }
    }

    /// The markup this command was parsed from.
    pub fn source(&self) -> String {
        let mut s = format!["\\{}", self.name];
        if !self.parameters.is_empty() {
            s.push('{');
            for (i, parameter) in self.parameters.iter().enumerate() {
                if i > 0 {
                    s.push('|');
                }
                s.push_str(&parameter.source());
            }
            s.push('}');
        }
        s
    }
}

/// An element of parsed text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Inline {
    Run(Run),
    Span(Span),
    Command(InlineCommand),
}

impl Inline {
    pub fn run<T: Into<String>>(text: T) -> Inline {
        Inline::Run(Run::new(text))
    }

    pub fn tags(&self) -> &Tags {
        match self {
            Inline::Run(run) => &run.tags,
            Inline::Span(span) => &span.tags,
            Inline::Command(command) => &command.tags,
        }
    }

    pub fn tags_mut(&mut self) -> &mut Tags {
        match self {
            Inline::Run(run) => &mut run.tags,
            Inline::Span(span) => &mut span.tags,
            Inline::Command(command) => &mut command.tags,
        }
    }

    /// The markup this inline was parsed from.
    ///
    /// Executed commands are written back as their original markup.
    pub fn source(&self) -> String {
        match self {
            Inline::Run(run) => run.text.clone(),
            Inline::Span(span) => span.inlines.iter().map(Inline::source).collect(),
            Inline::Command(command) => command.source(),
        }
    }

    /// Visits this inline and all inlines nested in it, including parameters,
    ///     synthesized outputs and footnote bodies.
    pub fn visit<F: FnMut(&Inline)>(&self, f: &mut F) {
        f(self);
        match self {
            Inline::Run(_) => {}
            Inline::Span(span) => {
                for inline in &span.inlines {
                    inline.visit(f);
                }
            }
            Inline::Command(command) => {
                for parameter in &command.parameters {
                    parameter.visit(f);
                }
                if let Evaluation::Evaluated { output, footnote } = &command.evaluation {
                    if let Output::Inline(inline) = output {
                        inline.visit(f);
                    }
                    if let Some(footnote) = footnote {
                        footnote.body.visit(f);
                    }
                }
            }
        }
    }
}

impl From<Run> for Inline {
    fn from(run: Run) -> Self {
        Inline::Run(run)
    }
}

impl From<Span> for Inline {
    fn from(span: Span) -> Self {
        Inline::Span(span)
    }
}

impl From<InlineCommand> for Inline {
    fn from(command: InlineCommand) -> Self {
        Inline::Command(command)
    }
}
