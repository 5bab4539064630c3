//! Error handling
//!
//! Errors in Psalter are values of types implementing the [`PsalterError`] trait.
//! When an error is returned from a command or from the resolution of a node,
//!     it is boxed into an [`Error`].
//! As the error passes back up through the resolution of enclosing nodes and commands
//!     it is wrapped in [`PropagatedError`]s that record what was being resolved.
//! The full chain is printed when the error is displayed.
//!
//! Every error has a [`Kind`].
//! Callers that need to react to specific failures, like a missing definition,
//!     should match on [`Error::kind`] rather than on the title.

use crate::definition::DefId;

mod display;

pub use display::Note;

/// A possibly propagated Psalter error.
#[derive(Debug)]
pub enum Error {
    Root(Box<dyn PsalterError>),
    Propagated(PropagatedError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display::format_error(f, self)
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Wraps an error in a layer of propagation context.
    pub fn new_propagated(context: PropagationContext, error: Box<Error>) -> Box<Error> {
        Box::new(Error::Propagated(PropagatedError { context, error }))
    }

    /// Returns the propagation stack, outermost first, and the root error.
    pub fn stack_view(&self) -> (Vec<&PropagatedError>, &dyn PsalterError) {
        let mut stack: Vec<&PropagatedError> = vec![];
        let mut last = self;
        loop {
            match last {
                Error::Root(error) => {
                    return (stack, error.as_ref());
                }
                Error::Propagated(propagated) => {
                    stack.push(propagated);
                    last = &propagated.error;
                }
            }
        }
    }

    /// The kind of the root error.
    pub fn kind(&self) -> Kind {
        self.stack_view().1.kind()
    }

    /// The title of the root error.
    pub fn title(&self) -> String {
        self.stack_view().1.title()
    }
}

impl<T: PsalterError> From<T> for Box<Error> {
    fn from(err: T) -> Self {
        Box::new(Error::Root(Box::new(err)))
    }
}

/// An error together with what was being resolved when it passed through.
#[derive(Debug)]
pub struct PropagatedError {
    pub context: PropagationContext,
    pub error: Box<Error>,
}

/// What was being resolved when an error passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationContext {
    /// The command pass of a node.
    Commands { node: DefId, key: Option<String> },
    /// The font pass of a node.
    Font { node: DefId, key: Option<String> },
    /// The execution of a command.
    Command { name: String },
}

impl PropagationContext {
    fn action(&self) -> String {
        match self {
            PropagationContext::Commands { node, key } => {
                format!["handling commands in {}", describe_node(*node, key)]
            }
            PropagationContext::Font { node, key } => {
                format!["remapping fonts in {}", describe_node(*node, key)]
            }
            PropagationContext::Command { name } => format!["executing the command \\{name}"],
        }
    }
}

fn describe_node(node: DefId, key: &Option<String>) -> String {
    match key {
        None => format!["node {node}"],
        Some(key) => format!["node {node} (key `{key}`)"],
    }
}

/// The type of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Malformed command markup, like an unterminated parameter group.
    Parse,
    /// A key lookup missed.
    DefinitionNotFound,
    /// A command received the wrong number or kind of parameters.
    Argument,
    /// No linguistic analyzer or mapping table exists for a language.
    UnsupportedLanguage,
    /// A command name is not in the registry.
    UnknownCommand,
    /// A pass was requested before the pass it depends on.
    Ordering,
    /// The optional resolution depth guard tripped.
    DepthExceeded,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::Parse => "parse error",
            Kind::DefinitionNotFound => "definition not found",
            Kind::Argument => "argument error",
            Kind::UnsupportedLanguage => "unsupported language",
            Kind::UnknownCommand => "unknown command",
            Kind::Ordering => "ordering error",
            Kind::DepthExceeded => "depth exceeded",
        };
        write!(f, "{s}")
    }
}

/// Implementations of this trait describe an error in a Psalter document.
pub trait PsalterError: std::fmt::Debug + 'static {
    fn kind(&self) -> Kind;

    fn title(&self) -> String;

    fn notes(&self) -> Vec<Note> {
        vec![]
    }
}

/// Malformed markup in a node's source text.
#[derive(Debug)]
pub struct ParseError {
    pub source: String,
    /// Byte offset in the source at which the problem was detected.
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn new<T: Into<String>>(source: &str, position: usize, message: T) -> ParseError {
        ParseError {
            source: source.to_string(),
            position,
            message: message.into(),
        }
    }
}

impl PsalterError for ParseError {
    fn kind(&self) -> Kind {
        Kind::Parse
    }

    fn title(&self) -> String {
        self.message.clone()
    }

    fn notes(&self) -> Vec<Note> {
        vec![Note::SourceSnippet {
            source: self.source.clone(),
            position: self.position,
        }]
    }
}

/// A key that is defined neither in the document's scope nor in the global scope.
#[derive(Debug)]
pub struct DefinitionNotFoundError {
    pub key: String,
    pub detail: Option<String>,
}

impl DefinitionNotFoundError {
    pub fn new<T: Into<String>>(key: T) -> DefinitionNotFoundError {
        DefinitionNotFoundError {
            key: key.into(),
            detail: None,
        }
    }

    pub fn with_detail<T: Into<String>>(mut self, detail: T) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl PsalterError for DefinitionNotFoundError {
    fn kind(&self) -> Kind {
        Kind::DefinitionNotFound
    }

    fn title(&self) -> String {
        format!["no definition with key `{}`", self.key]
    }

    fn notes(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = vec![
            "keys are looked up in the document's scope first and then in the global scope".into(),
        ];
        if let Some(detail) = &self.detail {
            notes.push(detail.into());
        }
        notes
    }
}

/// A command was given parameters it can't work with.
#[derive(Debug)]
pub struct ArgumentError {
    pub command: String,
    pub title: String,
    pub text_notes: Vec<String>,
}

impl ArgumentError {
    pub fn new<T: AsRef<str>>(command: &str, title: T) -> ArgumentError {
        ArgumentError {
            command: command.to_string(),
            title: title.as_ref().into(),
            text_notes: vec![],
        }
    }

    /// Error for a command that received the wrong number of parameters.
    pub fn count(command: &str, expected: &str, actual: usize) -> ArgumentError {
        ArgumentError::new(
            command,
            format!["the \\{command} command expects {expected} parameters, got {actual}"],
        )
    }

    pub fn with_note<T: Into<String>>(mut self, note: T) -> Self {
        self.text_notes.push(note.into());
        self
    }
}

impl PsalterError for ArgumentError {
    fn kind(&self) -> Kind {
        Kind::Argument
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn notes(&self) -> Vec<Note> {
        self.text_notes.iter().map(Note::from).collect()
    }
}

/// No analyzer or table is registered for a language.
#[derive(Debug)]
pub struct UnsupportedLanguageError {
    pub language: String,
    pub target: Option<String>,
}

impl UnsupportedLanguageError {
    pub fn new<T: Into<String>>(language: T) -> UnsupportedLanguageError {
        UnsupportedLanguageError {
            language: language.into(),
            target: None,
        }
    }

    pub fn with_target<T: Into<String>>(mut self, target: T) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl PsalterError for UnsupportedLanguageError {
    fn kind(&self) -> Kind {
        Kind::UnsupportedLanguage
    }

    fn title(&self) -> String {
        match &self.target {
            None => format!["no linguistic analyzer is registered for language `{}`", self.language],
            Some(target) => format![
                "no mapping from language `{}` to language `{target}` is registered",
                self.language
            ],
        }
    }
}

/// A command name that is not in the registry.
#[derive(Debug)]
pub struct UnknownCommandError {
    pub name: String,
    /// Registered names that are spelled similarly, closest first.
    pub close_names: Vec<String>,
}

impl PsalterError for UnknownCommandError {
    fn kind(&self) -> Kind {
        Kind::UnknownCommand
    }

    fn title(&self) -> String {
        format!["unknown command \\{}", self.name]
    }

    fn notes(&self) -> Vec<Note> {
        use crate::color::Colorize;
        let mut notes: Vec<Note> = Default::default();
        if let Some(close_name) = self.close_names.first() {
            notes.push(format!["did you mean \\{}?", close_name.as_str().bold()].into());
        }
        notes
    }
}

/// The font pass was requested for a node whose commands are not handled.
#[derive(Debug)]
pub struct OrderingError {
    pub node: DefId,
}

impl PsalterError for OrderingError {
    fn kind(&self) -> Kind {
        Kind::Ordering
    }

    fn title(&self) -> String {
        format!["cannot remap fonts in node {}: its commands have not been handled", self.node]
    }

    fn notes(&self) -> Vec<Note> {
        vec!["call `handle_commands` on the node before `handle_font`".into()]
    }
}

/// The resolution depth guard tripped.
#[derive(Debug)]
pub struct DepthExceededError {
    pub max_depth: usize,
}

impl PsalterError for DepthExceededError {
    fn kind(&self) -> Kind {
        Kind::DepthExceeded
    }

    fn title(&self) -> String {
        format!["resolution nested more than {} levels deep", self.max_depth]
    }

    fn notes(&self) -> Vec<Note> {
        vec!["this usually means two definitions reference each other".into()]
    }
}
