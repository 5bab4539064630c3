//! # Psalter: a resolution engine for multilingual liturgical documents.
//!
//! A liturgical document is a set of *translations*, one per language,
//!     each a tree of content parts (sections, stanzas, paragraphs).
//! The raw text of a content part may contain inline commands like
//!     `\def{key}` (insert another definition),
//!     `\footnote{...}` (number a footnote) or
//!     `\trslit{en|...}` (transliterate into another language).
//!
//! This crate turns such raw text into fully resolved, font-normalized output.
//! Resolution happens in two caller-driven passes over each node:
//!
//! 1. the command pass ([`Context::handle_commands`]) parses the source text
//!     and executes every command in it, recording on each referenced definition
//!     which node consumed it;
//!
//! 1. the font pass ([`Context::handle_font`]) converts text written in legacy
//!     8-bit fonts to Unicode.
//!
//! Both passes are idempotent.
//! All state lives in a [`Context`], which owns every definition of every document
//!     loaded into it.

pub mod analyzer;
pub mod color;
pub mod command;
pub mod context;
pub mod definition;
pub mod error;
pub mod font;
pub mod inline;
pub mod language;
pub mod parse;
pub mod prelude;
mod resolve;
pub mod settings;
pub mod translation;

pub use context::Context;
pub use definition::DefId;
pub use language::KnownLanguage;
pub use language::LanguageInfo;
pub use settings::Settings;

/// Module that re-exports all of the crate's traits.
///
/// This is useful for getting all of the traits in scope in a Rust module:
/// ```
/// use psalter::traits::*;
/// ```
pub mod traits {
    pub use super::analyzer::Analyzer;
    pub use super::error::PsalterError;
    pub use super::translation::Multilingual;
}
