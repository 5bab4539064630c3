//! Parsing of command markup.
//!
//! The grammar is:
//!
//! ```text
//! text     := (literal | command)*
//! command  := '\' ident group*
//! ident    := (alphanumeric | '_')+
//! group    := '{' param ('|' param)* '}'
//! param    := (literal | command | '{' nested '}')*
//! ```
//!
//! Consecutive groups append their parameters, so `\c{a|b}{c}` has three parameters.
//! Inside a parameter, a `{ ... }` pair that does not follow a command is literal text;
//!     its `|` and `}` do not end the parameter.
//! A backslash that is not followed by an identifier character is literal text.
//! There are no escapes.
//!
//! Command names are resolved against the command map while parsing,
//!     so unknown commands are reported here.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::command;
use crate::error::ParseError;
use crate::inline::{Inline, InlineCommand, Run, Span};
use crate::prelude as psalter;

/// Parses source text into inlines.
pub fn parse(source: &str, commands: &command::Map) -> psalter::Result<Vec<Inline>> {
    let mut parser = Parser {
        source,
        chars: source.char_indices().peekable(),
        commands,
    };
    let (inlines, end) = parser.parse_sequence(false)?;
    debug_assert!(end.is_none());
    log::trace!("parsed {} top-level inlines", inlines.len());
    Ok(inlines)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// How a parameter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Bar,
    Brace,
}

struct Parser<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    commands: &'a command::Map,
}

impl<'a> Parser<'a> {
    /// Parses until the end of the source or, inside a parameter, until the `|` or `}` ending it.
    ///
    /// Returns the inlines and how the sequence ended; [None] means the end of the source.
    fn parse_sequence(&mut self, in_parameter: bool) -> psalter::Result<(Vec<Inline>, Option<End>)> {
        let mut inlines: Vec<Inline> = vec![];
        let mut literal = String::new();
        let mut depth: usize = 0;
        while let Some(&(_, c)) = self.chars.peek() {
            match c {
                '\\' => {
                    self.chars.next();
                    match self.parse_command()? {
                        None => literal.push('\\'),
                        Some(command) => {
                            flush(&mut literal, &mut inlines);
                            inlines.push(Inline::Command(command));
                        }
                    }
                }
                '{' if in_parameter => {
                    self.chars.next();
                    depth += 1;
                    literal.push(c);
                }
                '}' if in_parameter && depth > 0 => {
                    self.chars.next();
                    depth -= 1;
                    literal.push(c);
                }
                '}' | '|' if in_parameter && depth == 0 => {
                    self.chars.next();
                    flush(&mut literal, &mut inlines);
                    let end = if c == '|' { End::Bar } else { End::Brace };
                    return Ok((inlines, Some(end)));
                }
                _ => {
                    self.chars.next();
                    literal.push(c);
                }
            }
        }
        flush(&mut literal, &mut inlines);
        Ok((inlines, None))
    }

    /// Parses a command after its backslash.
    ///
    /// Returns [None] if the backslash does not start a command.
    fn parse_command(&mut self) -> psalter::Result<Option<InlineCommand>> {
        let start = match self.chars.peek() {
            Some(&(i, c)) if is_ident_char(c) => i,
            _ => return Ok(None),
        };
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        let source = self.source;
        let name = &source[start..end];
        let kind = self.commands.kind(name)?;
        let mut parameters: Vec<Inline> = vec![];
        while let Some(&(open, '{')) = self.chars.peek() {
            self.chars.next();
            loop {
                let (inlines, end) = self.parse_sequence(true)?;
                parameters.push(parameter(inlines));
                match end {
                    Some(End::Bar) => continue,
                    Some(End::Brace) => break,
                    None => {
                        return Err(ParseError::new(
                            self.source,
                            open,
                            format!["unterminated parameter group for the command \\{name}"],
                        )
                        .into())
                    }
                }
            }
        }
        Ok(Some(InlineCommand::new(name, kind, parameters)))
    }
}

fn flush(literal: &mut String, inlines: &mut Vec<Inline>) {
    if !literal.is_empty() {
        inlines.push(Inline::Run(Run::new(std::mem::take(literal))));
    }
}

/// Converts the inlines of one parameter to a single inline.
fn parameter(mut inlines: Vec<Inline>) -> Inline {
    match inlines.len() {
        0 => Inline::Run(Run::new("")),
        1 if matches!(inlines[0], Inline::Command(_)) => inlines.remove(0),
        _ => Inline::Span(Span::new(inlines)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Kind;
    use crate::error::Kind as ErrorKind;

    fn run(text: &str) -> Inline {
        Inline::run(text)
    }

    fn span(inlines: Vec<Inline>) -> Inline {
        Inline::Span(Span::new(inlines))
    }

    fn command(name: &str, kind: Kind, parameters: Vec<Inline>) -> Inline {
        Inline::Command(InlineCommand::new(name, kind, parameters))
    }

    macro_rules! parse_tests {
        ($( ( $name: ident, $source: expr, $want: expr ), )+) => {
            $(
            #[test]
            fn $name() {
                let got = parse($source, &command::Map::default()).unwrap();
                let want: Vec<Inline> = $want;
                assert_eq!(got, want);
            }
            )+
        };
    }

    parse_tests![
        (empty, "", vec![]),
        (literal_only, "Blessed are you", vec![run("Blessed are you")]),
        (
            command_in_text,
            r"Hello \def{greetingKey}!",
            vec![
                run("Hello "),
                command("def", Kind::Definition, vec![span(vec![run("greetingKey")])]),
                run("!"),
            ]
        ),
        (
            command_without_groups,
            r"\true and \false",
            vec![
                command("true", Kind::Boolean, vec![]),
                run(" and "),
                command("false", Kind::Boolean, vec![]),
            ]
        ),
        (
            multiple_groups_append,
            r"\lines{ / |a}{b}",
            vec![command(
                "lines",
                Kind::Lines,
                vec![span(vec![run(" / ")]), span(vec![run("a")]), span(vec![run("b")])]
            )]
        ),
        (
            empty_group_is_one_empty_parameter,
            r"\lines{}",
            vec![command("lines", Kind::Lines, vec![run("")])]
        ),
        (
            single_command_parameter_stays_a_command,
            r"\ternary{\true|A|B}",
            vec![command(
                "ternary",
                Kind::Ternary,
                vec![
                    command("true", Kind::Boolean, vec![]),
                    span(vec![run("A")]),
                    span(vec![run("B")]),
                ]
            )]
        ),
        (
            nested_commands,
            r"\footnote{see \def{ref}}",
            vec![command(
                "footnote",
                Kind::Footnote,
                vec![span(vec![
                    run("see "),
                    command("def", Kind::Definition, vec![span(vec![run("ref")])]),
                ])]
            )]
        ),
        (
            literal_braces_in_parameter,
            r"\footnote{a {b|c} d}",
            vec![command(
                "footnote",
                Kind::Footnote,
                vec![span(vec![run("a {b|c} d")])]
            )]
        ),
        (
            braces_and_bars_outside_commands_are_literal,
            "a {b} | c",
            vec![run("a {b} | c")]
        ),
        (
            backslash_without_identifier_is_literal,
            r"1 \ 2 \\ 3",
            vec![run(r"1 \ 2 \\ 3")]
        ),
        (
            alias,
            r"\if{1|a|b}",
            vec![command(
                "if",
                Kind::Ternary,
                vec![span(vec![run("1")]), span(vec![run("a")]), span(vec![run("b")])]
            )]
        ),
        (
            non_ascii_literal,
            r"Ⲡϭⲟⲓⲥ \def{x}",
            vec![
                run("Ⲡϭⲟⲓⲥ "),
                command("def", Kind::Definition, vec![span(vec![run("x")])]),
            ]
        ),
    ];

    #[test]
    fn unterminated_group() {
        let err = parse(r"Hello \def{greeting", &command::Map::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        let (_, root) = err.stack_view();
        assert!(root.title().contains("unterminated"));
    }

    #[test]
    fn unterminated_nested_group() {
        let err = parse(r"\footnote{a \def{b}", &command::Map::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn unknown_command() {
        let err = parse(r"a \nosuchcommand{b}", &command::Map::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
    }

    #[test]
    fn source_round_trip() {
        let source = r"Hello \def{greetingKey}, \lines{ - |a|b}!";
        let inlines = parse(source, &command::Map::default()).unwrap();
        let got: String = inlines.iter().map(Inline::source).collect();
        assert_eq!(got, source);
    }
}
