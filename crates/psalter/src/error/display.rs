use super::Error;
use crate::color::Colorize;

/// A note attached to an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    Text(String),
    /// Points at a byte position in a source string.
    SourceSnippet { source: String, position: usize },
}

impl From<String> for Note {
    fn from(value: String) -> Self {
        Note::Text(value)
    }
}

impl From<&String> for Note {
    fn from(value: &String) -> Self {
        Note::Text(value.clone())
    }
}

impl From<&str> for Note {
    fn from(value: &str) -> Self {
        Note::Text(value.into())
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Note::Text(text) => write!(f, "{text}"),
            Note::SourceSnippet { source, position } => {
                let (line_number, line, column) = locate(source, *position);
                writeln!(f, "at line {line_number}, column {}:", column + 1)?;
                writeln!(f, "{line}")?;
                write!(f, "{}{}", " ".repeat(column), "^".bright_red().bold())
            }
        }
    }
}

// Returns the 1-indexed line number, the line itself and the character column of the position.
fn locate(source: &str, position: usize) -> (usize, &str, usize) {
    let position = position.min(source.len());
    let mut line_start = 0;
    let mut line_number = 1;
    for (i, c) in source.char_indices() {
        if i >= position {
            break;
        }
        if c == '\n' {
            line_start = i + 1;
            line_number += 1;
        }
    }
    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());
    let column = source[line_start..position].chars().count();
    (line_number, &source[line_start..line_end], column)
}

pub(super) fn format_error(f: &mut std::fmt::Formatter<'_>, err: &Error) -> std::fmt::Result {
    let (stack, root) = err.stack_view();
    writeln!(
        f,
        "{}: {}",
        "Error".bright_red().bold(),
        root.title().as_str().bold()
    )?;
    for note in root.notes() {
        let note = format!["{note}"];
        let mut lines = note.trim_end().lines();
        if let Some(first) = lines.next() {
            writeln!(f, "  {} {first}", "note:".bold())?;
        }
        for line in lines {
            writeln!(f, "        {line}")?;
        }
    }
    if !stack.is_empty() {
        writeln!(f, "{}", "Context:".yellow().bold())?;
        // Innermost first, which is the order the resolution was nested in reverse.
        for propagated in stack.iter().rev() {
            writeln!(f, "  - while {}", propagated.context.action())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_second_line() {
        let (line_number, line, column) = locate("first\nsec\\ond{", 10);
        assert_eq!(line_number, 2);
        assert_eq!(line, "sec\\ond{");
        assert_eq!(column, 4);
    }

    #[test]
    fn locate_past_end() {
        let (line_number, line, column) = locate("abc", 10);
        assert_eq!((line_number, line, column), (1, "abc", 3));
    }
}
