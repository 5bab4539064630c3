use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use psalter::command;
use psalter::{Context, LanguageInfo, Settings};

/// Resolve Psalter markup from the command line.
///
/// See the subcommands for things it can do.
#[derive(Parser)]
#[command(name = "psalter", version, about, long_about, max_term_width(100))]
struct Cli {
    #[command(subcommand)]
    sub_command: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    Doc(Doc),
    Resolve(Resolve),
}

/// Print documentation for a command
#[derive(Parser)]
struct Doc {
    /// Name of the command, without the backslash
    name: Option<String>,
}

/// Resolve text containing commands and print the result
///
/// The text is resolved as a single stanza of a document with one translation.
/// Definitions the text refers to with \def are given with -d:
///
///     $ psalter resolve --text 'Hello \def{who}!' -d who=World
///
/// Footnotes are printed after the text, one per line.
#[derive(Parser)]
struct Resolve {
    /// Path to a file holding the text; if neither this nor --text is given,
    ///     the text is read from standard input
    file_path: Option<PathBuf>,

    /// The text to resolve
    #[arg(short, long, conflicts_with = "file_path")]
    text: Option<String>,

    /// A definition in the document, as key=value; may be repeated
    #[arg(short = 'd', long = "define", value_parser = parse_definition)]
    definitions: Vec<(String, String)>,

    /// Language tag of the translation, like `en`, `cop-boh` or `cop/en`
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Font the text is typed in; legacy fonts are converted to Unicode
    #[arg(short, long)]
    font: Option<String>,

    /// Separator used by \lines when none is given
    #[arg(long)]
    line_separator: Option<String>,

    /// Fail instead of recursing deeper than this many nested definitions
    #[arg(long)]
    max_depth: Option<usize>,
}

fn parse_definition(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        None => Err(format!["`{s}` is not of the form key=value"]),
        Some((key, value)) if key.trim().is_empty() => {
            Err(format!["the definition `{value}` has an empty key"])
        }
        Some((key, value)) => Ok((key.trim().to_string(), value.to_string())),
    }
}

fn main() {
    env_logger::init();
    let args: Cli = Cli::parse();
    let result = match args.sub_command {
        SubCommand::Doc(d) => doc(d.name),
        SubCommand::Resolve(r) => r.run(),
    };
    if let Err(err) = result {
        eprintln!["{err}"];
        std::process::exit(1);
    }
}

impl Resolve {
    fn run(self) -> Result<(), String> {
        let source = match (&self.text, &self.file_path) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map_err(|err| format!["Failed to open file {path:?}: {err}"])?,
            (None, None) => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .map_err(|err| format!["Failed to read standard input: {err}"])?;
                source
            }
        };
        let language = LanguageInfo::parse(&self.language)
            .ok_or_else(|| format!["`{}` is not a language tag", self.language])?;

        let mut settings = Settings::default();
        if let Some(separator) = self.line_separator {
            settings = settings.with_default_line_separator(separator);
        }
        if let Some(max_depth) = self.max_depth {
            settings = settings.with_max_resolution_depth(max_depth);
        }
        let mut context = Context::new(settings);
        let doc = context.add_document("command-line", "Command line");
        let root = context.add_translation(doc, language, self.font.as_deref());
        for (key, value) in &self.definitions {
            context.add_stanza(root, Some(key), value.as_str());
        }
        let stanza = context.add_stanza(root, None, source.trim_end_matches('\n'));

        context
            .handle_commands(stanza)
            .and_then(|()| context.handle_font(stanza))
            .map_err(|err| err.to_string())?;

        println!["{}", context.text(stanza)];
        for footnote in context.footnotes(Some(doc)) {
            println!["[{}] {}", footnote.number, context.inline_text(&footnote.body)];
        }
        Ok(())
    }
}

fn doc(name: Option<String>) -> Result<(), String> {
    let commands = command::Map::default();
    match name {
        None => {
            let mut last_prefix = None;
            for (i, name) in commands.names().into_iter().enumerate() {
                let new_last_prefix = name.chars().next();
                if last_prefix != new_last_prefix {
                    last_prefix = new_last_prefix;
                    if i != 0 {
                        println!();
                    }
                }
                let doc = commands.get(name).and_then(|c| c.doc()).unwrap_or("");
                let first_line = doc.split('\n').next().unwrap_or("");
                println!["\\{}  {}", name.bold(), first_line];
            }
            Ok(())
        }
        Some(name) => {
            let name = name.trim_start_matches('\\');
            let built_in = match commands.get(name) {
                None => return Err(format!("Unknown command \\{name}")),
                Some(built_in) => built_in,
            };
            println!["\\{}  {}", name.bold(), built_in.doc().unwrap_or("")];
            Ok(())
        }
    }
}
