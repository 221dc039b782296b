use std::fs;

use anyhow::{Context, bail};
use ca65_errors::{Diagnostic, Renderer};
use ca65_inputs::SourceFile;
use ca65_parse::{Edit, Parse, ParseOptions, parse_with, reparse_with};
use ca65_query::Query;
use ca65_syntax::{Language, NodeOrToken};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use text_size::{TextRange, TextSize};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(version, about = "Inspect ca65 assembly sources")]
struct Options {
    /// Refuse inputs larger than this many bytes.
    #[arg(long, global = true)]
    max_size: Option<usize>,
    /// Render diagnostics without colors.
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the syntax tree and the diagnostics.
    Parse { path: Utf8PathBuf },
    /// Print every capture of a pattern query.
    Query { path: Utf8PathBuf, pattern: String },
    /// Replace the bytes `start..end` and reparse incrementally.
    Reparse { path: Utf8PathBuf, start: u32, end: u32, replacement: String },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = Options::parse();
    let renderer = if options.no_color { Renderer::plain() } else { Renderer::styled() };
    let parse_options = ParseOptions { max_input_len: options.max_size, ..ParseOptions::default() };
    let language = Language::ca65();

    match options.command {
        Command::Parse { path } => {
            let file = read(path)?;
            let parse = parse_with(&language, file.text(), &parse_options)?.into_parse();
            print!("{}", parse.root().debug_tree());
            report(&renderer, &file, &parse);
        }
        Command::Query { path, pattern } => {
            let query = match Query::new(&pattern) {
                Ok(query) => query,
                Err(err) => {
                    let diagnostic = Diagnostic::error(err.to_string(), err.range());
                    eprintln!("{}", diagnostic.render(&renderer, "<query>", &pattern));
                    bail!("invalid query");
                }
            };

            let file = read(path)?;
            let parse = parse_with(&language, file.text(), &parse_options)?.into_parse();
            for m in query.matches(parse.root()) {
                for capture in &m.captures {
                    let range = capture.element.text_range();
                    let at = file.line_col(range.start());
                    println!(
                        "{}:{}:{} pattern {} @{} {:?} {:?}",
                        file.path(),
                        at.line + 1,
                        at.col + 1,
                        m.pattern_index,
                        query.capture_names()[capture.index as usize],
                        capture.element.kind(),
                        capture.element.text(),
                    );
                }
            }
            report(&renderer, &file, &parse);
        }
        Command::Reparse { path, start, end, replacement } => {
            let file = read(path)?;
            let old = parse_with(&language, file.text(), &parse_options)?.into_parse();

            let (edit, text) = splice(file.text(), start, end, replacement.as_bytes())?;
            let new = reparse_with(&language, &old, &text, &[edit], &parse_options)?.into_parse();
            print!("{}", new.root().debug_tree());

            let (reused, total) = shared_children(&old, &new);
            eprintln!("reused {reused} of {total} top-level nodes");
            report(&renderer, &SourceFile::new(file.path(), text), &new);
        }
    }

    Ok(())
}

fn read(path: Utf8PathBuf) -> anyhow::Result<SourceFile> {
    let text = fs::read(&path).with_context(|| format!("failed to read `{path}`"))?;
    Ok(SourceFile::new(path, text))
}

fn report(renderer: &Renderer, file: &SourceFile, parse: &Parse) {
    if parse.is_cancelled() {
        log::warn!("parse of `{}` was cancelled", file.path());
    }

    let text = file.display_text();
    for diagnostic in parse.diagnostics() {
        eprintln!("{}", diagnostic.render(renderer, file.path().as_str(), &text));
    }
}

/// Replaces `start..end` of `text`, returning the edit and the new text.
fn splice(
    text: &[u8],
    start: u32,
    end: u32,
    replacement: &[u8],
) -> anyhow::Result<(Edit, Vec<u8>)> {
    if start > end || end as usize > text.len() {
        bail!("edit range {start}..{end} is outside of the text (0..{})", text.len());
    }

    let range = TextRange::new(TextSize::new(start), TextSize::new(end));
    let edit = Edit::replace(text, range, replacement);

    let mut new_text = Vec::with_capacity(text.len() - (end - start) as usize + replacement.len());
    new_text.extend_from_slice(&text[..start as usize]);
    new_text.extend_from_slice(replacement);
    new_text.extend_from_slice(&text[end as usize..]);
    Ok((edit, new_text))
}

/// How many top-level nodes of `new` were taken over from `old`, and the total.
fn shared_children(old: &Parse, new: &Parse) -> (usize, usize) {
    let old_children = old.tree().green().children();
    let new_children = new.tree().green().children();

    let reused = new_children
        .iter()
        .filter(|child| match child {
            NodeOrToken::Node(node) => old_children.iter().any(|old| match old {
                NodeOrToken::Node(old) => old.ptr_eq(node),
                NodeOrToken::Token(_) => false,
            }),
            NodeOrToken::Token(_) => false,
        })
        .count();
    (reused, new_children.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_checks_the_range() {
        let (edit, text) = splice(b"lda #1\n", 5, 6, b"$ff").unwrap();
        assert_eq!(text, b"lda #$ff\n");
        assert_eq!(edit.delta(), 2);

        assert!(splice(b"nop\n", 3, 2, b"").is_err());
        assert!(splice(b"nop\n", 0, 5, b"").is_err());
    }

    #[test]
    fn counts_shared_children() {
        let language = Language::ca65();
        let text = b"nop\nlda #1\nrts\n";
        let old = ca65_parse::parse(&language, text);

        let (edit, new_text) = splice(text, 9, 10, b"2").unwrap();
        let new = ca65_parse::reparse(&language, &old, &new_text, &[edit]);
        assert_eq!(shared_children(&old, &new), (2, 3));
    }

    #[test]
    fn options_parse() {
        let args = ["ca65", "reparse", "--no-color", "a.s", "1", "2", "x"];
        let options = Options::try_parse_from(args).unwrap();
        assert!(options.no_color);
        assert!(matches!(
            options.command,
            Command::Reparse { start: 1, end: 2, ref replacement, .. } if replacement == "x"
        ));
    }
}
