//! Subcommand implementations
//!
//! Each command takes the loaded configuration and the source text and returns what should be
//! printed. Lines and columns are 1-based on the command line; column `N` is the cursor
//! position before the N-th character.

use csdl_analysis::{
    CompletionSession, FoldOptions, FoldRegistry, FoldSurface, GutterMarker, MarkerId,
};
use csdl_config::{ConfigLoadError, CsdlConfig};
use csdl_parser::csdl::{Token, TokenSource, TokenizedBuffer};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Output formats of the `tokens` command.
pub const TOKEN_FORMATS: &[&str] = &["simple", "json"];

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line} is outside the document (1..={count})")]
    LineOutOfRange { line: usize, count: usize },
    #[error("format '{0}' not supported, available formats: simple, json")]
    UnknownFormat(String),
}

fn open(config: &CsdlConfig, source: &str) -> TokenizedBuffer {
    TokenizedBuffer::new(config.lexer(), source)
}

fn line_index(buffer: &TokenizedBuffer, line: usize) -> Result<usize, CliError> {
    let count = buffer.line_count();
    if line == 0 || line > count {
        return Err(CliError::LineOutOfRange { line, count });
    }
    Ok(line - 1)
}

#[derive(Serialize)]
struct TokenLine<'a> {
    line: usize,
    tokens: &'a [Token],
}

/// Dump the tokens of every line.
pub fn tokens(config: &CsdlConfig, source: &str, format: &str) -> Result<String, CliError> {
    let buffer = open(config, source);
    match format {
        "json" => {
            let lines: Vec<TokenLine> = (0..buffer.line_count())
                .map(|line| TokenLine {
                    line: line + 1,
                    tokens: buffer.line_tokens(line),
                })
                .collect();
            Ok(serde_json::to_string_pretty(&lines)? + "\n")
        }
        "simple" => Ok((0..buffer.line_count())
            .map(|line| {
                let rendered: Vec<String> = buffer
                    .line_tokens(line)
                    .iter()
                    .filter(|token| !token.is_whitespace())
                    .map(ToString::to_string)
                    .collect();
                format!("{:>4}: {}\n", line + 1, rendered.join(" "))
            })
            .collect()),
        other => Err(CliError::UnknownFormat(other.to_string())),
    }
}

/// Completion candidates at a cursor, one `label<TAB>category` per line.
pub fn complete(
    config: &CsdlConfig,
    source: &str,
    line: usize,
    column: usize,
) -> Result<String, CliError> {
    let buffer = open(config, source);
    let index = line_index(&buffer, line)?;
    let mut session = CompletionSession::new();
    let Some(list) = session.request(
        &buffer,
        buffer.lexer().vocabulary(),
        index,
        column.saturating_sub(1),
    ) else {
        return Ok(String::new());
    };

    Ok(list
        .items
        .iter()
        .map(|item| match &item.detail {
            Some(detail) => format!("{}\t{}\n", item.label, detail),
            None => format!("{}\n", item.label),
        })
        .collect())
}

/// Host stand-in that remembers what folding would draw.
#[derive(Debug, Default)]
struct FoldListing {
    marks: BTreeMap<MarkerId, (usize, usize, usize, String)>,
    gutters: BTreeMap<usize, GutterMarker>,
}

impl FoldSurface for FoldListing {
    fn mark_range(&mut self, id: MarkerId, line: usize, from: usize, to: usize, placeholder: &str) {
        self.marks.insert(id, (line, from, to, placeholder.to_string()));
    }

    fn clear_mark(&mut self, id: MarkerId) {
        self.marks.remove(&id);
    }

    fn set_gutter(&mut self, line: usize, marker: GutterMarker) {
        self.gutters.insert(line, marker);
    }

    fn clear_gutter(&mut self, line: usize) {
        self.gutters.remove(&line);
    }
}

/// Every foldable string as `line:first-last<TAB>placeholder`.
pub fn folds(config: &CsdlConfig, source: &str) -> String {
    let buffer = open(config, source);
    let mut registry = FoldRegistry::new(FoldOptions {
        fold_on_load: true,
        ..config.folding
    });
    let mut listing = FoldListing::default();
    registry.initialize(&buffer, &mut listing);
    tracing::debug!(gutters = listing.gutters.len(), "fold markers placed");

    listing
        .marks
        .values()
        .map(|(line, from, to, placeholder)| {
            format!("{}:{}-{}\t{}\n", line + 1, from + 1, to, placeholder)
        })
        .collect()
}

/// Indentation hint for a line, `none` when no bracket is open before it.
pub fn indent(config: &CsdlConfig, source: &str, line: usize) -> Result<String, CliError> {
    let buffer = open(config, source);
    let index = line_index(&buffer, line)?;
    Ok(match buffer.indent_for(index) {
        Some(width) => format!("{width}\n"),
        None => "none\n".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CsdlConfig {
        csdl_config::load_defaults().expect("defaults")
    }

    #[test]
    fn simple_tokens_skip_whitespace() {
        let output = tokens(&config(), "fb.language == \"en\"", "simple").expect("tokens");
        assert_eq!(
            output,
            "   1: target(\"fb.language\") operator(\"==\") string(\"\\\"en\\\"\")\n"
        );
    }

    #[test]
    fn unknown_token_format_is_rejected() {
        let error = tokens(&config(), "", "xml").expect_err("format");
        assert!(matches!(error, CliError::UnknownFormat(format) if format == "xml"));
    }

    #[test]
    fn completion_after_target_lists_operators() {
        let output = complete(&config(), "links.domain c", 1, 15).expect("complete");
        assert!(output.starts_with("contains\toperator\n"));
        assert!(output.ends_with("\ncs\toperator\n"));
        assert_eq!(output.lines().count(), 6);
    }

    #[test]
    fn line_out_of_range() {
        let error = indent(&config(), "stream", 3).expect_err("range");
        assert_eq!(error.to_string(), "line 3 is outside the document (1..=1)");
    }

    #[test]
    fn folds_lists_long_strings() {
        let source = "fb.link exists\nlinks.url in \"http://example.com/a,http://example.com/b\"";
        assert_eq!(folds(&config(), source), "2:14-56\t\"http...\"\n");
    }

    #[test]
    fn indent_inside_brackets() {
        let source = "(\nfb.link exists\n)";
        assert_eq!(indent(&config(), source, 2).expect("indent"), "2\n");
        assert_eq!(indent(&config(), source, 1).expect("indent"), "none\n");
    }
}
