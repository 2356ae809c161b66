//! Annotation scanner
//!
//! Turns template source text into a stream of [`Marker`]s, one per line.
//! A line is an annotation when it contains the directive prefix (`#` by
//! default) directly followed by a command keyword; every other line is a
//! [`MarkerKind::PlainLine`]. The scanner does not check that markers pair up.

mod directive;
pub mod lexer;
mod marker;

use std::path::Path;

pub use directive::{parse_directive, DirectiveError};
pub use marker::{Marker, MarkerKind};

use crate::config::{validate_directive, ExtractConfig};
use crate::error::{Location, Result, TemplateError};
use lexer::COMMAND_KEYWORDS;

/// Lazy, restartable marker stream over a source text
///
/// Cloning a scanner before it is advanced and iterating both copies yields
/// identical sequences. Iteration stops after the first error.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    file: Option<&'a Path>,
    directive: String,
    offset: usize,
    line: usize,
    failed: bool,
}

/// Scan `source` using the directive prefix from `config`
pub fn scan<'a>(source: &'a str, config: &ExtractConfig) -> Scanner<'a> {
    Scanner {
        source,
        file: None,
        directive: config.directive.clone(),
        offset: 0,
        line: 0,
        failed: false,
    }
}

impl<'a> Scanner<'a> {
    /// Attribute markers and errors to `file`
    pub fn with_file(mut self, file: &'a Path) -> Self {
        self.file = Some(file);
        self
    }

    /// Directive prefix currently in effect
    pub fn directive(&self) -> &str {
        &self.directive
    }

    fn location(&self, span: std::ops::Range<usize>) -> Location {
        Location::new(self.file.map(Path::to_path_buf), self.line, span)
    }

    fn classify(&mut self, text: &str, start: usize) -> Result<MarkerKind> {
        let Some(offset) = find_directive(text, &self.directive) else {
            return Ok(MarkerKind::PlainLine(text.to_string()));
        };

        let kind = parse_directive(&text[offset..]).map_err(|err| {
            // An error at end of input has an empty span; point at the whole line
            let span = if err.span.is_empty() {
                start..start + text.len()
            } else {
                start + offset + err.span.start..start + offset + err.span.end
            };
            TemplateError::Syntax {
                location: self.location(span),
                message: format!("{} in '{}'", err.message, text.trim()),
                expected: err.expected,
            }
        })?;

        if let MarkerKind::SetDirective(prefix) = &kind {
            validate_directive(prefix).map_err(|message| TemplateError::Syntax {
                location: self.location(start..start + text.len()),
                message,
                expected: Vec::new(),
            })?;
            tracing::debug!(line = self.line, directive = %prefix, "directive prefix changed");
            self.directive = prefix.clone();
        }

        Ok(kind)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Marker>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.source.len() {
            return None;
        }

        let source = self.source;
        let rest = &source[self.offset..];
        let (len, advance) = match rest.find('\n') {
            Some(i) => (i, i + 1),
            None => (rest.len(), rest.len()),
        };
        let raw = &rest[..len];
        let text = raw.strip_suffix('\r').unwrap_or(raw);

        let start = self.offset;
        self.offset += advance;
        self.line += 1;

        match self.classify(text, start) {
            Ok(kind) => {
                tracing::trace!(line = self.line, ?kind, "marker");
                Some(Ok(Marker::new(kind, self.line, start..start + text.len())))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Scan the whole source eagerly, failing on the first malformed directive
pub fn scan_all(source: &str, config: &ExtractConfig) -> Result<Vec<Marker>> {
    scan(source, config).collect()
}

/// Byte offset of the command keyword when `text` carries an annotation
fn find_directive(text: &str, prefix: &str) -> Option<usize> {
    text.match_indices(prefix).find_map(|(pos, _)| {
        let offset = pos + prefix.len();
        starts_with_command(&text[offset..]).then_some(offset)
    })
}

fn starts_with_command(rest: &str) -> bool {
    COMMAND_KEYWORDS.iter().any(|keyword| {
        rest.strip_prefix(keyword)
            .is_some_and(|after| after.is_empty() || after.starts_with(char::is_whitespace))
    })
}
