//! Marker types produced by the scanner

use crate::error::{Location, Span};
use std::path::Path;

/// What a single source line means to the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    /// Any line that is not an annotation, with its raw text
    PlainLine(String),
    /// `comment begin`
    CommentBegin,
    /// `comment end`
    CommentEnd,
    /// `line-template <name>`
    LineTemplate(String),
    /// `template begin <name>`
    BlockBegin(String),
    /// `template end <name>`
    BlockEnd(String),
    /// `set-directive <prefix>`
    SetDirective(String),
}

/// A marker with its source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// 1-based line number
    pub line: usize,
    /// Byte range of the line in the source, terminator excluded
    pub span: Span,
}

impl Marker {
    pub fn new(kind: MarkerKind, line: usize, span: Span) -> Self {
        Self { kind, line, span }
    }

    /// Location of this marker, attributed to `file`
    pub fn location(&self, file: Option<&Path>) -> Location {
        Location::new(file.map(Path::to_path_buf), self.line, self.span.clone())
    }
}
