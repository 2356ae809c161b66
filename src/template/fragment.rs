//! Extracted template fragments

use std::fmt;
use std::path::PathBuf;

use crate::error::{Location, Span};

/// How a fragment was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// `line-template`: exactly one line
    Line,
    /// `template begin` / `template end`: any number of lines
    Block,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentKind::Line => write!(f, "line"),
            FragmentKind::Block => write!(f, "block"),
        }
    }
}

/// One stored line together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the source
    pub number: usize,
    /// Byte range of the line in the source
    pub span: Span,
    /// Raw line text, terminator excluded
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, span: Span, text: impl Into<String>) -> Self {
        Self {
            number,
            span,
            text: text.into(),
        }
    }
}

/// Where a fragment was declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub file: Option<PathBuf>,
    /// Line of the opening marker
    pub start_line: usize,
    /// Last line belonging to the fragment (the content line or the end marker)
    pub end_line: usize,
    /// Byte range of the opening marker line
    pub span: Span,
}

impl Provenance {
    /// Location of the declaring marker
    pub fn location(&self) -> Location {
        Location::new(self.file.clone(), self.start_line, self.span.clone())
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(path) => write!(f, "{}:{}-{}", path.display(), self.start_line, self.end_line),
            None => write!(f, "lines {}-{}", self.start_line, self.end_line),
        }
    }
}

/// A named span of template text
///
/// Fragments are immutable once built; rendering produces new text and never
/// touches the stored lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    name: String,
    kind: FragmentKind,
    lines: Vec<SourceLine>,
    provenance: Provenance,
}

impl Fragment {
    pub fn new(
        name: impl Into<String>,
        kind: FragmentKind,
        lines: Vec<SourceLine>,
        provenance: Provenance,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            lines,
            provenance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Stored lines with their source positions
    pub fn source_lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// Stored line texts in order
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|l| l.text.as_str())
    }

    /// Stored text, lines joined with `\n`
    pub fn text(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
