//! Error types for scanning, extraction, lookup and rendering

use std::fmt;
use std::path::PathBuf;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Where something happened in a source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Source file, when the text came from one
    pub file: Option<PathBuf>,
    /// 1-based line number
    pub line: usize,
    /// Byte range in the source the location points at
    pub span: Span,
}

impl Location {
    pub fn new(file: Option<PathBuf>, line: usize, span: Span) -> Self {
        Self { file, line, span }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(path) => write!(f, "{}:{}", path.display(), self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

#[derive(Error, Debug)]
pub enum TemplateError {
    /// A directive keyword was recognized but its arguments are malformed
    #[error("{location}: syntax error: {message}")]
    Syntax {
        location: Location,
        message: String,
        expected: Vec<String>,
    },

    #[error("{location}: line-template '{name}' is not followed by a template line")]
    DanglingLineTemplate { name: String, location: Location },

    #[error("{location}: template block '{name}' is never closed")]
    UnterminatedBlock { name: String, location: Location },

    #[error("{location}: 'template end {name}' has no matching 'template begin'")]
    UnexpectedBlockEnd { name: String, location: Location },

    #[error("{location}: template block '{name}' is opened again before it was closed")]
    NestedBlock {
        name: String,
        location: Location,
        outer: Location,
    },

    #[error("{location}: comment region is never closed")]
    UnterminatedComment { location: Location },

    #[error("{location}: 'comment end' outside of a comment region")]
    UnexpectedCommentEnd { location: Location },

    #[error("{location}: duplicate template name '{name}' (first defined at {first})")]
    DuplicateTemplateName {
        name: String,
        location: Location,
        first: Location,
    },

    #[error("template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("{location}: unresolved placeholder '{identifier}' in template '{template}'")]
    UnresolvedPlaceholder {
        identifier: String,
        template: String,
        location: Location,
    },

    #[error("error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Primary location of the error, if it has one
    pub fn location(&self) -> Option<&Location> {
        match self {
            TemplateError::Syntax { location, .. }
            | TemplateError::DanglingLineTemplate { location, .. }
            | TemplateError::UnterminatedBlock { location, .. }
            | TemplateError::UnexpectedBlockEnd { location, .. }
            | TemplateError::NestedBlock { location, .. }
            | TemplateError::UnterminatedComment { location }
            | TemplateError::UnexpectedCommentEnd { location }
            | TemplateError::DuplicateTemplateName { location, .. }
            | TemplateError::UnresolvedPlaceholder { location, .. } => Some(location),
            TemplateError::TemplateNotFound { .. } | TemplateError::Io { .. } => None,
        }
    }

    /// Short message without the location prefix, used as the report title
    fn headline(&self) -> String {
        match self {
            TemplateError::Syntax { message, .. } => message.clone(),
            TemplateError::DanglingLineTemplate { name, .. } => {
                format!("line-template '{}' is not followed by a template line", name)
            }
            TemplateError::UnterminatedBlock { name, .. } => {
                format!("template block '{}' is never closed", name)
            }
            TemplateError::UnexpectedBlockEnd { name, .. } => {
                format!("'template end {}' has no matching 'template begin'", name)
            }
            TemplateError::NestedBlock { name, .. } => {
                format!("template block '{}' is opened again before it was closed", name)
            }
            TemplateError::UnterminatedComment { .. } => "comment region is never closed".into(),
            TemplateError::UnexpectedCommentEnd { .. } => {
                "'comment end' outside of a comment region".into()
            }
            TemplateError::DuplicateTemplateName { name, .. } => {
                format!("duplicate template name '{}'", name)
            }
            TemplateError::UnresolvedPlaceholder { identifier, .. } => {
                format!("unresolved placeholder '{}'", identifier)
            }
            other => other.to_string(),
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// `source` must be the text the error was produced from. Errors without a
    /// location fall back to their plain `Display` output.
    pub fn report(&self, source: &str) -> String {
        self.build_report(source, true)
    }

    /// Like [`report`](Self::report), without ANSI colour codes
    pub fn plain_report(&self, source: &str) -> String {
        self.build_report(source, false)
    }

    fn build_report(&self, source: &str, color: bool) -> String {
        let Some(location) = self.location() else {
            return self.to_string();
        };
        let filename = location
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<input>".to_string());
        let filename = filename.as_str();
        let headline = self.headline();

        let label_message = match self {
            TemplateError::Syntax { expected, .. } if !expected.is_empty() => {
                format!("{}\nExpected: {}", headline, expected.join(", "))
            }
            _ => headline.clone(),
        };

        let mut report = Report::build(ReportKind::Error, filename, location.span.start)
            .with_config(Config::default().with_color(color))
            .with_message(&headline)
            .with_label(
                Label::new((filename, location.span.clone()))
                    .with_message(label_message)
                    .with_color(Color::Red),
            );

        let secondary = match self {
            TemplateError::DuplicateTemplateName { first, .. } => {
                Some((first, "first defined here"))
            }
            TemplateError::NestedBlock { outer, .. } => Some((outer, "block opened here")),
            _ => None,
        };
        if let Some((other, message)) = secondary {
            if other.file == location.file {
                report = report.with_label(
                    Label::new((filename, other.span.clone()))
                        .with_message(message)
                        .with_color(Color::Blue),
                );
            } else {
                report = report.with_note(format!("{}: {}", other, message));
            }
        }

        let mut buf = Vec::new();
        match report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
        {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
