//! Lexer for directive text using logos
//!
//! Only the text following a directive prefix is lexed; the rest of a
//! template file is never tokenized.

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Command keywords (longer patterns first)
    #[token("line-template")]
    LineTemplate,
    #[token("template")]
    Template,
    #[token("comment")]
    Comment,
    #[token("set-directive")]
    SetDirective,

    // Block markers
    #[token("begin")]
    Begin,
    #[token("end")]
    End,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    /// A run of punctuation, used for directive prefixes and comment closers
    #[regex(r"[^ \t\r\na-zA-Z0-9_]+", |lex| lex.slice().to_string())]
    Symbol(String),
}

/// Comment terminators that may trail a directive on the same line
pub const COMMENT_CLOSERS: &[&str] = &["*/", "-->", "*)"];

/// Keywords that turn a prefixed line into an annotation
pub const COMMAND_KEYWORDS: &[&str] = &["line-template", "template", "comment", "set-directive"];

/// Lex directive text into tokens with spans
///
/// Characters no token matches are returned as `Err` with their span so the
/// caller can report them.
pub fn lex(input: &str) -> impl Iterator<Item = (Result<Token, ()>, Span)> + '_ {
    Token::lexer(input).spanned()
}

/// Format a token for human-readable error messages
pub fn format_token(tok: &Token) -> String {
    match tok {
        Token::LineTemplate => "keyword 'line-template'".to_string(),
        Token::Template => "keyword 'template'".to_string(),
        Token::Comment => "keyword 'comment'".to_string(),
        Token::SetDirective => "keyword 'set-directive'".to_string(),
        Token::Begin => "'begin'".to_string(),
        Token::End => "'end'".to_string(),
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::Symbol(s) => format!("'{}'", s),
    }
}
