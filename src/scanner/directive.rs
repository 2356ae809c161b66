//! Directive grammar using chumsky
//!
//! ```text
//! directive := command closer*
//! command   := "line-template" NAME
//!            | "template" ("begin" | "end") NAME
//!            | "comment" ("begin" | "end")
//!            | "set-directive" SYMBOL
//! closer    := "*/" | "-->" | "*)"
//! ```

use chumsky::error::{RichPattern, RichReason};
use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::lexer::{format_token, lex, Token, COMMENT_CLOSERS};
use super::marker::MarkerKind;
use crate::error::Span;

/// A malformed directive, with spans relative to the directive text
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveError {
    pub span: Span,
    pub message: String,
    pub expected: Vec<String>,
}

/// Parse the text of a directive (everything after the prefix) into a marker kind
pub fn parse_directive(input: &str) -> Result<MarkerKind, DirectiveError> {
    let len = input.len();

    let mut tokens = Vec::new();
    for (tok, span) in lex(input) {
        match tok {
            Ok(tok) => tokens.push((tok, span)),
            Err(()) => {
                return Err(DirectiveError {
                    message: format!("Unrecognized text '{}'", &input[span.clone()]),
                    span,
                    expected: Vec::new(),
                })
            }
        }
    }

    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    directive_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .next()
                .map(DirectiveError::from)
                .unwrap_or_else(|| DirectiveError {
                    span: 0..len,
                    message: "Malformed directive".to_string(),
                    expected: Vec::new(),
                })
        })
}

fn directive_parser<'a, I>() -> impl Parser<'a, I, MarkerKind, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Keywords are not reserved in the name position
    let name = select! {
        Token::Ident(s) => s,
        Token::Template => "template".to_string(),
        Token::Comment => "comment".to_string(),
        Token::Begin => "begin".to_string(),
        Token::End => "end".to_string(),
    };

    let block_marker = choice((just(Token::Begin).to(true), just(Token::End).to(false)));

    let line_template = just(Token::LineTemplate)
        .ignore_then(name.clone())
        .map(MarkerKind::LineTemplate);

    let block_template = just(Token::Template)
        .ignore_then(block_marker.clone())
        .then(name)
        .map(|(begin, name)| {
            if begin {
                MarkerKind::BlockBegin(name)
            } else {
                MarkerKind::BlockEnd(name)
            }
        });

    let comment = just(Token::Comment).ignore_then(block_marker).map(|begin| {
        if begin {
            MarkerKind::CommentBegin
        } else {
            MarkerKind::CommentEnd
        }
    });

    let set_directive = just(Token::SetDirective)
        .ignore_then(select! {
            Token::Symbol(s) => s,
        })
        .map(MarkerKind::SetDirective);

    // `*/` and friends close the host comment the directive lives in
    let closer = select! {
        Token::Symbol(s) if COMMENT_CLOSERS.contains(&s.as_str()) => (),
    };

    choice((line_template, block_template, comment, set_directive))
        .then_ignore(closer.repeated())
        .then_ignore(end())
}

impl<'a> From<Rich<'a, Token>> for DirectiveError {
    fn from(err: Rich<'a, Token>) -> Self {
        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of directive".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of directive".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        DirectiveError {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_template() {
        assert_eq!(
            parse_directive("line-template MapEntry"),
            Ok(MarkerKind::LineTemplate("MapEntry".to_string()))
        );
    }

    #[test]
    fn test_block_begin_and_end() {
        assert_eq!(
            parse_directive("template begin PrintFunction"),
            Ok(MarkerKind::BlockBegin("PrintFunction".to_string()))
        );
        assert_eq!(
            parse_directive("template end PrintFunction"),
            Ok(MarkerKind::BlockEnd("PrintFunction".to_string()))
        );
    }

    #[test]
    fn test_comment_markers() {
        assert_eq!(parse_directive("comment begin"), Ok(MarkerKind::CommentBegin));
        assert_eq!(parse_directive("comment end"), Ok(MarkerKind::CommentEnd));
    }

    #[test]
    fn test_trailing_comment_closer() {
        assert_eq!(parse_directive("comment end */"), Ok(MarkerKind::CommentEnd));
        assert_eq!(
            parse_directive("template end Row -->"),
            Ok(MarkerKind::BlockEnd("Row".to_string()))
        );
    }

    #[test]
    fn test_set_directive() {
        assert_eq!(
            parse_directive("set-directive @@"),
            Ok(MarkerKind::SetDirective("@@".to_string()))
        );
    }

    #[test]
    fn test_keywords_as_names() {
        assert_eq!(
            parse_directive("line-template end"),
            Ok(MarkerKind::LineTemplate("end".to_string()))
        );
        assert_eq!(
            parse_directive("template begin begin"),
            Ok(MarkerKind::BlockBegin("begin".to_string()))
        );
        assert_eq!(
            parse_directive("template end template"),
            Ok(MarkerKind::BlockEnd("template".to_string()))
        );
        assert_eq!(
            parse_directive("line-template comment */"),
            Ok(MarkerKind::LineTemplate("comment".to_string()))
        );
    }

    #[test]
    fn test_missing_name() {
        let err = parse_directive("line-template").unwrap_err();
        assert_eq!(err.message, "Unexpected end of directive");
    }

    #[test]
    fn test_missing_block_marker() {
        let err = parse_directive("template Foo").unwrap_err();
        assert_eq!(err.message, "Unexpected identifier 'Foo'");
        assert_eq!(err.span, 9..12);
    }

    #[test]
    fn test_extra_argument() {
        let err = parse_directive("template begin Foo Bar").unwrap_err();
        assert_eq!(err.message, "Unexpected identifier 'Bar'");
    }

    #[test]
    fn test_invalid_name_characters() {
        let err = parse_directive("line-template 9lives").unwrap_err();
        assert!(err.message.starts_with("Unrecognized text"));
        assert_eq!(err.span.start, 14);
    }

    #[test]
    fn test_non_closer_symbol_rejected() {
        assert!(parse_directive("comment begin ;").is_err());
    }
}
