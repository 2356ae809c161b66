//! Placeholder recognition
//!
//! A placeholder is `{{`, optional spaces or tabs, an identifier, optional
//! spaces or tabs and `}}`. Matching is retried at every `{{` position, so a
//! placeholder directly after a literal brace (`{{{body}}}`) is still found.

/// Part of a template line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text
    Text(&'a str),
    /// `{{identifier}}`; `raw` is the placeholder exactly as written
    Placeholder { identifier: &'a str, raw: &'a str },
}

/// Split a line into literal text and placeholders
///
/// Adjacent literal pieces are merged, so a line without placeholders yields
/// a single `Text` segment (or none for an empty line).
pub fn segments(line: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(found) = line[pos..].find("{{") {
        let start = pos + found;
        match placeholder_at(&line[start..]) {
            Some((len, identifier)) => {
                if text_start < start {
                    out.push(Segment::Text(&line[text_start..start]));
                }
                out.push(Segment::Placeholder {
                    identifier,
                    raw: &line[start..start + len],
                });
                pos = start + len;
                text_start = pos;
            }
            // `{` is one byte; retry from the next brace
            None => pos = start + 1,
        }
    }
    if text_start < line.len() {
        out.push(Segment::Text(&line[text_start..]));
    }
    out
}

/// Length and identifier of a placeholder starting at the beginning of `text`
fn placeholder_at(text: &str) -> Option<(usize, &str)> {
    let inner = text.strip_prefix("{{")?;
    let body = inner.trim_start_matches(is_blank);
    let ident_len = identifier_len(body)?;
    let (identifier, after) = body.split_at(ident_len);
    let rest = after.trim_start_matches(is_blank).strip_prefix("}}")?;
    Some((text.len() - rest.len(), identifier))
}

/// Byte length of the identifier `[A-Za-z_][A-Za-z0-9_]*` at the start of `text`
fn identifier_len(text: &str) -> Option<usize> {
    let first = text.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    Some(
        text.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(text.len()),
    )
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Identifiers of all placeholders in `line`, in order of appearance
pub fn identifiers(line: &str) -> impl Iterator<Item = &str> {
    segments(line).into_iter().filter_map(|segment| match segment {
        Segment::Placeholder { identifier, .. } => Some(identifier),
        Segment::Text(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text() {
        assert_eq!(segments("no placeholders"), vec![Segment::Text("no placeholders")]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_placeholder_in_the_middle() {
        assert_eq!(
            segments("line 1 with {{placeholder}} in the middle"),
            vec![
                Segment::Text("line 1 with "),
                Segment::Placeholder {
                    identifier: "placeholder",
                    raw: "{{placeholder}}"
                },
                Segment::Text(" in the middle"),
            ]
        );
    }

    #[test]
    fn test_inner_whitespace() {
        assert_eq!(
            segments("{{ name\t}}"),
            vec![Segment::Placeholder {
                identifier: "name",
                raw: "{{ name\t}}"
            }]
        );
    }

    #[test]
    fn test_adjacent_placeholders() {
        assert_eq!(
            segments("{{a}}{{b}}"),
            vec![
                Segment::Placeholder {
                    identifier: "a",
                    raw: "{{a}}"
                },
                Segment::Placeholder {
                    identifier: "b",
                    raw: "{{b}}"
                },
            ]
        );
    }

    #[test]
    fn test_braces_that_are_not_placeholders() {
        assert_eq!(
            segments("fn f() { {{ 1 }} {x} {{a b}} {{"),
            vec![Segment::Text("fn f() { {{ 1 }} {x} {{a b}} {{")]
        );
    }

    #[test]
    fn test_brace_before_placeholder() {
        assert_eq!(
            segments("{{{x}}}"),
            vec![
                Segment::Text("{"),
                Segment::Placeholder {
                    identifier: "x",
                    raw: "{{x}}"
                },
                Segment::Text("}"),
            ]
        );
    }

    #[test]
    fn test_placeholder_inside_code_braces() {
        assert_eq!(
            segments("function f() {{{body}}}"),
            vec![
                Segment::Text("function f() {"),
                Segment::Placeholder {
                    identifier: "body",
                    raw: "{{body}}"
                },
                Segment::Text("}"),
            ]
        );
        assert_eq!(
            segments("x{{{{v}}"),
            vec![
                Segment::Text("x{{"),
                Segment::Placeholder {
                    identifier: "v",
                    raw: "{{v}}"
                },
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            identifiers("{{key}}: {{ value }}, {{key}}").collect::<Vec<_>>(),
            vec!["key", "value", "key"]
        );
    }
}
