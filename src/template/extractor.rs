//! Template extraction - pairs markers into named fragments

use std::path::Path;

use crate::error::{Result, TemplateError};
use crate::scanner::{Marker, MarkerKind};

use super::fragment::{Fragment, FragmentKind, Provenance, SourceLine};
use super::registry::Registry;

/// Result of a full pass over a marker stream
#[derive(Debug)]
pub(crate) struct Extraction {
    pub registry: Registry,
    /// Every plain line outside comment regions, in order
    pub document: Vec<String>,
}

/// A `template begin` still waiting for its `template end`
#[derive(Debug)]
struct OpenBlock {
    name: String,
    marker: Marker,
    lines: Vec<SourceLine>,
}

/// State for a single extraction pass
struct Extractor<'a> {
    file: Option<&'a Path>,
    registry: Registry,
    document: Vec<String>,
    open_blocks: Vec<OpenBlock>,
    open_comment: Option<Marker>,
    pending_line: Option<(String, Marker)>,
}

impl<'a> Extractor<'a> {
    fn new(file: Option<&'a Path>) -> Self {
        Self {
            file,
            registry: Registry::new(),
            document: Vec::new(),
            open_blocks: Vec::new(),
            open_comment: None,
            pending_line: None,
        }
    }

    fn provenance(&self, opening: &Marker, end_line: usize) -> Provenance {
        Provenance {
            file: self.file.map(Path::to_path_buf),
            start_line: opening.line,
            end_line,
            span: opening.span.clone(),
        }
    }

    fn feed(&mut self, marker: Marker) -> Result<()> {
        // A line template claims exactly the next line, which must be plain
        if let Some((name, declaration)) = self.pending_line.take() {
            let MarkerKind::PlainLine(text) = &marker.kind else {
                return Err(TemplateError::DanglingLineTemplate {
                    name,
                    location: declaration.location(self.file),
                });
            };
            let line = SourceLine::new(marker.line, marker.span.clone(), text.clone());
            let provenance = self.provenance(&declaration, marker.line);
            self.registry.register(Fragment::new(
                name,
                FragmentKind::Line,
                vec![line],
                provenance,
            ))?;
            self.push_content(&marker, text);
            return Ok(());
        }

        if self.open_comment.is_some() {
            // Everything inside a comment region is documentation
            if marker.kind == MarkerKind::CommentEnd {
                self.open_comment = None;
            }
            return Ok(());
        }

        match &marker.kind {
            MarkerKind::PlainLine(text) => self.push_content(&marker, text),
            MarkerKind::CommentBegin => self.open_comment = Some(marker.clone()),
            MarkerKind::CommentEnd => {
                return Err(TemplateError::UnexpectedCommentEnd {
                    location: marker.location(self.file),
                });
            }
            MarkerKind::LineTemplate(name) => {
                self.pending_line = Some((name.clone(), marker.clone()));
            }
            MarkerKind::BlockBegin(name) => {
                if let Some(outer) = self.open_blocks.iter().find(|b| &b.name == name) {
                    return Err(TemplateError::NestedBlock {
                        name: name.clone(),
                        location: marker.location(self.file),
                        outer: outer.marker.location(self.file),
                    });
                }
                self.open_blocks.push(OpenBlock {
                    name: name.clone(),
                    marker: marker.clone(),
                    lines: Vec::new(),
                });
            }
            MarkerKind::BlockEnd(name) => self.close_block(name, &marker)?,
            // The scanner has already switched prefixes
            MarkerKind::SetDirective(_) => {}
        }
        Ok(())
    }

    fn push_content(&mut self, marker: &Marker, text: &str) {
        for block in &mut self.open_blocks {
            block
                .lines
                .push(SourceLine::new(marker.line, marker.span.clone(), text));
        }
        self.document.push(text.to_string());
    }

    fn close_block(&mut self, name: &str, end: &Marker) -> Result<()> {
        match self.open_blocks.last() {
            Some(innermost) if innermost.name == name => {}
            Some(innermost) if self.open_blocks.iter().any(|b| b.name == name) => {
                // Closing an outer block while an inner one is still open
                return Err(TemplateError::UnterminatedBlock {
                    name: innermost.name.clone(),
                    location: innermost.marker.location(self.file),
                });
            }
            _ => {
                return Err(TemplateError::UnexpectedBlockEnd {
                    name: name.to_string(),
                    location: end.location(self.file),
                });
            }
        }

        if let Some(block) = self.open_blocks.pop() {
            let provenance = self.provenance(&block.marker, end.line);
            self.registry.register(Fragment::new(
                block.name,
                FragmentKind::Block,
                block.lines,
                provenance,
            ))?;
        }
        Ok(())
    }

    fn finish(self) -> Result<Extraction> {
        if let Some((name, declaration)) = self.pending_line {
            return Err(TemplateError::DanglingLineTemplate {
                name,
                location: declaration.location(self.file),
            });
        }
        if let Some(comment) = &self.open_comment {
            return Err(TemplateError::UnterminatedComment {
                location: comment.location(self.file),
            });
        }
        if let Some(block) = self.open_blocks.last() {
            return Err(TemplateError::UnterminatedBlock {
                name: block.name.clone(),
                location: block.marker.location(self.file),
            });
        }
        Ok(Extraction {
            registry: self.registry,
            document: self.document,
        })
    }
}

/// Run the extractor over a complete marker stream
pub(crate) fn run<I>(markers: I, file: Option<&Path>) -> Result<Extraction>
where
    I: IntoIterator<Item = Result<Marker>>,
{
    let mut extractor = Extractor::new(file);
    for marker in markers {
        extractor.feed(marker?)?;
    }
    extractor.finish()
}

/// Build a registry from a marker stream
///
/// Fails on the first structural problem: a dangling line template, an
/// unbalanced block or comment region, or a duplicate name. No partial
/// registry is returned.
pub fn extract_markers<I>(markers: I, file: Option<&Path>) -> Result<Registry>
where
    I: IntoIterator<Item = Result<Marker>>,
{
    run(markers, file).map(|extraction| extraction.registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractConfig;
    use crate::scanner::scan;
    use pretty_assertions::assert_eq;

    fn extract_lines(lines: &[&str]) -> Result<Registry> {
        let source = lines.join("\n");
        extract_markers(scan(&source, &ExtractConfig::default()), None)
    }

    fn body(registry: &Registry, name: &str) -> Vec<String> {
        registry
            .lookup(name)
            .expect("Should find template")
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_line_template() {
        let registry = extract_lines(&["//#line-template X", "val x = 1;"]).expect("Should extract");
        let fragment = registry.lookup("X").expect("Should find X");
        assert_eq!(fragment.text(), "val x = 1;");
        assert_eq!(fragment.kind(), FragmentKind::Line);
        assert_eq!(fragment.provenance().start_line, 1);
        assert_eq!(fragment.provenance().end_line, 2);
    }

    #[test]
    fn test_keyword_names() {
        let registry = extract_lines(&[
            "//#line-template end",
            "x",
            "//#template begin begin",
            "y",
            "//#template end begin",
        ])
        .expect("Should extract");
        assert_eq!(registry.lookup("end").expect("Should find end").text(), "x");
        assert_eq!(registry.lookup("begin").expect("Should find begin").text(), "y");
    }

    #[test]
    fn test_block_template() {
        let registry = extract_lines(&["//#template begin Y", "a", "b", "//#template end Y"])
            .expect("Should extract");
        assert_eq!(body(&registry, "Y"), vec!["a", "b"]);
        let fragment = registry.lookup("Y").expect("Should find Y");
        assert_eq!(fragment.kind(), FragmentKind::Block);
        assert_eq!(fragment.provenance().start_line, 1);
        assert_eq!(fragment.provenance().end_line, 4);
        assert_eq!(
            fragment
                .source_lines()
                .iter()
                .map(|l| l.number)
                .collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn test_empty_block() {
        let registry = extract_lines(&["//#template begin E", "//#template end E"])
            .expect("Should extract");
        assert!(registry.lookup("E").expect("Should find E").is_empty());
    }

    #[test]
    fn test_several_blocks() {
        let registry = extract_lines(&[
            "//#template begin A",
            "a1",
            "//#template end A",
            "between",
            "//#template begin B",
            "b1",
            "b2",
            "//#template end B",
        ])
        .expect("Should extract");
        assert_eq!(registry.len(), 2);
        assert_eq!(body(&registry, "A"), vec!["a1"]);
        assert_eq!(body(&registry, "B"), vec!["b1", "b2"]);
    }

    #[test]
    fn test_nested_templates_inside_block() {
        let registry = extract_lines(&[
            "//#template begin Outer",
            "head",
            "//#line-template Inner",
            "inner line",
            "//#template begin Deep",
            "deep",
            "//#template end Deep",
            "tail",
            "//#template end Outer",
        ])
        .expect("Should extract");

        assert_eq!(
            body(&registry, "Outer"),
            vec!["head", "inner line", "deep", "tail"]
        );
        assert_eq!(body(&registry, "Inner"), vec!["inner line"]);
        assert_eq!(body(&registry, "Deep"), vec!["deep"]);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["Inner", "Deep", "Outer"]
        );
    }

    #[test]
    fn test_comment_regions_are_dropped() {
        let registry = extract_lines(&[
            "//#template begin T",
            "keep",
            "/* #comment begin",
            "   docs //#line-template Ignored",
            "   #comment end */",
            "also keep",
            "//#template end T",
        ])
        .expect("Should extract");
        assert_eq!(body(&registry, "T"), vec!["keep", "also keep"]);
        assert!(!registry.contains("Ignored"));
    }

    #[test]
    fn test_dangling_line_template_at_end() {
        let err = extract_lines(&["a", "//#line-template X"]).unwrap_err();
        match err {
            TemplateError::DanglingLineTemplate { name, location } => {
                assert_eq!(name, "X");
                assert_eq!(location.line, 2);
            }
            other => panic!("Expected dangling error, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_line_template_before_marker() {
        let err = extract_lines(&[
            "//#line-template X",
            "//#template begin Y",
            "y",
            "//#template end Y",
        ])
        .unwrap_err();
        assert!(matches!(err, TemplateError::DanglingLineTemplate { name, .. } if name == "X"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = extract_lines(&["//#template begin Foo", "a", "b"]).unwrap_err();
        match err {
            TemplateError::UnterminatedBlock { name, location } => {
                assert_eq!(name, "Foo");
                assert_eq!(location.line, 1);
            }
            other => panic!("Expected unterminated error, got {:?}", other),
        }
    }

    #[test]
    fn test_end_with_other_name_does_not_close() {
        let err = extract_lines(&["//#template begin Foo", "a", "//#template end Bar"]).unwrap_err();
        match err {
            TemplateError::UnexpectedBlockEnd { name, location } => {
                assert_eq!(name, "Bar");
                assert_eq!(location.line, 3);
            }
            other => panic!("Expected unexpected block end, got {:?}", other),
        }
    }

    #[test]
    fn test_interleaved_blocks() {
        let err = extract_lines(&[
            "//#template begin A",
            "//#template begin B",
            "//#template end A",
            "//#template end B",
        ])
        .unwrap_err();
        assert!(matches!(err, TemplateError::UnterminatedBlock { name, .. } if name == "B"));
    }

    #[test]
    fn test_nested_block_with_same_name() {
        let err = extract_lines(&[
            "//#template begin A",
            "//#template begin A",
            "//#template end A",
            "//#template end A",
        ])
        .unwrap_err();
        match err {
            TemplateError::NestedBlock {
                name,
                location,
                outer,
            } => {
                assert_eq!(name, "A");
                assert_eq!(location.line, 2);
                assert_eq!(outer.line, 1);
            }
            other => panic!("Expected nested block error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_between_line_and_block() {
        let err = extract_lines(&[
            "//#line-template Dup",
            "one",
            "//#template begin Dup",
            "two",
            "//#template end Dup",
        ])
        .unwrap_err();
        match err {
            TemplateError::DuplicateTemplateName {
                name,
                location,
                first,
            } => {
                assert_eq!(name, "Dup");
                assert_eq!(location.line, 3);
                assert_eq!(first.line, 1);
            }
            other => panic!("Expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_comments() {
        let err = extract_lines(&["/* #comment begin", "docs"]).unwrap_err();
        assert!(matches!(err, TemplateError::UnterminatedComment { .. }));

        let err = extract_lines(&["code", "#comment end"]).unwrap_err();
        assert!(matches!(err, TemplateError::UnexpectedCommentEnd { location } if location.line == 2));
    }

    #[test]
    fn test_scanner_error_is_propagated() {
        let err = extract_lines(&["//#template begin"]).unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_document_excludes_annotations() {
        let source = "a\n//#line-template X\nb\n/* #comment begin\nc\n#comment end */\nd";
        let extraction =
            run(scan(source, &ExtractConfig::default()), None).expect("Should extract");
        assert_eq!(extraction.document, vec!["a", "b", "d"]);
    }

    #[test]
    fn test_file_is_recorded_in_provenance() {
        let path = Path::new("src/app.js");
        let registry = extract_markers(
            scan("//#line-template X\nx", &ExtractConfig::default()).with_file(path),
            Some(path),
        )
        .expect("Should extract");
        assert_eq!(
            registry.lookup("X").expect("Should find X").provenance().to_string(),
            "src/app.js:1-2"
        );
    }
}
