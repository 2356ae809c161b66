//! Comment Templates - named templates extracted from annotated source files
//!
//! Template files are ordinary code in some target language. Directives in
//! that language's comments mark which lines form reusable fragments, so the
//! file stays valid code while doubling as a template:
//!
//! ```text
//! var MAP = {
//!     //#line-template MapEntry
//!     "{{key}}": "{{value}}",
//! };
//! ```
//!
//! The pipeline is: source text → [`scanner`] (markers) → [`template`]
//! extractor → [`Registry`] → [`substitution`] (rendered text).
//!
//! # Example
//!
//! ```rust
//! use comment_templates::{extract, render, SubstitutionMap};
//!
//! let registry = extract(
//!     "//#template begin Greeting\nHello, {{name}}!\n//#template end Greeting",
//! )
//! .unwrap();
//!
//! let greeting = registry.lookup("Greeting").unwrap();
//! let text = render(greeting, &SubstitutionMap::new().with("name", "world")).unwrap();
//! assert_eq!(text, "Hello, world!");
//! ```

pub mod config;
pub mod error;
pub mod scanner;
pub mod substitution;
pub mod template;

use std::path::Path;

use rayon::prelude::*;

pub use config::{ConfigError, ExtractConfig};
pub use error::{Location, TemplateError};
pub use scanner::{scan, Marker, MarkerKind, Scanner};
pub use substitution::{
    render, render_each, render_with_policy, SubstitutionMap, UnresolvedPolicy,
};
pub use template::{Fragment, FragmentKind, Provenance, Registry};

/// Extract all templates from `source` with default configuration
pub fn extract(source: &str) -> Result<Registry, TemplateError> {
    extract_with_config(source, None, &ExtractConfig::default())
}

/// Extract all templates from `source`
///
/// `origin` is recorded in fragment provenance and in error locations.
///
/// # Example
///
/// ```rust
/// use comment_templates::{extract_with_config, ExtractConfig};
///
/// let config = ExtractConfig::new().with_directive("@@");
/// let registry = extract_with_config("-- @@line-template Q\nSELECT 1;", None, &config).unwrap();
/// assert_eq!(registry.lookup("Q").unwrap().text(), "SELECT 1;");
/// ```
pub fn extract_with_config(
    source: &str,
    origin: Option<&Path>,
    config: &ExtractConfig,
) -> Result<Registry, TemplateError> {
    let registry = run_extraction(source, origin, config)?.registry;
    tracing::debug!(
        file = ?origin,
        templates = registry.len(),
        "extracted templates"
    );
    Ok(registry)
}

/// Read a file and extract its templates
pub fn extract_file(path: &Path, config: &ExtractConfig) -> Result<Registry, TemplateError> {
    let source = read_source(path)?;
    extract_with_config(&source, Some(path), config)
}

/// Extract templates from several files in parallel and merge them
///
/// Each file is extracted into its own registry; the registries are then
/// merged in the order of `paths`, so template names must be unique across
/// all files. The first error in that order is returned.
pub fn extract_files<P>(paths: &[P], config: &ExtractConfig) -> Result<Registry, TemplateError>
where
    P: AsRef<Path> + Sync,
{
    let per_file: Vec<Result<Registry, TemplateError>> = paths
        .par_iter()
        .map(|path| extract_file(path.as_ref(), config))
        .collect();

    let mut merged = Registry::new();
    for registry in per_file {
        merged.merge(registry?)?;
    }
    tracing::info!(
        files = paths.len(),
        templates = merged.len(),
        "template registry built"
    );
    Ok(merged)
}

/// The source with every annotation line and comment region removed
///
/// The same structural checks as extraction apply, so a file that fails to
/// extract also fails to strip.
///
/// # Example
///
/// ```rust
/// use comment_templates::{strip_annotations, ExtractConfig};
///
/// let source = "/* #comment begin\n docs\n #comment end */\nvar a = {\n  //#line-template E\n  k: v,\n};";
/// let stripped = strip_annotations(source, &ExtractConfig::default()).unwrap();
/// assert_eq!(stripped, "var a = {\n  k: v,\n};");
/// ```
pub fn strip_annotations(source: &str, config: &ExtractConfig) -> Result<String, TemplateError> {
    Ok(run_extraction(source, None, config)?.document.join("\n"))
}

/// Read a file and strip its annotations
pub fn strip_file(path: &Path, config: &ExtractConfig) -> Result<String, TemplateError> {
    let source = read_source(path)?;
    Ok(run_extraction(&source, Some(path), config)?.document.join("\n"))
}

/// Look up `name` and render it using the policy from `config`
pub fn render_template(
    registry: &Registry,
    name: &str,
    map: &SubstitutionMap,
    config: &ExtractConfig,
) -> Result<String, TemplateError> {
    render_with_policy(registry.lookup(name)?, map, config.unresolved)
}

fn run_extraction(
    source: &str,
    origin: Option<&Path>,
    config: &ExtractConfig,
) -> Result<template::Extraction, TemplateError> {
    let mut markers = scan(source, config);
    if let Some(path) = origin {
        markers = markers.with_file(path);
    }
    template::run(markers, origin)
}

fn read_source(path: &Path) -> Result<String, TemplateError> {
    std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
