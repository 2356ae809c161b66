//! Placeholder substitution
//!
//! Fragments may contain `{{identifier}}` placeholders. Rendering replaces
//! each one with the value from a [`SubstitutionMap`] and returns new text;
//! the fragment itself is never modified.
//!
//! Placeholders missing from the map are handled according to an
//! [`UnresolvedPolicy`]. The default, [`UnresolvedPolicy::Keep`], leaves them
//! in place exactly as written so a fragment can be rendered in several
//! passes by different consumers.
//!
//! # Example
//!
//! ```rust
//! use comment_templates::{extract, render, SubstitutionMap};
//!
//! let registry = extract("//#line-template Entry\n\"{{key}}\": \"{{value}}\",").unwrap();
//! let map = SubstitutionMap::new().with("key", "smile").with("value", "🙂");
//! let text = render(registry.lookup("Entry").unwrap(), &map).unwrap();
//! assert_eq!(text, "\"smile\": \"🙂\",");
//! ```

mod placeholder;

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Location, Result, TemplateError};
use crate::template::{Fragment, SourceLine};

pub use placeholder::{identifiers, segments, Segment};

/// What to do with a placeholder that has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Leave the placeholder text unchanged
    #[default]
    Keep,
    /// Fail the render with `UnresolvedPlaceholder`
    Error,
}

/// Values for one render call, keyed by placeholder identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    values: HashMap<String, String>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style
    pub fn with(mut self, identifier: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(identifier, value);
        self
    }

    /// Set a value, returning the previous one
    pub fn insert(
        &mut self,
        identifier: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.values.insert(identifier.into(), value.into())
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.values.get(identifier).map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.values.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubstitutionMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for SubstitutionMap {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

/// Parse a `key=value` assignment
///
/// The key must be a valid placeholder identifier; the value is everything
/// after the first `=`, possibly empty.
pub fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let mut chars = key.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(format!("'{}' is not a valid placeholder name", key));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Render a fragment, keeping unresolved placeholders
pub fn render(fragment: &Fragment, map: &SubstitutionMap) -> Result<String> {
    render_with_policy(fragment, map, UnresolvedPolicy::Keep)
}

/// Render a fragment with an explicit unresolved placeholder policy
///
/// Lines are joined with `\n`. A multi-line value keeps the indentation of
/// its insertion point: its second and later lines are prefixed with the
/// text before the placeholder, blanked to spaces (tabs are kept).
pub fn render_with_policy(
    fragment: &Fragment,
    map: &SubstitutionMap,
    policy: UnresolvedPolicy,
) -> Result<String> {
    let mut out = String::new();
    for (i, line) in fragment.source_lines().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_line(fragment, line, map, policy, &mut out)?;
    }
    Ok(out)
}

/// Render a fragment once per map and join the results with `\n`
pub fn render_each<'m, I>(fragment: &Fragment, maps: I, policy: UnresolvedPolicy) -> Result<String>
where
    I: IntoIterator<Item = &'m SubstitutionMap>,
{
    let rendered = maps
        .into_iter()
        .map(|map| render_with_policy(fragment, map, policy))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join("\n"))
}

/// Identifiers used by a fragment, first occurrence order, without repeats
pub fn placeholders(fragment: &Fragment) -> Vec<&str> {
    let mut seen = Vec::new();
    for identifier in fragment.lines().flat_map(identifiers) {
        if !seen.contains(&identifier) {
            seen.push(identifier);
        }
    }
    seen
}

fn render_line(
    fragment: &Fragment,
    line: &SourceLine,
    map: &SubstitutionMap,
    policy: UnresolvedPolicy,
    out: &mut String,
) -> Result<()> {
    let line_start = out.len();
    for segment in segments(&line.text) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder { identifier, raw } => match map.get(identifier) {
                Some(value) => push_value(out, line_start, value),
                None => match policy {
                    UnresolvedPolicy::Keep => out.push_str(raw),
                    UnresolvedPolicy::Error => {
                        return Err(TemplateError::UnresolvedPlaceholder {
                            identifier: identifier.to_string(),
                            template: fragment.name().to_string(),
                            location: Location::new(
                                fragment.provenance().file.clone(),
                                line.number,
                                line.span.clone(),
                            ),
                        });
                    }
                },
            },
        }
    }
    Ok(())
}

fn push_value(out: &mut String, line_start: usize, value: &str) {
    let mut lines = value.split('\n');
    // Only the text since the last line break counts, earlier values included
    let current = out[line_start..].rsplit('\n').next().unwrap_or_default();
    let indent = blank_out(current);
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        // No trailing whitespace on blank lines
        if !line.is_empty() {
            out.push_str(&indent);
        }
        out.push_str(line);
    }
}

/// Replace every character with a space, keeping tabs
fn blank_out(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect()
}
