//! Template registry for storing and retrieving extracted fragments

use std::collections::HashMap;

use crate::error::{Result, TemplateError};

use super::fragment::Fragment;

/// Registry of all fragments extracted during one run
///
/// Fragments can only be added, never replaced or removed. Names are global:
/// registering or merging a name that is already present is an error.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    fragments: Vec<Fragment>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment under its own name
    pub fn register(&mut self, fragment: Fragment) -> Result<()> {
        if let Some(existing) = self.get(fragment.name()) {
            return Err(TemplateError::DuplicateTemplateName {
                name: fragment.name().to_string(),
                location: fragment.provenance().location(),
                first: existing.provenance().location(),
            });
        }

        tracing::debug!(
            name = fragment.name(),
            kind = %fragment.kind(),
            lines = fragment.len(),
            "registered template"
        );
        self.index
            .insert(fragment.name().to_string(), self.fragments.len());
        self.fragments.push(fragment);
        Ok(())
    }

    /// Get a fragment by name, failing if it does not exist
    pub fn lookup(&self, name: &str) -> Result<&Fragment> {
        self.get(name).ok_or_else(|| TemplateError::TemplateNotFound {
            name: name.to_string(),
        })
    }

    /// Get a fragment by name
    pub fn get(&self, name: &str) -> Option<&Fragment> {
        self.index.get(name).map(|&i| &self.fragments[i])
    }

    /// Check if a fragment exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All fragment names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|f| f.name())
    }

    /// All fragments in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Move every fragment of `other` into this registry
    ///
    /// Stops at the first name collision; fragments merged before it stay.
    pub fn merge(&mut self, other: Registry) -> Result<()> {
        for fragment in other.fragments {
            self.register(fragment)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
