use super::ProjectIndex;
use crate::models::{AssetRecord, TypeDeclaration, ValidationReport};
use crate::services::validation::{validate_project, FsProbe, RealFs};
use camino::Utf8PathBuf;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("No declaration named {0}")]
    UnknownDeclaration(String),

    #[error("Cyclic hierarchy: {} -> {repeated}", .chain.join(" -> "))]
    CyclicHierarchy { chain: Vec<String>, repeated: String },
}

/// Declarations and assets matching a search, each in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults<'a> {
    pub declarations: Vec<&'a TypeDeclaration>,
    pub assets: Vec<&'a AssetRecord>,
}

impl SearchResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.assets.is_empty()
    }
}

/// Best-effort textual usages of a type name.
#[derive(Debug, Clone, Serialize)]
pub struct Usages<'a> {
    pub name: String,
    /// Declarations whose parent is the name
    pub subclasses: Vec<&'a TypeDeclaration>,
    /// Files referencing the name outside its own declaration lines
    pub files: Vec<Utf8PathBuf>,
    /// Number of referencing lines across `files`
    pub count: usize,
}

impl ProjectIndex {
    /// Case-insensitive substring search over declaration names and over
    /// asset names and content paths.
    ///
    /// An empty (or all-whitespace) query matches nothing.
    pub fn search(&self, query: &str) -> SearchResults<'_> {
        SearchResults {
            declarations: self.search_declarations(query),
            assets: self.search_assets(query),
        }
    }

    pub fn search_declarations(&self, query: &str) -> Vec<&TypeDeclaration> {
        let Some(needle) = normalize_query(query) else {
            return Vec::new();
        };

        self.canonical_declarations()
            .filter(|d| d.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn search_assets(&self, query: &str) -> Vec<&AssetRecord> {
        let Some(needle) = normalize_query(query) else {
            return Vec::new();
        };

        self.assets
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle) || a.path.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    /// Walk parent links from `name` upward.
    ///
    /// The chain starts with `name` and ends at a declaration without a parent,
    /// or at a parent name that was never declared in this project (an engine
    /// base class, typically).
    ///
    /// # Errors
    ///
    /// - [`QueryError::UnknownDeclaration`] if `name` is not declared
    /// - [`QueryError::CyclicHierarchy`] if a name repeats; the walk stops at
    ///   the first repetition
    pub fn hierarchy(&self, name: &str) -> Result<Vec<String>, QueryError> {
        let mut current = self
            .declaration(name)
            .ok_or_else(|| QueryError::UnknownDeclaration(name.to_string()))?;

        let mut chain = vec![current.name.clone()];
        let mut visited: HashSet<&str> = HashSet::from([current.name.as_str()]);

        while let Some(parent) = current.parent.as_deref() {
            if !visited.insert(parent) {
                tracing::warn!("Cyclic hierarchy at {} while walking from {}", parent, name);
                return Err(QueryError::CyclicHierarchy {
                    chain,
                    repeated: parent.to_string(),
                });
            }
            chain.push(parent.to_string());

            match self.declaration(parent) {
                Some(decl) => current = decl,
                None => break,
            }
        }

        Ok(chain)
    }

    /// Subclasses of `name` plus every source file mentioning it as an
    /// identifier, excluding the lines where `name` itself is declared.
    ///
    /// Files are listed in scan order. Unknown names are not an error; they
    /// simply have no subclasses.
    pub fn usages(&self, name: &str) -> Usages<'_> {
        let declaration_sites: HashSet<(&Utf8PathBuf, u32)> = self
            .declarations
            .iter()
            .filter(|d| d.name == name)
            .map(|d| (&d.file, d.line))
            .collect();

        let mut file_ids: BTreeSet<usize> = BTreeSet::new();
        let mut count = 0;
        for reference in self.references.lookup(name) {
            let file = &self.source_files[reference.file];
            if declaration_sites.contains(&(file, reference.line)) {
                continue;
            }
            count += 1;
            file_ids.insert(reference.file);
        }

        Usages {
            name: name.to_string(),
            subclasses: self.children_of(name),
            files: file_ids.into_iter().map(|i| self.source_files[i].clone()).collect(),
            count,
        }
    }

    /// Re-check the manifest against the real file system.
    pub fn validate(&self) -> ValidationReport {
        self.validate_with(&RealFs)
    }

    pub fn validate_with(&self, probe: &dyn FsProbe) -> ValidationReport {
        validate_project(&self.config, &self.plugins, &self.settings, probe)
    }
}

fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
