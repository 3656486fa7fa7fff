//! The merged, read-only project index.
//!
//! A [`ProjectIndex`] is built once from the sub-scan outputs and never
//! mutated afterwards; a re-scan builds a new one. Queries live in
//! [`query`].

pub mod query;

use crate::metrics::{ScanMetrics, ScanSummary};
use crate::models::{
    AssetRecord, AssetStats, DeclarationKind, IssueKind, ModuleDescriptor, PluginDescriptor, ProjectConfig,
    ScanIssue, ScanSettings, TypeDeclaration,
};
use crate::services::content::ContentCatalog;
use crate::services::declarations::{ReferenceIndex, SourceScan};
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub use query::{QueryError, SearchResults, Usages};

/// Everything the coordinator gathered for one scan, ready to be merged.
#[derive(Debug)]
pub struct ScanParts {
    pub config: ProjectConfig,
    pub settings: ScanSettings,
    /// Project modules followed by resolved plugin modules
    pub modules: Vec<ModuleDescriptor>,
    pub plugins: Vec<PluginDescriptor>,
    pub source: SourceScan,
    pub content: ContentCatalog,
    /// Issues raised outside the source and content scans
    pub issues: Vec<ScanIssue>,
}

/// Headline numbers for a scanned project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub engine_version: String,
    pub modules: usize,
    pub plugins: usize,
    /// Canonical declarations per kind, in first-seen order
    pub declarations: IndexMap<DeclarationKind, usize>,
    pub assets: AssetStats,
    pub issues: usize,
    pub scan: ScanSummary,
}

/// Queryable index of one project scan.
#[derive(Debug, Clone)]
pub struct ProjectIndex {
    pub config: ProjectConfig,
    pub settings: ScanSettings,
    pub modules: Vec<ModuleDescriptor>,
    pub plugins: Vec<PluginDescriptor>,

    /// Every declaration in discovery order, duplicates included
    pub declarations: Vec<TypeDeclaration>,
    pub assets: Vec<AssetRecord>,
    pub asset_stats: AssetStats,

    /// Non-fatal findings from the scan, in the order they were raised
    pub issues: Vec<ScanIssue>,
    /// Counters frozen at the end of the scan
    pub metrics: ScanSummary,

    source_files: Vec<Utf8PathBuf>,
    references: ReferenceIndex,

    /// Name -> index into `declarations` (last seen wins across kinds)
    class_by_name: HashMap<String, usize>,
    /// Indices of the last declaration seen for each `kind + name`
    canonical: HashSet<usize>,
    /// Parent name -> indices of canonical declarations naming it as parent
    children_by_parent: IndexMap<String, Vec<usize>>,
    /// Asset type tag -> indices into `assets`
    assets_by_type: IndexMap<String, Vec<usize>>,
}

impl ProjectIndex {
    /// Merge sub-scan outputs into an index.
    ///
    /// Duplicate `kind + name` declarations are kept in `declarations`, the
    /// last one scanned becomes canonical, and each redeclaration adds a
    /// [`IssueKind::DuplicateDeclaration`] note pointing at the first.
    pub fn build(parts: ScanParts, metrics: &ScanMetrics) -> Self {
        let ScanParts {
            config,
            settings,
            modules,
            plugins,
            source,
            content,
            mut issues,
        } = parts;

        issues.extend(source.issues);
        issues.extend(content.issues);

        let declarations = source.declarations;
        let mut first_seen: HashMap<(DeclarationKind, &str), usize> = HashMap::new();
        let mut last_seen: HashMap<(DeclarationKind, &str), usize> = HashMap::new();
        let mut class_by_name: HashMap<String, usize> = HashMap::with_capacity(declarations.len());

        for (i, decl) in declarations.iter().enumerate() {
            let key = (decl.kind, decl.name.as_str());
            if let Some(&first) = first_seen.get(&key) {
                issues.push(duplicate_note(&declarations[first], decl));
            } else {
                first_seen.insert(key, i);
            }
            last_seen.insert(key, i);
            class_by_name.insert(decl.name.clone(), i);
        }
        let canonical: HashSet<usize> = last_seen.into_values().collect();

        let mut children_by_parent: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, decl) in declarations.iter().enumerate() {
            if !canonical.contains(&i) {
                continue;
            }
            if let Some(parent) = &decl.parent {
                children_by_parent.entry(parent.clone()).or_default().push(i);
            }
        }

        let mut assets_by_type: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, asset) in content.assets.iter().enumerate() {
            assets_by_type.entry(asset.asset_type.clone()).or_default().push(i);
        }

        let scan_metrics = metrics.snapshot(issues.len());

        Self {
            config,
            settings,
            modules,
            plugins,
            declarations,
            assets: content.assets,
            asset_stats: content.stats,
            issues,
            metrics: scan_metrics,
            source_files: source.files,
            references: source.references,
            class_by_name,
            canonical,
            children_by_parent,
            assets_by_type,
        }
    }

    /// Canonical declaration for `name`.
    pub fn declaration(&self, name: &str) -> Option<&TypeDeclaration> {
        self.class_by_name.get(name).map(|&i| &self.declarations[i])
    }

    /// Canonical declarations, one per `kind + name`, in discovery order.
    pub fn canonical_declarations(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.declarations
            .iter()
            .enumerate()
            .filter(|(i, _)| self.canonical.contains(i))
            .map(|(_, d)| d)
    }

    /// Declarations whose recorded parent is `name`.
    pub fn children_of(&self, name: &str) -> Vec<&TypeDeclaration> {
        self.children_by_parent
            .get(name)
            .map(|ids| ids.iter().map(|&i| &self.declarations[i]).collect())
            .unwrap_or_default()
    }

    pub fn declarations_in_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a TypeDeclaration> + 'a {
        self.canonical_declarations().filter(move |d| d.module == module)
    }

    pub fn assets_of_type(&self, asset_type: &str) -> Vec<&AssetRecord> {
        self.assets_by_type
            .get(asset_type)
            .map(|ids| ids.iter().map(|&i| &self.assets[i]).collect())
            .unwrap_or_default()
    }

    /// Asset type tags in first-seen order.
    pub fn asset_types(&self) -> impl Iterator<Item = &str> {
        self.assets_by_type.keys().map(String::as_str)
    }

    pub fn source_files(&self) -> &[Utf8PathBuf] {
        &self.source_files
    }

    pub fn issues_of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &ScanIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn summary(&self) -> ProjectSummary {
        let mut declarations: IndexMap<DeclarationKind, usize> = IndexMap::new();
        for decl in self.canonical_declarations() {
            *declarations.entry(decl.kind).or_default() += 1;
        }

        ProjectSummary {
            name: self.config.name.clone(),
            engine_version: self.config.engine_version.clone(),
            modules: self.modules.len(),
            plugins: self.plugins.len(),
            declarations,
            assets: self.asset_stats.clone(),
            issues: self.issues.len(),
            scan: self.metrics,
        }
    }
}

fn duplicate_note(first: &TypeDeclaration, again: &TypeDeclaration) -> ScanIssue {
    let parents = if first.parent == again.parent {
        String::new()
    } else {
        format!(
            " (parent {} there, {} here)",
            first.parent.as_deref().unwrap_or("none"),
            again.parent.as_deref().unwrap_or("none")
        )
    };

    tracing::warn!(
        "{} '{}' declared again at {}, first at {}",
        again.kind,
        again.name,
        again.location(),
        first.location()
    );

    ScanIssue::at(
        IssueKind::DuplicateDeclaration,
        &again.file,
        format!(
            "{} '{}' was already declared at {}{}; this declaration replaces it",
            again.kind,
            again.name,
            first.location(),
            parents
        ),
    )
    .with_line(again.line)
}
