//! Scan coordinator.
//!
//! Runs the manifest parser first (its failure aborts the scan), then the
//! plugin, declaration and content scans, and merges everything into a
//! [`ProjectIndex`]. Both entry points produce identical indexes:
//!
//! - [`ProjectScanner::scan`] runs everything on the calling thread
//! - [`ProjectScanner::scan_concurrent`] runs the independent sub-scans on
//!   tokio's blocking pool and merges only after all of them have finished
//!
//! Discovery order is fixed: project modules in manifest order, then plugin
//! modules in plugin-name order; project content before plugin content.

use crate::index::{ProjectIndex, ScanParts};
use crate::metrics::ScanMetrics;
use crate::models::{IssueKind, ModuleDescriptor, PluginDescriptor, ProjectConfig, ScanIssue, ScanSettings};
use crate::services::content::{catalog_roots, ContentCatalog, ContentRoot, PROJECT_MOUNT_POINT};
use crate::services::declarations::{DeclarationScanner, SourceScan};
use crate::services::manifest::{load_project_config, ManifestError};
use crate::services::plugins::{scan_plugins, PluginScan};
use crate::services::validation::{resolve_plugin_modules, RealFs};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that prevent an index from being built at all.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Builds [`ProjectIndex`] values from project directories.
#[derive(Debug, Clone, Default)]
pub struct ProjectScanner {
    settings: ScanSettings,
}

impl ProjectScanner {
    pub fn new(settings: ScanSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan a project synchronously.
    ///
    /// # Errors
    ///
    /// Only manifest failures are returned; every other problem is recorded in
    /// [`ProjectIndex::issues`].
    pub fn scan(&self, root: &Utf8Path) -> Result<ProjectIndex, ManifestError> {
        let metrics = ScanMetrics::new();
        tracing::info!("Scanning project at {}", root);

        let config = load_project_config(root, &self.settings)?;

        let plugin_scan = scan_plugins(&root.join(&self.settings.plugins_dir));
        let declarations = DeclarationScanner::new(self.settings.clone());
        let project_source = declarations.scan_modules(&config.modules, &metrics);
        let project_content = catalog_roots(&[project_content_root(&config, &self.settings)], &metrics);

        let (plugin_modules, resolution_issues) =
            resolve_plugin_modules(&config, &plugin_scan.plugins, &self.settings, &RealFs);
        let plugin_source = declarations.scan_modules(&plugin_modules, &metrics);
        let plugin_content = catalog_roots(&plugin_content_roots(&plugin_scan.plugins, &self.settings), &metrics);

        Ok(self.assemble(
            config,
            plugin_scan,
            plugin_modules,
            resolution_issues,
            (project_source, plugin_source),
            (project_content, plugin_content),
            &metrics,
        ))
    }

    /// Scan a project with the plugin, declaration and content scans running
    /// concurrently.
    pub async fn scan_concurrent(&self, root: Utf8PathBuf) -> Result<ProjectIndex, ScanError> {
        let metrics = Arc::new(ScanMetrics::new());
        tracing::info!("Scanning project at {} (concurrent)", root);

        let config = {
            let root = root.clone();
            let settings = self.settings.clone();
            tokio::task::spawn_blocking(move || load_project_config(&root, &settings)).await??
        };
        let config = Arc::new(config);

        let plugins_task = {
            let plugins_dir = root.join(&self.settings.plugins_dir);
            tokio::task::spawn_blocking(move || scan_plugins(&plugins_dir))
        };
        let source_task = {
            let config = Arc::clone(&config);
            let settings = self.settings.clone();
            let metrics = Arc::clone(&metrics);
            tokio::task::spawn_blocking(move || DeclarationScanner::new(settings).scan_modules(&config.modules, &metrics))
        };
        let content_task = {
            let roots = vec![project_content_root(&config, &self.settings)];
            let metrics = Arc::clone(&metrics);
            tokio::task::spawn_blocking(move || catalog_roots(&roots, &metrics))
        };

        // Join barrier: nothing is merged until every sub-scan has finished
        let (plugin_scan, project_source, project_content) = tokio::try_join!(plugins_task, source_task, content_task)?;

        let (plugin_modules, resolution_issues) =
            resolve_plugin_modules(&config, &plugin_scan.plugins, &self.settings, &RealFs);

        let plugin_source_task = {
            let modules = plugin_modules.clone();
            let settings = self.settings.clone();
            let metrics = Arc::clone(&metrics);
            tokio::task::spawn_blocking(move || DeclarationScanner::new(settings).scan_modules(&modules, &metrics))
        };
        let plugin_content_task = {
            let roots = plugin_content_roots(&plugin_scan.plugins, &self.settings);
            let metrics = Arc::clone(&metrics);
            tokio::task::spawn_blocking(move || catalog_roots(&roots, &metrics))
        };
        let (plugin_source, plugin_content) = tokio::try_join!(plugin_source_task, plugin_content_task)?;

        let config = Arc::unwrap_or_clone(config);
        Ok(self.assemble(
            config,
            plugin_scan,
            plugin_modules,
            resolution_issues,
            (project_source, plugin_source),
            (project_content, plugin_content),
            &metrics,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        config: ProjectConfig,
        plugin_scan: PluginScan,
        plugin_modules: Vec<ModuleDescriptor>,
        resolution_issues: Vec<ScanIssue>,
        (mut source, plugin_source): (SourceScan, SourceScan),
        (mut content, plugin_content): (ContentCatalog, ContentCatalog),
        metrics: &ScanMetrics,
    ) -> ProjectIndex {
        source.merge(plugin_source);
        content.merge(plugin_content);

        let mut issues = plugin_scan.issues;
        issues.extend(resolution_issues);

        let content_root = config.root.join(&self.settings.content_dir);
        if !content_root.is_dir() {
            tracing::warn!("Project content directory missing: {}", content_root);
            issues.push(ScanIssue::at(
                IssueKind::ContentRootMissing,
                content_root,
                "content directory does not exist",
            ));
        }

        let mut modules = config.modules.clone();
        modules.extend(plugin_modules);

        let index = ProjectIndex::build(
            ScanParts {
                config,
                settings: self.settings.clone(),
                modules,
                plugins: plugin_scan.plugins,
                source,
                content,
                issues,
            },
            metrics,
        );

        index.metrics.log();
        index
    }
}

fn project_content_root(config: &ProjectConfig, settings: &ScanSettings) -> ContentRoot {
    ContentRoot {
        path: config.root.join(&settings.content_dir),
        mount_point: PROJECT_MOUNT_POINT.to_string(),
        owner: config.name.clone(),
    }
}

fn plugin_content_roots(plugins: &[PluginDescriptor], settings: &ScanSettings) -> Vec<ContentRoot> {
    if !settings.include_plugin_content {
        return Vec::new();
    }

    plugins
        .iter()
        .map(|plugin| ContentRoot {
            path: plugin.install_path.join(&settings.content_dir),
            mount_point: format!("/{}", plugin.name),
            owner: plugin.name.clone(),
        })
        .collect()
}
