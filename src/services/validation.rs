//! Manifest versus file-system cross-checks.
//!
//! Validation never mutates anything and never fails: every problem becomes an
//! entry in the [`ValidationReport`]. File-system access goes through
//! [`FsProbe`] so the checks can be exercised without a real project tree.

use crate::models::{
    IssueKind, ModuleDescriptor, ModuleOwner, PluginDescriptor, ProjectConfig, ScanIssue, ScanSettings,
    ValidationReport,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs::File;

/// The file-system questions validation needs answered.
#[cfg_attr(test, mockall::automock)]
pub trait FsProbe {
    fn is_dir(&self, path: &Utf8Path) -> bool;
    fn is_readable_file(&self, path: &Utf8Path) -> bool;
}

/// [`FsProbe`] backed by the real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsProbe for RealFs {
    fn is_dir(&self, path: &Utf8Path) -> bool {
        path.is_dir()
    }

    fn is_readable_file(&self, path: &Utf8Path) -> bool {
        path.is_file() && File::open(path).is_ok()
    }
}

/// Expected source directory of a plugin module.
pub fn plugin_module_path(plugin: &PluginDescriptor, module: &str, settings: &ScanSettings) -> Utf8PathBuf {
    plugin.install_path.join(&settings.source_dir).join(module)
}

/// Correlate plugin module references with the project's module graph.
///
/// A plugin module resolves when it names a project module or when its source
/// directory exists under the plugin. Resolved modules that are not already
/// project modules are returned as new descriptors owned by the plugin;
/// unresolved ones are reported, never dropped silently.
pub fn resolve_plugin_modules(
    config: &ProjectConfig,
    plugins: &[PluginDescriptor],
    settings: &ScanSettings,
    probe: &dyn FsProbe,
) -> (Vec<ModuleDescriptor>, Vec<ScanIssue>) {
    let mut resolved = Vec::new();
    let mut issues = Vec::new();
    let mut known: HashSet<&str> = config.module_names().collect();

    for plugin in plugins {
        for module in &plugin.modules {
            if known.contains(module.name.as_str()) {
                continue;
            }

            let path = plugin_module_path(plugin, &module.name, settings);
            if probe.is_dir(&path) {
                known.insert(module.name.as_str());
                resolved.push(ModuleDescriptor {
                    name: module.name.clone(),
                    kind: module.kind.clone(),
                    load_phase: module.load_phase.clone(),
                    dependencies: Vec::new(),
                    path,
                    owner: ModuleOwner::Plugin(plugin.name.clone()),
                });
            } else {
                tracing::warn!("Plugin {} lists unresolved module {}", plugin.name, module.name);
                issues.push(ScanIssue::at(
                    IssueKind::UnresolvedPluginModule,
                    path,
                    format!(
                        "plugin '{}' lists module '{}' which is neither a project module nor a plugin source directory",
                        plugin.name, module.name
                    ),
                ));
            }
        }
    }

    (resolved, issues)
}

/// Run every check and collect the structured findings in a stable order:
/// manifest, module directories, dependencies, plugin modules, content root.
pub fn collect_issues(
    config: &ProjectConfig,
    plugins: &[PluginDescriptor],
    settings: &ScanSettings,
    probe: &dyn FsProbe,
) -> Vec<ScanIssue> {
    let mut issues = Vec::new();

    if !probe.is_readable_file(&config.manifest_path) {
        issues.push(ScanIssue::at(
            IssueKind::UnreadableFile,
            &config.manifest_path,
            "project manifest is not readable",
        ));
    }

    for module in &config.modules {
        if !probe.is_dir(&module.path) {
            issues.push(ScanIssue::at(
                IssueKind::ModuleDirectoryMissing,
                &module.path,
                format!("module '{}' directory is missing", module.name),
            ));
        }
    }

    let (plugin_modules, plugin_issues) = resolve_plugin_modules(config, plugins, settings, probe);
    let known: HashSet<&str> = config
        .module_names()
        .chain(plugin_modules.iter().map(|m| m.name.as_str()))
        .collect();

    for module in &config.modules {
        for dependency in &module.dependencies {
            if !known.contains(dependency.as_str()) {
                issues.push(ScanIssue::new(
                    IssueKind::UnresolvedDependency,
                    format!(
                        "module '{}' depends on '{}', which is not a declared module",
                        module.name, dependency
                    ),
                ));
            }
        }
    }

    issues.extend(plugin_issues);

    let content_root = config.root.join(&settings.content_dir);
    if !probe.is_dir(&content_root) {
        issues.push(ScanIssue::at(
            IssueKind::ContentRootMissing,
            content_root,
            "content directory does not exist",
        ));
    }

    issues
}

/// Cross-check a manifest against the file system.
pub fn validate_project(
    config: &ProjectConfig,
    plugins: &[PluginDescriptor],
    settings: &ScanSettings,
    probe: &dyn FsProbe,
) -> ValidationReport {
    let issues = collect_issues(config, plugins, settings, probe);

    if issues.is_empty() {
        tracing::info!("Validation of {} passed", config.name);
    } else {
        tracing::warn!("Validation of {} found {} issue(s)", config.name, issues.len());
    }

    ValidationReport::from_issues(&issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModuleKind, PluginModule};

    fn module(name: &str, dependencies: &[&str]) -> ModuleDescriptor {
        ModuleDescriptor {
            name: name.to_string(),
            kind: ModuleKind::Runtime,
            load_phase: "Default".to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            path: Utf8PathBuf::from(format!("/proj/Source/{}", name)),
            owner: ModuleOwner::Project,
        }
    }

    fn config(modules: Vec<ModuleDescriptor>) -> ProjectConfig {
        ProjectConfig {
            root: "/proj".into(),
            manifest_path: "/proj/Proj.uproject".into(),
            name: "Proj".into(),
            engine_version: "5.3".into(),
            description: None,
            category: None,
            modules,
            plugins: Vec::new(),
            target_platforms: Vec::new(),
        }
    }

    fn plugin(name: &str, modules: &[&str]) -> PluginDescriptor {
        PluginDescriptor {
            name: name.to_string(),
            friendly_name: name.to_string(),
            version: "1.0".into(),
            description: String::new(),
            category: String::new(),
            marketplace_url: None,
            enabled_by_default: true,
            modules: modules
                .iter()
                .map(|m| PluginModule {
                    name: m.to_string(),
                    kind: ModuleKind::Runtime,
                    load_phase: "Default".into(),
                })
                .collect(),
            install_path: Utf8PathBuf::from(format!("/proj/Plugins/{}", name)),
        }
    }

    #[test]
    fn test_missing_game_directory_reported() {
        let config = config(vec![module("Core", &[]), module("Game", &["Core"])]);

        let mut probe = MockFsProbe::new();
        probe.expect_is_readable_file().return_const(true);
        probe
            .expect_is_dir()
            .returning(|path| path.as_str() != "/proj/Source/Game");

        let report = validate_project(&config, &[], &ScanSettings::default(), &probe);
        assert!(!report.valid);
        assert_eq!(report.issues.len(), 1);
        assert!(report.mentions("'Game' directory is missing"));
        assert!(!report.mentions("'Core'"));
    }

    #[test]
    fn test_unresolved_dependency_and_content_root() {
        let config = config(vec![module("Game", &["Core"])]);

        let mut probe = MockFsProbe::new();
        probe.expect_is_readable_file().return_const(true);
        probe
            .expect_is_dir()
            .returning(|path| path.as_str() != "/proj/Content");

        let issues = collect_issues(&config, &[], &ScanSettings::default(), &probe);
        let kinds: Vec<IssueKind> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![IssueKind::UnresolvedDependency, IssueKind::ContentRootMissing]);
    }

    #[test]
    fn test_unreadable_manifest() {
        let config = config(Vec::new());

        let mut probe = MockFsProbe::new();
        probe.expect_is_readable_file().return_const(false);
        probe.expect_is_dir().return_const(true);

        let report = validate_project(&config, &[], &ScanSettings::default(), &probe);
        assert!(!report.valid);
        assert!(report.mentions("manifest is not readable"));
    }

    #[test]
    fn test_plugin_modules_resolve_by_directory_or_name() {
        let config = config(vec![module("Game", &["WeatherRuntime"])]);
        let plugins = vec![plugin("Weather", &["WeatherRuntime", "Game", "Ghost"])];

        let mut probe = MockFsProbe::new();
        probe
            .expect_is_dir()
            .returning(|path| path.as_str() != "/proj/Plugins/Weather/Source/Ghost");

        let (resolved, issues) = resolve_plugin_modules(&config, &plugins, &ScanSettings::default(), &probe);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "WeatherRuntime");
        assert_eq!(resolved[0].owner, ModuleOwner::Plugin("Weather".into()));
        assert_eq!(resolved[0].path, Utf8PathBuf::from("/proj/Plugins/Weather/Source/WeatherRuntime"));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnresolvedPluginModule);
        assert!(issues[0].message.contains("Ghost"));
    }

    #[test]
    fn test_dependency_on_plugin_module_resolves() {
        let config = config(vec![module("Game", &["WeatherRuntime"])]);
        let plugins = vec![plugin("Weather", &["WeatherRuntime"])];

        let mut probe = MockFsProbe::new();
        probe.expect_is_readable_file().return_const(true);
        probe.expect_is_dir().return_const(true);

        let report = validate_project(&config, &plugins, &ScanSettings::default(), &probe);
        assert!(report.valid, "unexpected issues: {:?}", report.issues);
    }
}
