//! Plugin discovery.
//!
//! Each immediate subdirectory of the plugins directory is a plugin candidate
//! holding (at most) one `.uplugin` descriptor. Plugin module names are kept
//! as references; resolving them against the project's modules is the
//! coordinator's job, so this scan never needs the manifest.

use crate::models::{IssueKind, PluginDescriptor, ScanIssue};
use crate::services::manifest::{load_plugin_descriptor, PLUGIN_DESCRIPTOR_EXTENSION};
use camino::{Utf8Path, Utf8PathBuf};

/// Output of a plugin scan.
#[derive(Debug, Clone, Default)]
pub struct PluginScan {
    pub plugins: Vec<PluginDescriptor>,
    pub issues: Vec<ScanIssue>,
}

/// Scan `plugins_dir` for plugin descriptors.
///
/// A missing plugins directory is normal for small projects and yields an
/// empty result without warnings. Subdirectories are visited in name order.
pub fn scan_plugins(plugins_dir: &Utf8Path) -> PluginScan {
    let mut scan = PluginScan::default();

    if !plugins_dir.is_dir() {
        tracing::debug!("No plugins directory at {}", plugins_dir);
        return scan;
    }

    let entries = match plugins_dir.read_dir_utf8() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot list plugins directory {}: {}", plugins_dir, e);
            scan.issues.push(ScanIssue::at(
                IssueKind::UnreadableFile,
                plugins_dir,
                format!("cannot list plugins directory: {}", e),
            ));
            return scan;
        }
    };

    let mut plugin_dirs: Vec<Utf8PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_dir())
        .collect();
    plugin_dirs.sort();

    for dir in plugin_dirs {
        let Some(descriptor_path) = find_descriptor(&dir) else {
            tracing::warn!("Plugin directory {} has no .{} descriptor, skipping", dir, PLUGIN_DESCRIPTOR_EXTENSION);
            scan.issues.push(ScanIssue::at(
                IssueKind::MissingPluginDescriptor,
                &dir,
                format!("no .{} descriptor", PLUGIN_DESCRIPTOR_EXTENSION),
            ));
            continue;
        };

        match load_plugin_descriptor(&descriptor_path) {
            Ok(plugin) => {
                tracing::debug!(
                    "Found plugin {} v{} with {} module(s)",
                    plugin.name,
                    plugin.version,
                    plugin.modules.len()
                );
                scan.plugins.push(plugin);
            }
            Err(e) => {
                tracing::warn!("Skipping plugin: {}", e);
                scan.issues.push(ScanIssue::at(
                    IssueKind::InvalidPluginDescriptor,
                    &descriptor_path,
                    e.to_string(),
                ));
            }
        }
    }

    tracing::info!("Plugin scan found {} plugin(s) in {}", scan.plugins.len(), plugins_dir);
    scan
}

/// First `.uplugin` file (by name) directly inside `dir`.
fn find_descriptor(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut descriptors: Vec<Utf8PathBuf> = dir
        .read_dir_utf8()
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(PLUGIN_DESCRIPTOR_EXTENSION))
        })
        .collect();
    descriptors.sort();
    descriptors.into_iter().next()
}
