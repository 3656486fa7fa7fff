//! Project manifest (`.uproject`) and plugin descriptor (`.uplugin`) parsing.
//!
//! Both files are JSON documents using the engine's PascalCase keys. Unknown
//! keys are ignored and optional keys default, so descriptors written by newer
//! engine versions still parse.

use crate::models::{
    ModuleDescriptor, ModuleKind, ModuleOwner, PluginDescriptor, PluginModule, PluginReference,
    ProjectConfig, ScanSettings,
};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use thiserror::Error;

pub const MANIFEST_EXTENSION: &str = "uproject";
pub const PLUGIN_DESCRIPTOR_EXTENSION: &str = "uplugin";

const DEFAULT_LOADING_PHASE: &str = "Default";

/// Fatal manifest failures. Any of these aborts a scan.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("No project manifest in {root}: {reason}")]
    NotFound { root: Utf8PathBuf, reason: String },

    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {path}: {message}")]
    Parse { path: Utf8PathBuf, message: String },
}

/// Errors reading a single plugin descriptor. Callers record these as warnings.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Failed to read plugin descriptor {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse plugin descriptor {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawProject {
    #[serde(default)]
    engine_association: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    modules: Vec<RawModule>,
    #[serde(default)]
    plugins: Vec<RawPluginReference>,
    #[serde(default)]
    target_platforms: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawModule {
    name: String,
    #[serde(rename = "Type", default)]
    kind: ModuleKind,
    #[serde(default = "default_loading_phase")]
    loading_phase: String,
    #[serde(default)]
    additional_dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPluginReference {
    name: String,
    #[serde(default)]
    enabled: bool,
    #[serde(rename = "MarketplaceURL", default)]
    marketplace_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPlugin {
    #[serde(default)]
    friendly_name: String,
    #[serde(default)]
    version: Option<u64>,
    #[serde(default)]
    version_name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(rename = "MarketplaceURL", default)]
    marketplace_url: Option<String>,
    #[serde(default)]
    enabled_by_default: Option<bool>,
    #[serde(default)]
    modules: Vec<RawModule>,
}

fn default_loading_phase() -> String {
    DEFAULT_LOADING_PHASE.to_string()
}

/// Find the single `.uproject` file directly under `root`.
///
/// # Errors
///
/// [`ManifestError::NotFound`] if the root is unreadable, holds no manifest,
/// or holds more than one.
pub fn find_manifest(root: &Utf8Path) -> Result<Utf8PathBuf, ManifestError> {
    let entries = root.read_dir_utf8().map_err(|e| ManifestError::NotFound {
        root: root.to_path_buf(),
        reason: format!("cannot list directory: {}", e),
    })?;

    let mut candidates: Vec<Utf8PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(MANIFEST_EXTENSION))
        })
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(ManifestError::NotFound {
            root: root.to_path_buf(),
            reason: format!("no *.{} file", MANIFEST_EXTENSION),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(ManifestError::NotFound {
            root: root.to_path_buf(),
            reason: format!(
                "ambiguous, {} candidates: {}",
                candidates.len(),
                candidates
                    .iter()
                    .filter_map(|c| c.file_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }),
    }
}

/// Locate and parse the project manifest under `root`.
pub fn load_project_config(
    root: &Utf8Path,
    settings: &ScanSettings,
) -> Result<ProjectConfig, ManifestError> {
    let manifest_path = find_manifest(root)?;

    let content = fs::read_to_string(&manifest_path).map_err(|source| ManifestError::Read {
        path: manifest_path.clone(),
        source,
    })?;

    let config = parse_project_manifest(root, &manifest_path, &content, settings)?;

    tracing::info!(
        "Loaded manifest {} - engine: {}, modules: {}, plugins: {}",
        manifest_path,
        config.engine_version,
        config.modules.len(),
        config.plugins.len()
    );

    Ok(config)
}

/// Parse manifest text into a [`ProjectConfig`].
///
/// Module paths are derived as `<root>/<source_dir>/<Module>`; nothing is read
/// from disk here.
pub fn parse_project_manifest(
    root: &Utf8Path,
    manifest_path: &Utf8Path,
    content: &str,
    settings: &ScanSettings,
) -> Result<ProjectConfig, ManifestError> {
    let raw: RawProject = serde_json::from_str(strip_bom(content)).map_err(|e| ManifestError::Parse {
        path: manifest_path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut seen = HashSet::new();
    let mut modules = Vec::with_capacity(raw.modules.len());
    for module in raw.modules {
        if module.name.trim().is_empty() {
            return Err(ManifestError::Parse {
                path: manifest_path.to_path_buf(),
                message: "module entry with empty Name".to_string(),
            });
        }
        if !seen.insert(module.name.clone()) {
            return Err(ManifestError::Parse {
                path: manifest_path.to_path_buf(),
                message: format!("module '{}' is declared more than once", module.name),
            });
        }

        modules.push(ModuleDescriptor {
            path: root.join(&settings.source_dir).join(&module.name),
            name: module.name,
            kind: module.kind,
            load_phase: module.loading_phase,
            dependencies: module.additional_dependencies,
            owner: ModuleOwner::Project,
        });
    }

    let plugins = raw
        .plugins
        .into_iter()
        .map(|p| PluginReference {
            name: p.name,
            enabled: p.enabled,
            marketplace_url: p.marketplace_url.filter(|url| !url.is_empty()),
        })
        .collect();

    Ok(ProjectConfig {
        root: root.to_path_buf(),
        manifest_path: manifest_path.to_path_buf(),
        name: manifest_path.file_stem().unwrap_or_default().to_string(),
        engine_version: raw.engine_association,
        description: raw.description.filter(|d| !d.is_empty()),
        category: raw.category.filter(|c| !c.is_empty()),
        modules,
        plugins,
        target_platforms: raw.target_platforms,
    })
}

/// Read and parse a `.uplugin` descriptor.
///
/// The plugin's install path is the descriptor's parent directory, and its name
/// is the descriptor's file stem.
pub fn load_plugin_descriptor(path: &Utf8Path) -> Result<PluginDescriptor, DescriptorError> {
    let content = fs::read_to_string(path).map_err(|source| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawPlugin = serde_json::from_str(strip_bom(&content)).map_err(|source| {
        DescriptorError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let name = path.file_stem().unwrap_or_default().to_string();
    let version = raw
        .version_name
        .filter(|v| !v.is_empty())
        .or_else(|| raw.version.map(|v| v.to_string()))
        .unwrap_or_default();

    Ok(PluginDescriptor {
        friendly_name: if raw.friendly_name.is_empty() {
            name.clone()
        } else {
            raw.friendly_name
        },
        name,
        version,
        description: raw.description,
        category: raw.category,
        marketplace_url: raw.marketplace_url.filter(|url| !url.is_empty()),
        enabled_by_default: raw.enabled_by_default.unwrap_or(false),
        modules: raw
            .modules
            .into_iter()
            .map(|m| PluginModule {
                name: m.name,
                kind: m.kind,
                load_phase: m.loading_phase,
            })
            .collect(),
        install_path: path.parent().map(Utf8Path::to_path_buf).unwrap_or_default(),
    })
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}
