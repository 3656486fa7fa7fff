use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Identity of a scanned project, built from its `.uproject` manifest.
///
/// Created once per scan and never updated in place; a re-scan produces a new
/// value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectConfig {
    pub root: Utf8PathBuf,
    pub manifest_path: Utf8PathBuf,

    /// Manifest file stem, e.g. `Shooter` for `Shooter.uproject`
    pub name: String,

    /// `EngineAssociation` from the manifest (empty when absent)
    pub engine_version: String,
    pub description: Option<String>,
    pub category: Option<String>,

    pub modules: Vec<ModuleDescriptor>,
    pub plugins: Vec<PluginReference>,
    pub target_platforms: Vec<String>,
}

impl ProjectConfig {
    /// Look up a declared module by name.
    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Names of all declared modules, in manifest order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }
}

/// Kind of a source module, as written in the `Type` field of a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    #[default]
    Runtime,
    RuntimeNoCommandlet,
    RuntimeAndProgram,
    CookedOnly,
    UncookedOnly,
    Developer,
    DeveloperTool,
    Editor,
    EditorNoCommandlet,
    EditorAndProgram,
    Program,
    ServerOnly,
    ClientOnly,
    ClientOnlyNoCommandlet,
    #[serde(other)]
    Other,
}

/// Which descriptor declared a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name")]
pub enum ModuleOwner {
    Project,
    Plugin(String),
}

/// A single source module.
///
/// Dependencies are kept as names and resolved lazily against the owning
/// [`ProjectConfig`], so modules may reference each other in any order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub kind: ModuleKind,
    pub load_phase: String,
    pub dependencies: Vec<String>,
    pub path: Utf8PathBuf,
    pub owner: ModuleOwner,
}

/// A plugin entry from the project manifest's `Plugins` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginReference {
    pub name: String,
    pub enabled: bool,
    pub marketplace_url: Option<String>,
}

/// A module entry inside a plugin descriptor.
///
/// This is only a name reference; the coordinator decides whether it resolves
/// to a real module directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginModule {
    pub name: String,
    pub kind: ModuleKind,
    pub load_phase: String,
}

/// A parsed `.uplugin` descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginDescriptor {
    /// Descriptor file stem
    pub name: String,
    pub friendly_name: String,
    pub version: String,
    pub description: String,
    pub category: String,
    pub marketplace_url: Option<String>,
    pub enabled_by_default: bool,
    pub modules: Vec<PluginModule>,
    pub install_path: Utf8PathBuf,
}

impl PluginDescriptor {
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }
}
