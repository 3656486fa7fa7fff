use serde::{Deserialize, Serialize};

/// Scanner settings from `ueindex.yaml`, overridable through `UEINDEX_*`
/// environment variables.
///
/// Every field has a default, so a partial (or missing) file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Directory under the project (and each plugin) holding module sources
    pub source_dir: String,

    /// Directory under the project (and each plugin) holding content assets
    pub content_dir: String,

    /// Directory under the project holding plugins
    pub plugins_dir: String,

    /// File extensions (without dot) treated as scannable source text
    pub source_extensions: Vec<String>,

    /// Source files larger than this are skipped with a warning
    pub max_source_file_bytes: u64,

    /// Also catalogue `<plugin>/Content`
    pub include_plugin_content: bool,

    /// Run the plugin, declaration and content scans on separate blocking tasks
    pub concurrent_scan: bool,

    pub log_dir: String,
    pub debug_mode: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            content_dir: default_content_dir(),
            plugins_dir: default_plugins_dir(),
            source_extensions: vec!["h".to_string(), "cpp".to_string()],
            max_source_file_bytes: default_max_source_file_bytes(),
            include_plugin_content: true,
            concurrent_scan: true,
            log_dir: "logs".to_string(),
            debug_mode: false,
        }
    }
}

fn default_source_dir() -> String {
    "Source".to_string()
}

fn default_content_dir() -> String {
    "Content".to_string()
}

fn default_plugins_dir() -> String {
    "Plugins".to_string()
}

fn default_max_source_file_bytes() -> u64 {
    4 * 1024 * 1024
}

impl ScanSettings {
    /// Check whether a file extension names a scannable source file.
    pub fn is_source_extension(&self, extension: &str) -> bool {
        self.source_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}
