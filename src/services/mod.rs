//! Services module - the scanners that turn a project directory into an index.
//!
//! Every service here is synchronous and file-system bound; the coordinator
//! decides whether they run one after another or on tokio's blocking pool.
//!
//! # Components
//!
//! - [`manifest`]: Locates and parses the `.uproject` manifest. The only
//!   failure that aborts a scan.
//! - [`plugins`]: Discovers `.uplugin` descriptors under the plugins directory.
//! - [`declarations`]: Line scanner for `UCLASS`/`USTRUCT`/`UENUM`/`UINTERFACE`
//!   annotated types, plus the identifier reference index used by `usages`.
//! - [`content`]: Walks content roots and classifies every file by extension,
//!   name prefix, then directory.
//! - [`validation`]: Manifest versus file-system cross-checks and plugin module
//!   correlation.
//! - [`project_scanner`]: The coordinator tying everything into a
//!   [`crate::index::ProjectIndex`].
//!
//! Recoverable problems are never returned as errors from these services.
//! They are collected as [`crate::models::ScanIssue`] values and travel with
//! the results.

pub mod content;
pub mod declarations;
pub mod manifest;
pub mod plugins;
pub mod project_scanner;
pub mod validation;

pub use content::{catalog_content, catalog_roots, classify, ContentCatalog, ContentRoot};
pub use declarations::{split_specifiers, DeclarationScanner, SourceScan};
pub use manifest::{find_manifest, load_plugin_descriptor, load_project_config, DescriptorError, ManifestError};
pub use plugins::{scan_plugins, PluginScan};
pub use project_scanner::{ProjectScanner, ScanError};
pub use validation::{validate_project, FsProbe, RealFs};
