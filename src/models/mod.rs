//! Data models for ueindex.
//!
//! Everything here is plain data with no behaviour that reaches back into the
//! scanners, so results can be serialized verbatim by any front end:
//! - [`ProjectConfig`], [`ModuleDescriptor`], [`PluginDescriptor`]: what the manifests declare
//! - [`TypeDeclaration`]: a reflected class/struct/enum/interface found in source
//! - [`AssetRecord`] and [`AssetStats`]: the content catalogue
//! - [`ScanIssue`] and [`ValidationReport`]: non-fatal findings
//! - [`ScanSettings`]: scanner configuration loaded by [`ConfigManager`](crate::config::ConfigManager)

pub mod asset;
pub mod config;
pub mod declaration;
pub mod issue;
pub mod project;

pub use asset::{AssetRecord, AssetStats, ClassificationTier, TypeStats, UNKNOWN_ASSET_TYPE};
pub use config::ScanSettings;
pub use declaration::{DeclarationKind, TypeDeclaration};
pub use issue::{IssueKind, ScanIssue, ValidationReport};
pub use project::{
    ModuleDescriptor, ModuleKind, ModuleOwner, PluginDescriptor, PluginModule, PluginReference,
    ProjectConfig,
};
