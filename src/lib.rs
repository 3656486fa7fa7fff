// ueindex - Static project indexer for Unreal-style game projects
//
// This is the library crate: manifest and plugin parsing, the reflected type
// scanner, the content cataloguer and the queryable project index.
// The binary crate (main.rs) provides the command line entry point.

pub mod config;
pub mod index;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use index::{ProjectIndex, ProjectSummary, QueryError, SearchResults, Usages};
pub use models::{
    AssetRecord, DeclarationKind, IssueKind, ProjectConfig, ScanIssue, ScanSettings, TypeDeclaration,
    ValidationReport,
};
pub use services::{ManifestError, ProjectScanner, ScanError};
pub use state::{SessionEvent, SessionManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
