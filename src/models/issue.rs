use camino::Utf8PathBuf;
use serde::Serialize;
use std::fmt;

/// Non-fatal conditions recorded while scanning or validating a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueKind {
    ModuleDirectoryMissing,
    UnreadableFile,
    OversizedFile,
    UnterminatedAnnotation,
    DuplicateDeclaration,
    MissingPluginDescriptor,
    InvalidPluginDescriptor,
    UnresolvedPluginModule,
    UnresolvedDependency,
    ContentRootMissing,
}

/// A warning attached to a scan result. Scanning always continues past these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanIssue {
    pub kind: IssueKind,
    pub path: Option<Utf8PathBuf>,
    pub line: Option<u32>,
    pub message: String,
}

impl ScanIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: None,
            line: None,
            message: message.into(),
        }
    }

    pub fn at(kind: IssueKind, path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: Some(path.into()),
            line: None,
            message: message.into(),
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.line) {
            (Some(path), Some(line)) => write!(f, "[{:?}] {}:{}: {}", self.kind, path, line, self.message),
            (Some(path), None) => write!(f, "[{:?}] {}: {}", self.kind, path, self.message),
            _ => write!(f, "[{:?}] {}", self.kind, self.message),
        }
    }
}

/// Result of cross-checking a project manifest against the file system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

impl ValidationReport {
    pub fn from_issues(issues: &[ScanIssue]) -> Self {
        Self {
            valid: issues.is_empty(),
            issues: issues.iter().map(ToString::to_string).collect(),
        }
    }

    /// Whether any issue text mentions `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.issues.iter().any(|i| i.contains(needle))
    }
}
