//! Content asset cataloguing.
//!
//! Every file under a content root becomes exactly one [`AssetRecord`]. Files
//! are never opened; the type tag comes from three lookup tables consulted in
//! order, first match wins:
//!
//! 1. [`EXTENSION_TIER`]: file extension (case-insensitive)
//! 2. [`PREFIX_TIER`]: base file name prefix (case-sensitive)
//! 3. [`DIRECTORY_TIER`]: a directory segment of the content-relative path
//!    (whole segment, case-insensitive, deepest segment first)
//!
//! Anything else is tagged [`UNKNOWN_ASSET_TYPE`].
//!
//! Project content is credited to its top-level folder (`Characters/BP_Hero`
//! belongs to `Characters`); files directly under the project root and all
//! plugin content belong to the root's owner.

use crate::metrics::ScanMetrics;
use crate::models::{AssetRecord, AssetStats, ClassificationTier, IssueKind, ScanIssue, UNKNOWN_ASSET_TYPE};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt::Display;
use walkdir::WalkDir;

/// Mount point of the project's own content directory.
pub const PROJECT_MOUNT_POINT: &str = "/Game";

pub const EXTENSION_TIER: &[(&str, &str)] = &[
    ("umap", "Level"),
    ("uexp", "CookedExport"),
    ("ubulk", "CookedBulkData"),
    ("wav", "SourceAudio"),
    ("ogg", "SourceAudio"),
    ("png", "SourceImage"),
    ("tga", "SourceImage"),
    ("fbx", "SourceMesh"),
];

pub const PREFIX_TIER: &[(&str, &str)] = &[
    ("BP_", "Blueprint"),
    ("BPI_", "BlueprintInterface"),
    ("WBP_", "WidgetBlueprint"),
    ("ABP_", "AnimBlueprint"),
    ("M_", "Material"),
    ("MI_", "MaterialInstance"),
    ("MF_", "MaterialFunction"),
    ("T_", "Texture"),
    ("SM_", "StaticMesh"),
    ("SK_", "SkeletalMesh"),
    ("SKEL_", "Skeleton"),
    ("PHYS_", "PhysicsAsset"),
    ("AM_", "AnimMontage"),
    ("AS_", "AnimSequence"),
    ("BS_", "BlendSpace"),
    ("SC_", "SoundCue"),
    ("SW_", "SoundWave"),
    ("P_", "ParticleSystem"),
    ("NS_", "NiagaraSystem"),
    ("DT_", "DataTable"),
    ("DA_", "DataAsset"),
    ("E_", "Enum"),
];

pub const DIRECTORY_TIER: &[(&str, &str)] = &[
    ("Materials", "Material"),
    ("Textures", "Texture"),
    ("Meshes", "StaticMesh"),
    ("Animations", "Animation"),
    ("Audio", "Sound"),
    ("Sounds", "Sound"),
    ("Particles", "ParticleSystem"),
    ("FX", "ParticleSystem"),
    ("UI", "WidgetBlueprint"),
    ("Blueprints", "Blueprint"),
    ("Maps", "Level"),
];

/// Classify a content-relative path.
pub fn classify(relative: &Utf8Path) -> (&'static str, ClassificationTier) {
    if let Some(ext) = relative.extension() {
        if let Some((_, tag)) = EXTENSION_TIER.iter().find(|(e, _)| e.eq_ignore_ascii_case(ext)) {
            return (*tag, ClassificationTier::Extension);
        }
    }

    if let Some(file_name) = relative.file_name() {
        if let Some((_, tag)) = PREFIX_TIER.iter().find(|(p, _)| file_name.starts_with(p)) {
            return (*tag, ClassificationTier::Prefix);
        }
    }

    if let Some(parent) = relative.parent() {
        for segment in parent.iter().rev() {
            if let Some((_, tag)) = DIRECTORY_TIER.iter().find(|(d, _)| d.eq_ignore_ascii_case(segment)) {
                return (*tag, ClassificationTier::Directory);
            }
        }
    }

    (UNKNOWN_ASSET_TYPE, ClassificationTier::Unclassified)
}

/// A content directory and where the engine mounts it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRoot {
    pub path: Utf8PathBuf,
    /// Virtual mount point, `/Game` for the project or `/<Plugin>` for plugins
    pub mount_point: String,
    /// Project or plugin name, the fallback owner for assets under this root
    pub owner: String,
}

impl ContentRoot {
    /// Owning module for a content-relative path.
    pub fn owner_of(&self, relative: &Utf8Path) -> String {
        if self.mount_point == PROJECT_MOUNT_POINT {
            if let Some(folder) = relative.parent().and_then(|p| p.iter().next()) {
                return folder.to_string();
            }
        }
        self.owner.clone()
    }
}

/// Records and statistics from one or more content roots.
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    pub assets: Vec<AssetRecord>,
    pub stats: AssetStats,
    pub issues: Vec<ScanIssue>,
}

impl ContentCatalog {
    pub fn merge(&mut self, other: ContentCatalog) {
        self.assets.extend(other.assets);
        self.stats.merge(other.stats);
        self.issues.extend(other.issues);
    }
}

/// Catalogue every root in order.
pub fn catalog_roots(roots: &[ContentRoot], metrics: &ScanMetrics) -> ContentCatalog {
    let mut catalog = ContentCatalog::default();
    for root in roots {
        catalog.merge(catalog_content(root, metrics));
    }

    tracing::info!(
        "Content scan: {} asset(s), {} bytes, {} type(s)",
        catalog.stats.total_count,
        catalog.stats.total_bytes,
        catalog.stats.by_type.len()
    );
    catalog
}

/// Recursively catalogue one content root. A missing root yields an empty
/// catalogue; the coordinator decides whether that is worth reporting.
pub fn catalog_content(root: &ContentRoot, metrics: &ScanMetrics) -> ContentCatalog {
    let mut catalog = ContentCatalog::default();

    if !root.path.is_dir() {
        tracing::debug!("No content directory at {}", root.path);
        return catalog;
    }

    for entry in WalkDir::new(&root.path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.path.to_string());
                tracing::warn!("Cannot walk {}: {}", path, e);
                catalog.issues.push(ScanIssue::at(IssueKind::UnreadableFile, path, e.to_string()));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let size = size_or_issue(
            entry.metadata().map(|meta| meta.len()),
            &entry.path().display().to_string(),
            &mut catalog.issues,
        );

        let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => path,
            Err(path) => {
                tracing::warn!("Skipping non UTF-8 asset path {}", path.display());
                catalog.issues.push(ScanIssue::at(
                    IssueKind::UnreadableFile,
                    path.display().to_string(),
                    "path is not valid UTF-8",
                ));
                continue;
            }
        };

        let Ok(relative) = path.strip_prefix(&root.path) else {
            continue;
        };

        let asset = build_record(root, relative, size);
        tracing::trace!("{} -> {} ({:?})", asset.path, asset.asset_type, asset.tier);

        metrics.record_asset(asset.size);
        catalog.stats.record(&asset);
        catalog.assets.push(asset);
    }

    catalog
}

/// Unwrap a file size; a failed stat still catalogues the asset, with size 0
/// and an [`IssueKind::UnreadableFile`] issue.
fn size_or_issue<E: Display>(size: Result<u64, E>, path: &str, issues: &mut Vec<ScanIssue>) -> u64 {
    match size {
        Ok(size) => size,
        Err(e) => {
            tracing::warn!("Cannot stat {}: {}", path, e);
            issues.push(ScanIssue::at(IssueKind::UnreadableFile, path, format!("cannot read size: {}", e)));
            0
        }
    }
}

fn build_record(root: &ContentRoot, relative: &Utf8Path, size: u64) -> AssetRecord {
    let (asset_type, tier) = classify(relative);
    let segments: Vec<&str> = relative.iter().collect();
    let name = relative.file_stem().unwrap_or_default().to_string();

    let mut package_segments: Vec<&str> = segments[..segments.len().saturating_sub(1)].to_vec();
    package_segments.push(&name);

    AssetRecord {
        path: Utf8PathBuf::from(segments.join("/")),
        package_path: format!("{}/{}", root.mount_point.trim_end_matches('/'), package_segments.join("/")),
        name,
        asset_type: asset_type.to_string(),
        tier,
        size,
        module: root.owner_of(relative),
    }
}
