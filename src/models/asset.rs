use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::Serialize;

/// Tag given to assets no classification tier recognised.
pub const UNKNOWN_ASSET_TYPE: &str = "Unknown";

/// Which heuristic tier produced an asset's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassificationTier {
    Extension,
    Prefix,
    Directory,
    Unclassified,
}

/// A single file under a content root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRecord {
    /// File stem, e.g. `BP_Hero`
    pub name: String,
    /// Path relative to the content root, always `/`-separated
    pub path: Utf8PathBuf,
    /// Engine virtual path, e.g. `/Game/Characters/BP_Hero`
    pub package_path: String,
    pub asset_type: String,
    pub tier: ClassificationTier,
    pub size: u64,
    /// Top-level content folder for project assets, plugin name for plugin assets
    pub module: String,
}

impl AssetRecord {
    pub fn is_classified(&self) -> bool {
        self.tier != ClassificationTier::Unclassified
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    pub count: usize,
    pub total_bytes: u64,
}

/// Aggregate count and size per asset type, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetStats {
    pub total_count: usize,
    pub total_bytes: u64,
    pub by_type: IndexMap<String, TypeStats>,
}

impl AssetStats {
    pub fn record(&mut self, asset: &AssetRecord) {
        self.total_count += 1;
        self.total_bytes += asset.size;
        let entry = self.by_type.entry(asset.asset_type.clone()).or_default();
        entry.count += 1;
        entry.total_bytes += asset.size;
    }

    pub fn merge(&mut self, other: AssetStats) {
        self.total_count += other.total_count;
        self.total_bytes += other.total_bytes;
        for (tag, stats) in other.by_type {
            let entry = self.by_type.entry(tag).or_default();
            entry.count += stats.count;
            entry.total_bytes += stats.total_bytes;
        }
    }

    pub fn count_of(&self, asset_type: &str) -> usize {
        self.by_type.get(asset_type).map_or(0, |s| s.count)
    }
}
