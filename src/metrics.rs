// Scan metrics module
//
// Lightweight counters shared by the sub-scans of a single project scan

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for one scan.
///
/// Uses atomic operations so the plugin, declaration and content scans can
/// update the same instance from separate blocking tasks without locks.
#[derive(Debug)]
pub struct ScanMetrics {
    /// Source files scanned for declarations
    pub files_scanned: AtomicUsize,

    /// Source files skipped (oversized, unreadable, not UTF-8)
    pub files_skipped: AtomicUsize,

    /// Declarations recognised
    pub declarations_found: AtomicUsize,

    /// Content files catalogued
    pub assets_catalogued: AtomicUsize,

    /// Total bytes of catalogued content
    pub asset_bytes: AtomicU64,

    start_time: Instant,
}

/// Plain snapshot of [`ScanMetrics`], stored on the built index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub declarations_found: usize,
    pub assets_catalogued: usize,
    pub asset_bytes: u64,
    pub issues: usize,
    pub elapsed_ms: u64,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            files_scanned: AtomicUsize::new(0),
            files_skipped: AtomicUsize::new(0),
            declarations_found: AtomicUsize::new(0),
            assets_catalogued: AtomicUsize::new(0),
            asset_bytes: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_file_scanned(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_declarations(&self, count: usize) {
        self.declarations_found.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_asset(&self, bytes: u64) {
        self.assets_catalogued.fetch_add(1, Ordering::Relaxed);
        self.asset_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Freeze the counters, together with the final issue count.
    pub fn snapshot(&self, issues: usize) -> ScanSummary {
        ScanSummary {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            declarations_found: self.declarations_found.load(Ordering::Relaxed),
            assets_catalogued: self.assets_catalogued.load(Ordering::Relaxed),
            asset_bytes: self.asset_bytes.load(Ordering::Relaxed),
            issues,
            elapsed_ms: u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSummary {
    /// Log a summary of the scan
    pub fn log(&self) {
        tracing::info!("=== Scan Summary ===");
        tracing::info!(
            "Sources: {} scanned, {} skipped, {} declarations",
            self.files_scanned,
            self.files_skipped,
            self.declarations_found
        );
        tracing::info!(
            "Content: {} assets, {:.2} MiB",
            self.assets_catalogued,
            self.asset_bytes as f64 / (1024.0 * 1024.0)
        );
        tracing::info!("Issues: {}, elapsed: {}ms", self.issues, self.elapsed_ms);
    }
}
