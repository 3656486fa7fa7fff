// Session state module
//
// This module provides the SessionManager which holds the most recent
// ProjectIndex behind Arc<RwLock<T>> and emits events as scans start and end.

use crate::index::ProjectIndex;
use crate::models::ScanSettings;
use crate::services::manifest::ManifestError;
use crate::services::project_scanner::{ProjectScanner, ScanError};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Events emitted by a [`SessionManager`].
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// A scan of `root` has started
    ScanStarted { root: Utf8PathBuf },

    /// A scan finished and its index is now current
    ScanCompleted {
        root: Utf8PathBuf,
        declarations: usize,
        assets: usize,
        issues: usize,
    },

    /// A scan failed; the previous index (if any) stays current
    ScanFailed { root: Utf8PathBuf, error: String },

    /// The current index was dropped
    Cleared,
}

/// Owner of the current [`ProjectIndex`].
///
/// Readers take an `Arc` snapshot via [`current()`](Self::current) and keep
/// using it for as long as they like; a re-scan swaps in a new index and never
/// touches the old one.
///
/// # Usage
///
/// - [`scan()`](Self::scan) / [`scan_async()`](Self::scan_async) to build and
///   install a new index
/// - [`read()`](Self::read) for short queries against the current index
/// - [`subscribe()`](Self::subscribe) for scan lifecycle events
pub struct SessionManager {
    scanner: ProjectScanner,

    /// The current index; `None` until the first successful scan
    index: Arc<RwLock<Option<Arc<ProjectIndex>>>>,

    /// Broadcast channel for session events
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    /// Create a session with a broadcast channel buffer of 100 events
    pub fn new(settings: ScanSettings) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            scanner: ProjectScanner::new(settings),
            index: Arc::new(RwLock::new(None)),
            event_tx,
        }
    }

    pub fn settings(&self) -> &ScanSettings {
        self.scanner.settings()
    }

    /// Scan `root` on the calling thread and install the result.
    pub fn scan(&self, root: &Utf8Path) -> Result<Arc<ProjectIndex>, ManifestError> {
        self.emit(SessionEvent::ScanStarted { root: root.to_path_buf() });

        let result = self.scanner.scan(root);
        self.finish(root, result)
    }

    /// Scan `root` without blocking the async runtime.
    ///
    /// Uses the concurrent coordinator when `concurrent_scan` is enabled,
    /// otherwise runs the sequential scan on the blocking pool.
    pub async fn scan_async(&self, root: Utf8PathBuf) -> Result<Arc<ProjectIndex>, ScanError> {
        self.emit(SessionEvent::ScanStarted { root: root.clone() });

        let result = if self.scanner.settings().concurrent_scan {
            self.scanner.scan_concurrent(root.clone()).await
        } else {
            let scanner = self.scanner.clone();
            let scan_root = root.clone();
            match tokio::task::spawn_blocking(move || scanner.scan(&scan_root)).await {
                Ok(result) => result.map_err(ScanError::from),
                Err(join_error) => Err(ScanError::from(join_error)),
            }
        };

        self.finish(&root, result)
    }

    /// Snapshot of the current index.
    pub fn current(&self) -> Option<Arc<ProjectIndex>> {
        self.index.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Execute a function with read access to the current index
    ///
    /// # Example
    /// ```ignore
    /// let count = session.read(|index| index.map_or(0, |i| i.declarations.len()));
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Option<&ProjectIndex>) -> R,
    {
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_deref())
    }

    /// Drop the current index.
    pub fn clear(&self) {
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.emit(SessionEvent::Cleared);
    }

    /// Subscribe to session events
    ///
    /// Returns a receiver that will get notified of all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    fn finish<E: std::fmt::Display>(
        &self,
        root: &Utf8Path,
        result: Result<ProjectIndex, E>,
    ) -> Result<Arc<ProjectIndex>, E> {
        match result {
            Ok(index) => {
                let index = Arc::new(index);
                *self.index.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&index));

                self.emit(SessionEvent::ScanCompleted {
                    root: root.to_path_buf(),
                    declarations: index.declarations.len(),
                    assets: index.assets.len(),
                    issues: index.issues.len(),
                });
                Ok(index)
            }
            Err(e) => {
                tracing::error!("Scan of {} failed: {}", root, e);
                self.emit(SessionEvent::ScanFailed {
                    root: root.to_path_buf(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // Ignore send errors - it's OK if no one is listening
        let _ = self.event_tx.send(event);
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(ScanSettings::default())
    }
}

// Clones share the same index and event channel
impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            scanner: self.scanner.clone(),
            index: Arc::clone(&self.index),
            event_tx: self.event_tx.clone(),
        }
    }
}
