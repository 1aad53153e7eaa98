//! Scan orchestration
//!
//! One scan at a time: full scans extract everything under a root,
//! incremental scans only the delta against the store. Both end with a
//! single write transaction followed by an aggregate rebuild, so readers
//! never observe a half-written scan.

use crate::changes;
use crate::pool::WorkerPool;
use crate::walker::FileWalker;
use crate::Result;
use melodex_core::ids;
use melodex_core::types::{Album, Track};
use melodex_core::{QueryParams, SortOrder};
use melodex_probe::MetadataExtractor;
use melodex_storage::artists::split::ArtistResolver;
use melodex_storage::{aggregate, albums, tracks, StorageError};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Files per worker task
const BATCH_SIZE: usize = 100;

/// Progress of the extraction phase of a scan
#[derive(Debug, Clone, Copy)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
}

/// Outcome of a completed scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub total_files: usize,
}

/// Callback invoked as extraction progresses
pub type ProgressCallback = Arc<dyn Fn(ScanProgress) + Send + Sync>;

/// Drives scans end to end: walk, extract in parallel, write, aggregate
pub struct ScanCoordinator {
    pool: SqlitePool,
    extractor: Arc<MetadataExtractor>,
    workers: Arc<WorkerPool>,
    scanning: AtomicBool,
    cancel: Mutex<CancellationToken>,
    resolver: RwLock<ArtistResolver>,
    progress: Option<ProgressCallback>,
}

impl ScanCoordinator {
    pub fn new(
        pool: SqlitePool,
        extractor: Arc<MetadataExtractor>,
        workers: Arc<WorkerPool>,
    ) -> Self {
        Self {
            pool,
            extractor,
            workers,
            scanning: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
            resolver: RwLock::new(ArtistResolver::new()),
            progress: None,
        }
    }

    /// Install a progress callback (fires every 10 extracted files and at
    /// the end of the extraction phase)
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Whether a scan is currently running
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Cancel the current scan
    ///
    /// In-flight batches finish and their results still commit; batches
    /// not yet dispatched are dropped.
    pub fn cancel(&self) {
        self.cancel.lock().unwrap().cancel();
    }

    /// Scan everything under `root`, re-extracting every file
    ///
    /// Returns `Ok(None)` when another scan is already running.
    pub async fn full_scan(&self, root: &Path) -> Result<Option<ScanSummary>> {
        let Some(token) = self.begin_scan() else {
            return Ok(None);
        };

        let result = self.run_full_scan(root, &token).await;
        self.scanning.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    /// Scan only what changed under `root` since the last scan
    ///
    /// Returns `Ok(None)` when another scan is already running.
    pub async fn incremental_scan(&self, root: &Path) -> Result<Option<ScanSummary>> {
        let Some(token) = self.begin_scan() else {
            return Ok(None);
        };

        let result = self.run_incremental_scan(root, &token).await;
        self.scanning.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    /// Detach a scan onto the runtime; progress is observable only through
    /// the callback and logs
    pub fn spawn_scan(self: &Arc<Self>, root: PathBuf, full: bool) {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let result = if full {
                coordinator.full_scan(&root).await
            } else {
                coordinator.incremental_scan(&root).await
            };
            match result {
                Ok(Some(summary)) => tracing::info!(
                    "Scan of {} finished: {} added, {} updated, {} deleted",
                    root.display(),
                    summary.added,
                    summary.updated,
                    summary.deleted
                ),
                Ok(None) => {}
                Err(e) => tracing::error!("Scan of {} failed: {}", root.display(), e),
            }
        });
    }

    /// Tracks for an artist id; negative (split) ids resolve through the
    /// credit index, positive ids hit the tracks table directly
    pub async fn tracks_for_artist(&self, artist_id: i64) -> Result<Vec<Track>> {
        if ids::is_split_id(artist_id) {
            let Some(terms) = self.credit_terms(artist_id) else {
                return Ok(Vec::new());
            };
            return Ok(tracks::by_artist_credits(&self.pool, &terms).await?);
        }

        let params = QueryParams::new().artist(artist_id);
        Ok(tracks::query(&self.pool, &params).await?)
    }

    /// Albums for an artist id, split-identity aware like
    /// [`Self::tracks_for_artist`]
    pub async fn albums_for_artist(
        &self,
        artist_id: i64,
        order: SortOrder,
    ) -> Result<Vec<Album>> {
        if ids::is_split_id(artist_id) {
            let Some(terms) = self.credit_terms(artist_id) else {
                return Ok(Vec::new());
            };
            return Ok(albums::for_credits(&self.pool, &terms, order).await?);
        }

        Ok(albums::for_artist(&self.pool, artist_id, order).await?)
    }

    fn credit_terms(&self, artist_id: i64) -> Option<Vec<String>> {
        self.resolver.read().unwrap().credit_terms_for_id(artist_id)
    }

    /// Claim the scan flag and install a fresh cancellation token
    fn begin_scan(&self) -> Option<CancellationToken> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Scan requested while another scan is running, ignoring");
            return None;
        }

        let token = CancellationToken::new();
        *self.cancel.lock().unwrap() = token.clone();
        Some(token)
    }

    async fn run_full_scan(&self, root: &Path, token: &CancellationToken) -> Result<ScanSummary> {
        let files = FileWalker::new().walk(root)?;
        tracing::info!(
            "Full scan of {}: {} audio files",
            root.display(),
            files.len()
        );

        let known: HashSet<String> = tracks::all_paths(&self.pool).await?.into_iter().collect();
        let summary = self.process_files(files, Vec::new(), &known, token).await?;
        self.recompute_aggregates().await?;
        Ok(summary)
    }

    async fn run_incremental_scan(
        &self,
        root: &Path,
        token: &CancellationToken,
    ) -> Result<ScanSummary> {
        let files = FileWalker::new().walk(root)?;
        let prefix = root.to_string_lossy();
        let stored = tracks::file_entries(&self.pool, Some(prefix.as_ref())).await?;
        let mut delta = changes::detect(&files, &stored);

        if delta.is_empty() {
            tracing::info!("Incremental scan of {}: no changes", root.display());
            return Ok(ScanSummary {
                total_files: files.len(),
                ..ScanSummary::default()
            });
        }
        tracing::info!(
            "Incremental scan of {}: {} new, {} modified, {} deleted",
            root.display(),
            delta.new.len(),
            delta.modified.len(),
            delta.deleted.len()
        );

        let known: HashSet<String> = stored.into_iter().map(|e| e.path).collect();
        let deleted = std::mem::take(&mut delta.deleted);
        let to_extract = delta.paths_to_extract();

        let summary = self.process_files(to_extract, deleted, &known, token).await?;
        self.recompute_aggregates().await?;
        Ok(summary)
    }

    /// Extraction phase (parallel, cancellable) followed by the write
    /// phase (one transaction)
    async fn process_files(
        &self,
        files: Vec<PathBuf>,
        deleted: Vec<String>,
        known: &HashSet<String>,
        token: &CancellationToken,
    ) -> Result<ScanSummary> {
        let total = files.len();
        let progress = Arc::new(Mutex::new(0usize));

        let mut handles = Vec::new();
        for batch in files.chunks(BATCH_SIZE) {
            if token.is_cancelled() {
                tracing::info!("Scan cancelled, skipping remaining batches");
                break;
            }

            let batch: Vec<PathBuf> = batch.to_vec();
            let extractor = Arc::clone(&self.extractor);
            let token = token.clone();
            let progress = Arc::clone(&progress);
            let callback = self.progress.clone();

            let handle = self.workers.submit(async move {
                let mut extracted = Vec::with_capacity(batch.len());
                for path in batch {
                    if token.is_cancelled() {
                        break;
                    }
                    extracted.push(extractor.extract(&path).await);

                    let processed = {
                        let mut count = progress.lock().unwrap();
                        *count += 1;
                        *count
                    };
                    if processed % 10 == 0 || processed == total {
                        if let Some(cb) = &callback {
                            cb(ScanProgress { processed, total });
                        }
                    }
                }
                extracted
            })?;
            handles.push(handle);
        }

        let mut extracted = Vec::with_capacity(total);
        for handle in handles {
            extracted.extend(handle.await?);
        }

        let mut added = 0;
        let mut updated = 0;
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        for track in &extracted {
            if known.contains(&track.path) {
                updated += 1;
            } else {
                added += 1;
            }
            tracks::upsert(&mut *tx, track).await?;
        }
        for path in &deleted {
            tracks::delete_by_path(&mut *tx, path).await?;
        }
        tx.commit().await.map_err(StorageError::from)?;

        Ok(ScanSummary {
            added,
            updated,
            deleted: deleted.len(),
            total_files: total,
        })
    }

    /// Rebuild the derived tables and swap in the fresh resolver
    async fn recompute_aggregates(&self) -> Result<()> {
        let resolver = aggregate::recompute(&self.pool).await?;
        *self.resolver.write().unwrap() = resolver;
        Ok(())
    }
}
