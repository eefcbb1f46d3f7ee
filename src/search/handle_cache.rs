use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tantivy::{Index, IndexReader, ReloadPolicy, Searcher};
use tracing::{debug, info};

use super::schema::RepositorySchema;

/// Index metadata file name. Tantivy rewrites it atomically on every commit,
/// so its stat data serves as the index generation marker.
pub const INDEX_METADATA_FILE: &str = "meta.json";

/// Generation marker of the on-disk index, compared for equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionStamp {
    modified: SystemTime,
    len: u64,
}

impl VersionStamp {
    /// Stat the index metadata file for the current generation marker.
    pub fn current(index_dir: &Path) -> Result<Self> {
        let meta = std::fs::metadata(index_dir.join(INDEX_METADATA_FILE))
            .with_context(|| format!("Failed to read index metadata in {}", index_dir.display()))?;
        let modified = meta
            .modified()
            .context("Index metadata has no modification time")?;
        Ok(Self {
            modified,
            len: meta.len(),
        })
    }
}

/// An open connection to the index directory.
///
/// Shared as `Arc<IndexHandle>`: the cache owns one reference and hands out
/// clones, so replacing the cached handle never interrupts a search still
/// running against the old one. The underlying index is released when the
/// last clone drops.
pub struct IndexHandle {
    index: Index,
    reader: IndexReader,
    schema: RepositorySchema,
    index_dir: PathBuf,
    version: VersionStamp,
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("index_dir", &self.index_dir)
            .field("version", &self.version)
            .finish()
    }
}

impl IndexHandle {
    fn open(index_dir: &Path, version: VersionStamp) -> Result<Self> {
        if !index_dir.join(INDEX_METADATA_FILE).exists() {
            return Err(anyhow::anyhow!(
                "Index not found at {}",
                index_dir.display()
            ));
        }

        let index = Index::open_in_dir(index_dir)
            .with_context(|| format!("Failed to open index at {}", index_dir.display()))?;
        let schema = RepositorySchema::for_index(&index)?;

        // Manual reload: staleness is detected by the version stamp, and a
        // stale handle is replaced wholesale rather than reloaded in place.
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .context("Failed to create index reader")?;

        Ok(Self {
            index,
            reader,
            schema,
            index_dir: index_dir.to_path_buf(),
            version,
        })
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// A tantivy searcher over the generation this handle was opened against.
    pub fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    pub fn schema(&self) -> &RepositorySchema {
        &self.schema
    }

    pub fn version(&self) -> VersionStamp {
        self.version
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

/// Process-wide cache of the expensively-constructed index handle.
///
/// The handle is opened lazily on first acquire and reused until the on-disk
/// index generation changes, at which point it is dropped and reopened. The
/// whole inspect-and-replace sequence runs under one lock so concurrent
/// callers cannot race a double close or a duplicate open.
pub struct IndexHandleCache {
    index_dir: PathBuf,
    cached: Mutex<Option<Arc<IndexHandle>>>,
}

impl std::fmt::Debug for IndexHandleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandleCache")
            .field("index_dir", &self.index_dir)
            .finish()
    }
}

impl IndexHandleCache {
    /// Create a cache for the given index directory. No I/O happens until
    /// the first acquire.
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Get the cached handle, opening or replacing it as needed.
    ///
    /// Fails if the index cannot be stat'ed or opened; there is no fallback
    /// for an unreadable index.
    pub fn acquire(&self) -> Result<Arc<IndexHandle>> {
        let mut cached = self.cached.lock().unwrap();

        let current = VersionStamp::current(&self.index_dir)?;

        if let Some(handle) = cached.as_ref() {
            if handle.version() == current {
                debug!("reusing cached index handle");
                return Ok(Arc::clone(handle));
            }
            info!(
                "index at {} changed on disk, replacing cached handle",
                self.index_dir.display()
            );
            // Drop the cache's reference. Callers still searching against the
            // old handle keep it alive until they finish.
            *cached = None;
        }

        let handle = Arc::new(IndexHandle::open(&self.index_dir, current)?);
        info!(
            "opened index at {} with {} documents",
            self.index_dir.display(),
            handle.num_docs()
        );
        *cached = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Close the cached handle if one is open. Idempotent; safe to call
    /// before any acquire and repeatedly at shutdown.
    pub fn close_all(&self) {
        let mut cached = self.cached.lock().unwrap();
        if cached.take().is_some() {
            info!("closed cached index handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_fails_without_index() {
        let temp_dir = TempDir::new().unwrap();
        let cache = IndexHandleCache::new(temp_dir.path());
        assert!(cache.acquire().is_err());
    }

    #[test]
    fn test_close_all_before_open_is_safe() {
        let temp_dir = TempDir::new().unwrap();
        let cache = IndexHandleCache::new(temp_dir.path());
        cache.close_all();
        cache.close_all();
    }
}
