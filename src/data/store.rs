use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::loader::{self, DataUnavailable};
use super::model::Dataset;

// ---------------------------------------------------------------------------
// DatasetStore – load-once handle
// ---------------------------------------------------------------------------

/// Owns the one dataset of the process.
///
/// Built once in `main` and handed to every session by reference. The first
/// successful [`load`](Self::load) reads the file; later calls return the
/// same `Arc` without touching disk. Concurrent first calls wait for a single
/// read. Failed loads are not cached.
#[derive(Debug)]
pub struct DatasetStore {
    path: PathBuf,
    dataset: OnceCell<Arc<Dataset>>,
    reads: AtomicUsize,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: OnceCell::new(),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the dataset, reading the backing file on first use.
    pub fn load(&self) -> Result<Arc<Dataset>, DataUnavailable> {
        if let Some(ds) = self.dataset.get() {
            log::debug!("dataset cache hit for {}", self.path.display());
            return Ok(Arc::clone(ds));
        }

        // Blocks other callers until the read finishes; an error leaves the
        // cell empty for the next attempt.
        let ds = self.dataset.get_or_try_init(|| {
            self.reads.fetch_add(1, Ordering::Relaxed);
            loader::load_file(&self.path).map(Arc::new)
        })?;
        Ok(Arc::clone(ds))
    }

    /// How many times the backing file has been read.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}
