//! Per-destination serialization of uploads within this process.
//!
//! Two uploads to the same final path would otherwise share the deterministic
//! temp file. Holders of a [`PathGuard`] for a path run one at a time; other
//! paths are unaffected. Separate processes are not coordinated.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Default)]
pub struct StagingLocks {
    busy: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

impl StagingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn busy(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.busy.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Block until no other guard holds `path`, then hold it.
    pub fn acquire(&self, path: &Path) -> PathGuard<'_> {
        let mut busy = self.busy();
        while busy.contains(path) {
            busy = self
                .released
                .wait(busy)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        busy.insert(path.to_path_buf());
        PathGuard {
            locks: self,
            path: path.to_path_buf(),
        }
    }

    #[cfg(test)]
    fn held(&self) -> usize {
        self.busy().len()
    }
}

/// Releases the path when dropped.
pub struct PathGuard<'a> {
    locks: &'a StagingLocks,
    path: PathBuf,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.locks.busy().remove(&self.path);
        self.locks.released.notify_all();
    }
}
