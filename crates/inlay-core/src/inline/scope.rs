//! Per-pass dedup state, partitioned by conditional-nesting context.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Scope key for the document top level. A path recorded here is
/// suppressed everywhere; a path recorded under any other key is
/// suppressed only within that exact condition text.
pub const GLOBAL_SCOPE: &str = "0";

/// Set of already-imported paths per scope key. Created fresh per
/// top-level pass, grown monotonically, discarded at pass end.
#[derive(Debug, Default)]
pub struct ResolutionScope {
    entries: HashMap<String, HashSet<PathBuf>>,
}

impl ResolutionScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `path` was already imported under `key` or globally.
    #[must_use]
    pub fn is_imported(&self, key: &str, path: &Path) -> bool {
        let hit = |k: &str| self.entries.get(k).is_some_and(|set| set.contains(path));
        hit(key) || (key != GLOBAL_SCOPE && hit(GLOBAL_SCOPE))
    }

    /// Record `path` under `key`, creating the set (and the global set) on
    /// demand.
    pub fn record(&mut self, key: &str, path: &Path) {
        self.entries.entry(GLOBAL_SCOPE.to_string()).or_default();
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(path.to_path_buf());
    }
}

/// Scope shared across concurrent recursion branches.
///
/// The membership check and the record are a single locked step performed
/// at enumeration time, before any I/O starts, so two concurrently
/// discovered identical targets still yield exactly one retained copy.
/// The lock is never held across an await point.
#[derive(Debug, Default)]
pub struct SharedScope {
    inner: Mutex<ResolutionScope>,
}

impl SharedScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-record in one step. Returns `false` on a dedup hit.
    pub fn check_and_record(&self, key: &str, path: &Path) -> bool {
        let mut scope = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if scope.is_imported(key, path) {
            return false;
        }
        scope.record(key, path);
        true
    }
}
