use std::time::Duration;

use crate::entry::Entry;
use crate::error::WalkError;

/// The output of a completed walk.
///
/// `warnings` is opt-in, disabled by default to avoid holding every skipped
/// path in memory. Enable it on the builder with `.collect_warnings(true)`.
#[derive(Debug)]
pub struct Results {
    /// Emitted entries, in the order they were produced.
    pub entries: Vec<Entry>,

    /// Expected errors the walk stepped over (permission denied, etc.).
    pub warnings: Vec<WalkError>,

    /// Scan performance statistics.
    pub stats: ScanStats,
}

/// Performance statistics for a completed walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanStats {
    /// Files classified (emitted or not).
    pub files: usize,

    /// Directories classified (emitted or not).
    pub dirs: usize,

    /// Wall-clock time from the first pull to completion.
    pub duration: Duration,

    /// `(files + dirs) / duration`, clamped to 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(files: usize, dirs: usize, duration: Duration) -> Self {
        let total = files + dirs;
        let eps = if duration.as_secs_f64() > 0.0 {
            (total as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            dirs,
            duration,
            entries_per_sec: eps,
        }
    }
}
