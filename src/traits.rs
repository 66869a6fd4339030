use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::entry::{Dirent, Stats};

/// The filesystem primitives the walker is built on.
///
/// Implement this to walk anything that looks like a directory tree:
/// the local disk ([`TokioFs`](crate::TokioFs), [`StdFs`](crate::StdFs)),
/// an in-memory fixture, an instrumented wrapper that counts calls, and so on.
///
/// # Suspension points
///
/// Each method is one suspension point of the scheduler. The scheduler awaits
/// them one at a time and never issues a second call for the same walk while
/// one is outstanding.
///
/// # Thread Safety
///
/// `Send + Sync` are required so a walker can be moved into a spawned task
/// and its stream boxed as `Send`.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// List the directory at `path`, in the order the platform returns it.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<Dirent>>;

    /// Metadata for `path`, following symlinks.
    async fn stat(&self, path: &Path) -> io::Result<Stats>;

    /// Metadata for `path` itself, without following a final symlink.
    async fn lstat(&self, path: &Path) -> io::Result<Stats>;

    /// Canonical absolute path with every symlink resolved.
    async fn realpath(&self, path: &Path) -> io::Result<PathBuf>;
}
