use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::entry::{Dirent, EntryKind, Stats};
use crate::traits::FileSystem;

/// Local filesystem through `tokio::fs`. Needs a running Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl FileSystem for TokioFs {
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<Dirent>> {
        let mut rd = tokio::fs::read_dir(path).await?;
        let mut out = Vec::new();
        while let Some(de) = rd.next_entry().await? {
            let kind = de.file_type().await.ok().map(EntryKind::from_file_type);
            out.push(Dirent::new(de.file_name(), kind));
        }
        Ok(out)
    }

    async fn stat(&self, path: &Path) -> io::Result<Stats> {
        tokio::fs::metadata(path).await.map(|md| Stats::from(&md))
    }

    async fn lstat(&self, path: &Path) -> io::Result<Stats> {
        tokio::fs::symlink_metadata(path).await.map(|md| Stats::from(&md))
    }

    async fn realpath(&self, path: &Path) -> io::Result<PathBuf> {
        tokio::fs::canonicalize(path).await
    }
}

/// Local filesystem through blocking `std::fs` calls.
///
/// Every future it returns completes on first poll, so a walker over `StdFs`
/// can be driven with a trivial executor. This is what the synchronous
/// adapter does.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

#[async_trait]
impl FileSystem for StdFs {
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<Dirent>> {
        std::fs::read_dir(path)?
            .map(|de| {
                let de = de?;
                let kind = de.file_type().ok().map(EntryKind::from_file_type);
                Ok(Dirent::new(de.file_name(), kind))
            })
            .collect()
    }

    async fn stat(&self, path: &Path) -> io::Result<Stats> {
        std::fs::metadata(path).map(|md| Stats::from(&md))
    }

    async fn lstat(&self, path: &Path) -> io::Result<Stats> {
        std::fs::symlink_metadata(path).map(|md| Stats::from(&md))
    }

    async fn realpath(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}
