//! Type classification.
//!
//! Decides whether an entry is walked as a file, a directory, something else,
//! or skipped, resolving symlinks and refusing to recurse into loops.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::entry::{Entry, EntryKind};
use crate::error::WalkError;
use crate::settings::Settings;
use crate::traits::FileSystem;

/// What the walker treats an entry as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    File,
    Directory,
    /// Neither file nor directory; only emitted with [`EntryType::All`](crate::EntryType::All).
    Other,
}

/// Result of classifying one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub class: EntryClass,
    /// Canonical path of the object. Always set for directories.
    pub real_path: Option<PathBuf>,
}

/// Chain of canonical paths from the walk root down to the directory being read.
#[derive(Debug)]
pub struct Lineage {
    real_path: PathBuf,
    parent: Option<Arc<Lineage>>,
}

impl Lineage {
    pub fn root(real_path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            real_path,
            parent: None,
        })
    }

    pub fn child(self: &Arc<Self>, real_path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            real_path,
            parent: Some(Arc::clone(self)),
        })
    }

    pub fn real_path(&self) -> &Path {
        &self.real_path
    }

    /// Whether descending into `target` would revisit this directory or one
    /// of its ancestors.
    pub fn is_looped_by(&self, target: &Path) -> bool {
        let mut node = Some(self);
        while let Some(n) = node {
            if n.real_path.starts_with(target) {
                return true;
            }
            node = n.parent.as_deref();
        }
        false
    }
}

/// Classify `entry`, found in the directory described by `parent`.
///
/// `Ok(None)` means the entry is skipped without a warning. Errors are
/// returned unrouted; the caller hands them to the error policy.
/// `entry.stats` is filled in when `always_stat` is set.
pub async fn classify<F>(
    fs: &F,
    settings: &Settings,
    parent: &Lineage,
    entry: &mut Entry,
) -> Result<Option<Classified>, WalkError>
where
    F: FileSystem + ?Sized,
{
    let kind = match entry.dirent.kind {
        Some(kind) => kind,
        None => {
            let stats = fs
                .lstat(&entry.full_path)
                .await
                .map_err(|e| WalkError::from_io(&entry.full_path, e))?;
            let kind = stats.kind;
            if settings.always_stat && kind != EntryKind::Symlink {
                entry.stats = Some(stats);
            }
            kind
        }
    };

    let classified = match kind {
        EntryKind::Symlink if settings.follow_symlinks => {
            resolve_symlink(fs, settings, parent, entry).await?
        }
        EntryKind::Symlink => {
            // Unfollowed symlinks are never recursed into; they go through the
            // file filter like a file.
            if settings.always_stat {
                entry.stats = Some(lstat(fs, &entry.full_path).await?);
            }
            Some(Classified {
                class: EntryClass::File,
                real_path: None,
            })
        }
        kind => {
            if settings.always_stat && entry.stats.is_none() {
                let stats = if settings.follow_symlinks {
                    fs.stat(&entry.full_path).await
                } else {
                    fs.lstat(&entry.full_path).await
                };
                entry.stats = Some(stats.map_err(|e| WalkError::from_io(&entry.full_path, e))?);
            }
            // Fresh stats win over the listing's hint.
            let kind = entry.stats.as_ref().map_or(kind, |s| s.kind);
            class_of(kind).map(|class| Classified {
                class,
                real_path: (class == EntryClass::Directory)
                    .then(|| parent.real_path().join(&entry.dirent.file_name)),
            })
        }
    };

    trace!(path = %entry.path.display(), ?classified, "classified");
    Ok(classified)
}

async fn resolve_symlink<F>(
    fs: &F,
    settings: &Settings,
    parent: &Lineage,
    entry: &mut Entry,
) -> Result<Option<Classified>, WalkError>
where
    F: FileSystem + ?Sized,
{
    let real = match fs.realpath(&entry.full_path).await {
        Ok(real) => real,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WalkError::BrokenSymlink(entry.full_path.clone()));
        }
        Err(e) => return Err(WalkError::from_io(&entry.full_path, e)),
    };

    let target = lstat(fs, &real).await?;
    if settings.always_stat {
        entry.stats = Some(target.clone());
    }

    match target.kind {
        EntryKind::File => Ok(Some(Classified {
            class: EntryClass::File,
            real_path: Some(real),
        })),
        EntryKind::Dir if parent.is_looped_by(&real) => Err(WalkError::CircularSymlink {
            path: entry.full_path.clone(),
            target: real,
        }),
        EntryKind::Dir => Ok(Some(Classified {
            class: EntryClass::Directory,
            real_path: Some(real),
        })),
        EntryKind::Other => Ok(Some(Classified {
            class: EntryClass::Other,
            real_path: Some(real),
        })),
        EntryKind::Symlink => Ok(None),
    }
}

async fn lstat<F>(fs: &F, path: &Path) -> Result<crate::entry::Stats, WalkError>
where
    F: FileSystem + ?Sized,
{
    fs.lstat(path).await.map_err(|e| WalkError::from_io(path, e))
}

fn class_of(kind: EntryKind) -> Option<EntryClass> {
    match kind {
        EntryKind::File => Some(EntryClass::File),
        EntryKind::Dir => Some(EntryClass::Directory),
        EntryKind::Other => Some(EntryClass::Other),
        EntryKind::Symlink => None,
    }
}
