use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed error returned by fallible user filters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum WalkError {
    // Traversal
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("too many levels of symbolic links: {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("circular symlink detected: {} points to {}", path.display(), target.display())]
    CircularSymlink { path: PathBuf, target: PathBuf },

    #[error("broken symlink: {}", .0.display())]
    BrokenSymlink(PathBuf),

    #[error("root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Config
    #[error("invalid glob pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid entry type '{0}', expected one of: files, directories, files_directories, all")]
    InvalidEntryType(String),

    #[error("invalid batch size")]
    InvalidBatchSize(usize),

    // Caller-supplied filters
    #[error("filter failed on {}", path.display())]
    Filter {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl WalkError {
    /// Map an io error raised while touching `path` onto the walker's taxonomy.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        if is_symlink_loop(&err) {
            return Self::SymlinkLoop(path);
        }
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source: err },
        }
    }

    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::SymlinkLoop(p)
            | Self::BrokenSymlink(p)
            | Self::NotADirectory(p)
            | Self::CircularSymlink { path: p, .. }
            | Self::Io { path: p, .. }
            | Self::Filter { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the walk can continue past this error under the default policy.
    ///
    /// Recoverable errors (permission denied, vanished entries, symlink loops)
    /// are routed to the warning channel and the offending entry or subtree is
    /// skipped. Everything else halts the walk.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_)
                | Self::NotFound(_)
                | Self::SymlinkLoop(_)
                | Self::CircularSymlink { .. }
                | Self::BrokenSymlink(_)
        )
    }

    /// Misconfiguration detected before any I/O.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. } | Self::InvalidEntryType(_) | Self::InvalidBatchSize(_)
        )
    }
}

#[cfg(unix)]
fn is_symlink_loop(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ELOOP)
}

#[cfg(not(unix))]
fn is_symlink_loop(_err: &io::Error) -> bool {
    false
}
