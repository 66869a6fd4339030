use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::WalkError;
use crate::filter::CompiledFilter;
use crate::policy::ErrorPolicy;

/// Callback receiving every expected error the walk skipped past.
pub type WarningSink = Arc<dyn Fn(&WalkError) + Send + Sync>;

/// Which classified entries are handed to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryType {
    /// Files only (and unfollowed symlinks, which are treated as files).
    #[default]
    Files,

    /// Directories only.
    Directories,

    /// Files and directories.
    FilesDirectories,

    /// Everything, including sockets, fifos and other special files.
    All,
}

impl EntryType {
    pub fn wants_files(self) -> bool {
        self != Self::Directories
    }

    pub fn wants_dirs(self) -> bool {
        self != Self::Files
    }

    pub fn wants_everything(self) -> bool {
        self == Self::All
    }
}

impl FromStr for EntryType {
    type Err = WalkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "files" => Ok(Self::Files),
            "directories" => Ok(Self::Directories),
            "files_directories" => Ok(Self::FilesDirectories),
            "all" => Ok(Self::All),
            other => Err(WalkError::InvalidEntryType(other.to_string())),
        }
    }
}

/// Immutable configuration snapshot of one walk.
///
/// Built once by the builder, then shared by reference with every step of
/// the traversal.
#[derive(Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub file_filter: Option<CompiledFilter>,
    pub directory_filter: Option<CompiledFilter>,
    pub entry_type: EntryType,
    pub max_depth: Option<usize>,
    pub always_stat: bool,
    pub follow_symlinks: bool,
    pub throw_on_broken_symlink: bool,
    pub batch_size: usize,
    pub error_policy: ErrorPolicy,
    pub on_warning: Option<WarningSink>,
    pub collect_warnings: bool,
}

impl Settings {
    /// Whether a directory found at `depth` may be read.
    pub fn may_descend(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("root", &self.root)
            .field("entry_type", &self.entry_type)
            .field("max_depth", &self.max_depth)
            .field("always_stat", &self.always_stat)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("throw_on_broken_symlink", &self.throw_on_broken_symlink)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_parses_known_names() {
        assert_eq!("files".parse::<EntryType>().unwrap(), EntryType::Files);
        assert_eq!("directories".parse::<EntryType>().unwrap(), EntryType::Directories);
        assert_eq!(
            "files_directories".parse::<EntryType>().unwrap(),
            EntryType::FilesDirectories
        );
        assert_eq!("all".parse::<EntryType>().unwrap(), EntryType::All);
    }

    #[test]
    fn entry_type_rejects_unknown_names() {
        let err = "dirs".parse::<EntryType>().unwrap_err();
        assert!(matches!(err, WalkError::InvalidEntryType(ref s) if s == "dirs"));
    }

    #[test]
    fn emission_sets() {
        assert!(EntryType::Files.wants_files() && !EntryType::Files.wants_dirs());
        assert!(!EntryType::Directories.wants_files() && EntryType::Directories.wants_dirs());
        assert!(EntryType::FilesDirectories.wants_files() && EntryType::FilesDirectories.wants_dirs());
        assert!(EntryType::All.wants_everything() && !EntryType::FilesDirectories.wants_everything());
    }
}
