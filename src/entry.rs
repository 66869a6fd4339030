use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A single filesystem object discovered during a walk.
///
/// Built once per directory-listing item and never mutated afterwards except
/// for `stats`, which is attached lazily when the walk was configured with
/// `always_stat` or when classifying the entry required a stat call.
///
/// Two entries from the same walk are the same object iff their `path`s are
/// equal; there is no identity across walks.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Base name of the object, lossily converted for display and matching.
    /// The exact name is `dirent.file_name`.
    pub name: String,

    /// Path relative to the walk root.
    pub path: PathBuf,

    /// `root.join(path)`, with `root` exactly as the caller passed it.
    pub full_path: PathBuf,

    /// Nesting depth. Entries directly under the root have depth 1.
    pub depth: usize,

    /// The raw directory-listing record this entry was built from.
    pub dirent: Dirent,

    /// Metadata, populated on demand.
    pub stats: Option<Stats>,
}

impl Entry {
    /// Build an entry for `dirent`, found inside the directory at `parent`
    /// (relative to `root`).
    pub fn new(root: &Path, parent: &Path, dirent: Dirent, depth: usize) -> Self {
        let path = parent.join(&dirent.file_name);
        Self {
            name: dirent.name.clone(),
            full_path: full_path_of(root, &path),
            path,
            depth,
            dirent,
            stats: None,
        }
    }

    /// The relative path rendered with a caller-chosen separator.
    pub fn path_with_separator(&self, sep: &str) -> String {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// The kind reported by the directory listing (or by `stats`, when the
    /// listing carried no type hint).
    pub fn kind(&self) -> Option<EntryKind> {
        self.dirent.kind.or_else(|| self.stats.as_ref().map(|s| s.kind))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Entry {}

impl std::hash::Hash for Entry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// Resolve a root-relative path against the walk root.
pub fn full_path_of(root: &Path, relative: &Path) -> PathBuf {
    root.join(relative)
}

/// The kind of a traversed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    pub(crate) fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            Self::Symlink
        } else if ft.is_dir() {
            Self::Dir
        } else if ft.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Raw record returned by a directory listing.
///
/// `kind` carries the cheap type hint most platforms hand out with the
/// listing itself; `None` means the classifier has to stat the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirent {
    /// The name exactly as the OS returned it. Paths are built from this.
    pub file_name: OsString,
    /// `file_name` with invalid UTF-8 replaced.
    pub name: String,
    pub kind: Option<EntryKind>,
}

impl Dirent {
    pub fn new(file_name: impl Into<OsString>, kind: Option<EntryKind>) -> Self {
        let file_name = file_name.into();
        Self {
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            kind,
        }
    }

    pub fn file_name(&self) -> &OsStr {
        &self.file_name
    }
}

/// Filesystem metadata as seen by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub kind: EntryKind,
    pub len: u64,
    pub readonly: bool,
    pub modified: Option<SystemTime>,
}

impl Stats {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            len: 0,
            readonly: false,
            modified: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }
}

impl From<&std::fs::Metadata> for Stats {
    fn from(md: &std::fs::Metadata) -> Self {
        Self {
            kind: EntryKind::from_file_type(md.file_type()),
            len: md.len(),
            readonly: md.permissions().readonly(),
            modified: md.modified().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_entry_path_stays_root_relative() {
        let root = Path::new("/data/root");
        let dirent = Dirent::new("b.txt", Some(EntryKind::File));
        let entry = Entry::new(root, Path::new("sub/deeper"), dirent, 3);

        assert_eq!(entry.name, "b.txt");
        assert_eq!(entry.path, Path::new("sub/deeper/b.txt"));
        assert_eq!(entry.full_path, Path::new("/data/root/sub/deeper/b.txt"));
        assert!(entry.stats.is_none());
    }

    #[test]
    fn full_path_is_idempotent() {
        let root = Path::new("rel/root");
        let entry = Entry::new(root, Path::new("x"), Dirent::new("y", None), 2);
        let once = full_path_of(root, &entry.path);
        let twice = full_path_of(root, &entry.path);
        assert_eq!(once, twice);
        assert_eq!(once, entry.full_path);
    }

    #[test]
    fn equality_is_by_relative_path() {
        let a = Entry::new(Path::new("/r"), Path::new("d"), Dirent::new("f", None), 2);
        let mut b = a.clone();
        b.stats = Some(Stats::new(EntryKind::File));
        let c = Entry::new(Path::new("/r"), Path::new("e"), Dirent::new("f", None), 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn separator_rendering() {
        let entry = Entry::new(Path::new("/r"), Path::new("a/b"), Dirent::new("c", None), 3);
        assert_eq!(entry.path_with_separator("\\"), "a\\b\\c");
        assert_eq!(entry.path_with_separator("/"), "a/b/c");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_keep_their_exact_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"f\xff.txt");
        let entry = Entry::new(Path::new("/r"), Path::new("d"), Dirent::new(raw, None), 2);
        assert_eq!(entry.full_path, Path::new("/r/d").join(raw));
        assert_eq!(entry.path.file_name(), Some(raw));
        assert_eq!(entry.name, "f\u{fffd}.txt");
    }

    #[test]
    fn kind_falls_back_to_stats() {
        let mut entry = Entry::new(Path::new("/r"), Path::new(""), Dirent::new("f", None), 1);
        assert_eq!(entry.kind(), None);
        entry.stats = Some(Stats::new(EntryKind::File));
        assert_eq!(entry.kind(), Some(EntryKind::File));
    }
}
