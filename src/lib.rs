//! # dirpull
//!
//! Demand-driven recursive directory walker.
//!
//! dirpull walks a directory tree depth-first and hands out one [`Entry`] at a
//! time, doing filesystem work only when the consumer asks for the next entry.
//! A consumer that stops pulling stops all I/O: no directory is read ahead of
//! demand, no stat is issued for entries nobody asked about yet.
//!
//! The same scheduler backs three consumption modes:
//!
//! - a pull stream ([`Walker::into_stream`], [`Walker::read`], [`Walker::next_entry`]),
//! - a collected `Vec` ([`Walker::collect`], [`Walker::run`]),
//! - a blocking iterator ([`SyncWalker`]) that needs no async runtime.
//!
//! Permission errors, entries that vanish mid-walk and symlink loops are
//! skipped with a warning; anything else ends the walk with an error.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), dirpull::WalkError> {
//! use dirpull::EntryType;
//!
//! let entries = dirpull::walk("project")
//!     .file_filter(["*.rs", "!*_test.rs"])
//!     .directory_filter(["!target", "!.git"])
//!     .entry_type(EntryType::Files)
//!     .build()?
//!     .collect()
//!     .await?;
//!
//! for entry in entries {
//!     println!("{}", entry.path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Streaming
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), dirpull::WalkError> {
//! use futures::StreamExt;
//!
//! let mut stream = dirpull::walk("/var/log")
//!     .on_warning(|w| eprintln!("skipped: {w}"))
//!     .build()?
//!     .into_stream();
//!
//! while let Some(entry) = stream.next().await {
//!     println!("{}", entry?.full_path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Blocking
//!
//! ```rust,no_run
//! for entry in dirpull::walk(".").max_depth(2).build_sync()? {
//!     println!("{}", entry?.path.display());
//! }
//! # Ok::<(), dirpull::WalkError>(())
//! ```

#![forbid(unsafe_code)]

pub mod classify;
pub mod engine;
pub mod filter;
pub mod policy;

mod builder;
mod entry;
mod error;
mod fs;
mod results;
mod settings;
mod stream;
mod sync;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::WalkBuilder;
pub use engine::{WalkState, Walker};
pub use entry::{full_path_of, Dirent, Entry, EntryKind, Stats};
pub use error::{BoxError, WalkError};
pub use filter::{compile_filter, CompiledFilter, FilterSpec};
pub use fs::{StdFs, TokioFs};
pub use policy::{classify_error, ErrorClass};
pub use results::{Results, ScanStats};
pub use settings::{EntryType, Settings};
pub use sync::SyncWalker;
pub use traits::FileSystem;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`WalkBuilder`] rooted at `root`.
///
/// # Example
///
/// ```rust
/// use std::fs;
///
/// let dir = tempfile::tempdir().unwrap();
/// fs::write(dir.path().join("a.txt"), "a").unwrap();
/// fs::write(dir.path().join("b.log"), "b").unwrap();
///
/// let names: Vec<String> = dirpull::walk(dir.path())
///     .file_filter("*.txt")
///     .build_sync()
///     .unwrap()
///     .map(|e| e.unwrap().name)
///     .collect();
///
/// assert_eq!(names, ["a.txt"]);
/// ```
pub fn walk(root: impl Into<std::path::PathBuf>) -> WalkBuilder {
    WalkBuilder::new(root)
}
