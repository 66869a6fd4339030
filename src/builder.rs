use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::Walker;
use crate::error::WalkError;
use crate::filter::{compile_filter, FilterSpec};
use crate::fs::{StdFs, TokioFs};
use crate::policy::{ErrorFilter, ErrorPolicy};
use crate::settings::{EntryType, Settings, WarningSink};
use crate::sync::SyncWalker;
use crate::traits::FileSystem;

const DEFAULT_BATCH_SIZE: usize = 16;

// ---------------------------------------------------------------------------
// WalkBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring a walk.
///
/// Created via [`dirpull::walk()`](crate::walk). Configure with chained
/// builder methods, then build the walker you want to consume:
/// [`build()`](WalkBuilder::build) for the async walker,
/// [`build_sync()`](WalkBuilder::build_sync) for the blocking one.
///
/// Misconfiguration (bad glob, zero batch size) is reported by the build
/// methods, before any filesystem call.
///
/// # Example
///
/// ```rust,ignore
/// let entries = dirpull::walk("src")
///     .file_filter(["*.rs", "!*_test.rs"])
///     .entry_type(EntryType::Files)
///     .max_depth(3)
///     .build()?
///     .collect()
///     .await?;
/// ```
pub struct WalkBuilder {
    root:                    PathBuf,
    file_filter:             Option<FilterSpec>,
    directory_filter:        Option<FilterSpec>,
    entry_type:              EntryType,
    max_depth:               Option<usize>,
    always_stat:             bool,
    lstat:                   bool,
    throw_on_broken_symlink: bool,
    batch_size:              usize,
    error_filter:            Option<ErrorFilter>,
    on_warning:              Option<WarningSink>,
    collect_warnings:        bool,
}

impl WalkBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:                    root.into(),
            file_filter:             None,
            directory_filter:        None,
            entry_type:              EntryType::default(),
            max_depth:               None,
            always_stat:             false,
            lstat:                   false,
            throw_on_broken_symlink: false,
            batch_size:              DEFAULT_BATCH_SIZE,
            error_filter:            None,
            on_warning:              None,
            collect_warnings:        false,
        }
    }

    // ── Filters ───────────────────────────────────────────────────────────

    /// Filter applied to files (and anything else emitted as a non-directory).
    ///
    /// Accepts a glob (`"*.txt"`), a list of globs where a leading `!`
    /// excludes (`["*.js", "!*.test.js"]`), or a [`FilterSpec`] predicate.
    pub fn file_filter(mut self, spec: impl Into<FilterSpec>) -> Self {
        self.file_filter = Some(spec.into());
        self
    }

    /// Filter applied to directories. A directory that fails it is neither
    /// emitted nor descended into.
    pub fn directory_filter(mut self, spec: impl Into<FilterSpec>) -> Self {
        self.directory_filter = Some(spec.into());
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Which entries to emit. Defaults to [`EntryType::Files`].
    pub fn entry_type(mut self, t: EntryType) -> Self {
        self.entry_type = t;
        self
    }

    /// Maximum depth. Entries directly under the root have depth 1, so
    /// `1` lists the root only, `2` adds one level of subdirectories, and
    /// `0` emits nothing. Unlimited by default.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    /// Attach metadata to every entry. Off by default to avoid a `stat()`
    /// per entry when nothing needs it.
    pub fn always_stat(mut self, yes: bool) -> Self {
        self.always_stat = yes;
        self
    }

    /// Use `lstat` semantics: symlinks are not followed, and are reported as
    /// files instead of being resolved.
    pub fn lstat(mut self, yes: bool) -> Self {
        self.lstat = yes;
        self
    }

    /// Treat a dangling symlink as fatal rather than a warning.
    pub fn throw_on_broken_symlink(mut self, yes: bool) -> Self {
        self.throw_on_broken_symlink = yes;
        self
    }

    /// Pull size used by [`Walker::collect`] and [`Walker::run`].
    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    // ── Errors ────────────────────────────────────────────────────────────

    /// Replace the default expected-error classification. Return `true` to
    /// skip past an error, `false` to halt on it.
    pub fn error_filter<P>(mut self, p: P) -> Self
    where
        P: Fn(&WalkError) -> bool + Send + Sync + 'static,
    {
        self.error_filter = Some(Arc::new(p));
        self
    }

    /// Called for every expected error the walk skips past.
    pub fn on_warning<W>(mut self, w: W) -> Self
    where
        W: Fn(&WalkError) + Send + Sync + 'static,
    {
        self.on_warning = Some(Arc::new(w));
        self
    }

    /// Keep warnings for [`Results::warnings`](crate::Results::warnings).
    pub fn collect_warnings(mut self, yes: bool) -> Self {
        self.collect_warnings = yes;
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// Build an async walker over the local filesystem via Tokio.
    ///
    /// # Errors
    ///
    /// Fails on invalid glob patterns or a zero batch size.
    pub fn build(self) -> Result<Walker<TokioFs>, WalkError> {
        self.build_with(TokioFs)
    }

    /// Build a blocking walker over the local filesystem.
    pub fn build_sync(self) -> Result<SyncWalker<StdFs>, WalkError> {
        self.build_with(StdFs).map(SyncWalker::new)
    }

    /// Build an async walker over any [`FileSystem`].
    pub fn build_with<F: FileSystem>(self, fs: F) -> Result<Walker<F>, WalkError> {
        Ok(Walker::new(fs, Arc::new(self.settings()?)))
    }

    fn settings(self) -> Result<Settings, WalkError> {
        if self.batch_size == 0 {
            return Err(WalkError::InvalidBatchSize(self.batch_size));
        }
        Ok(Settings {
            root:                    self.root,
            file_filter:             compile_filter(self.file_filter)?,
            directory_filter:        compile_filter(self.directory_filter)?,
            entry_type:              self.entry_type,
            max_depth:               self.max_depth,
            always_stat:             self.always_stat,
            follow_symlinks:         !self.lstat,
            throw_on_broken_symlink: self.throw_on_broken_symlink,
            batch_size:              self.batch_size,
            error_policy:            ErrorPolicy::new(self.error_filter),
            on_warning:              self.on_warning,
            collect_warnings:        self.collect_warnings,
        })
    }
}
