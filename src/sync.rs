//! Blocking consumption mode.

use futures::executor::block_on;

use crate::engine::{WalkState, Walker};
use crate::entry::Entry;
use crate::error::WalkError;
use crate::fs::StdFs;
use crate::results::Results;
use crate::traits::FileSystem;

/// Blocking walker.
///
/// The same scheduler as the async adapters, driven over a filesystem whose
/// calls block (by default [`StdFs`]), so every suspension point becomes a
/// plain blocking call. Does not need an async runtime.
pub struct SyncWalker<F = StdFs> {
    inner: Walker<F>,
}

impl<F: FileSystem> SyncWalker<F> {
    pub(crate) fn new(inner: Walker<F>) -> Self {
        Self { inner }
    }

    pub fn state(&self) -> WalkState {
        self.inner.state()
    }

    /// Pull up to `n` entries. See [`Walker::read`].
    pub fn read(&mut self, n: usize) -> Result<Vec<Entry>, WalkError> {
        block_on(self.inner.read(n))
    }

    /// Collect every emitted entry, or fail with the first fatal error.
    pub fn collect_all(self) -> Result<Vec<Entry>, WalkError> {
        block_on(self.inner.collect())
    }

    /// Collect entries, warnings and scan statistics.
    pub fn run(self) -> Result<Results, WalkError> {
        block_on(self.inner.run())
    }

    pub fn take_warnings(&mut self) -> Vec<WalkError> {
        self.inner.take_warnings()
    }

    pub fn into_inner(self) -> Walker<F> {
        self.inner
    }
}

impl<F: FileSystem> Iterator for SyncWalker<F> {
    type Item = Result<Entry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        block_on(self.inner.next_entry())
    }
}
