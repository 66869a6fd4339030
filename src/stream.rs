//! Async consumption modes over a [`Walker`].

use std::time::Instant;

use futures::stream::{self, BoxStream, StreamExt};

use crate::engine::Walker;
use crate::entry::Entry;
use crate::error::WalkError;
use crate::results::{Results, ScanStats};
use crate::traits::FileSystem;

impl<F: FileSystem> Walker<F> {
    /// Pull up to `n` entries.
    ///
    /// Does exactly as much I/O as needed for the batch. An empty batch means
    /// the walk is over. If a fatal error hits after part of the batch was
    /// produced, the partial batch is returned and the error comes back from
    /// the next call.
    pub async fn read(&mut self, n: usize) -> Result<Vec<Entry>, WalkError> {
        let mut batch = Vec::with_capacity(n.min(self.settings().batch_size));
        while batch.len() < n {
            match self.next_entry().await {
                Some(Ok(entry)) => batch.push(entry),
                Some(Err(err)) if batch.is_empty() => return Err(err),
                Some(Err(err)) => {
                    self.deferred = Some(err);
                    break;
                }
                None => break,
            }
        }
        Ok(batch)
    }

    /// Pull-based stream of entries. Each poll of the stream is one unit of
    /// demand; nothing is read while the stream is not polled.
    pub fn into_stream(self) -> BoxStream<'static, Result<Entry, WalkError>>
    where
        F: 'static,
    {
        stream::unfold(self, |mut walker| async move {
            walker.next_entry().await.map(|item| (item, walker))
        })
        .boxed()
    }

    /// Drive the walk to completion and return every emitted entry in order,
    /// or the first fatal error.
    ///
    /// Holds every matched entry in memory; use [`read`](Walker::read) or
    /// [`into_stream`](Walker::into_stream) for unbounded trees.
    pub async fn collect(self) -> Result<Vec<Entry>, WalkError> {
        self.run().await.map(|results| results.entries)
    }

    /// Like [`collect`](Walker::collect), also returning warnings (with
    /// `collect_warnings(true)`) and scan statistics.
    pub async fn run(mut self) -> Result<Results, WalkError> {
        let start = Instant::now();
        let batch_size = self.settings().batch_size;
        let mut entries = Vec::new();
        loop {
            let batch = self.read(batch_size).await?;
            if batch.is_empty() {
                break;
            }
            entries.extend(batch);
        }
        let (files, dirs) = self.seen();
        Ok(Results {
            entries,
            warnings: self.take_warnings(),
            stats: ScanStats::compute(files, dirs, start.elapsed()),
        })
    }
}
