//! Public feed store facade.
//!
//! [`FeedStore`] wires a [`CacheTable`] backend to the serial executor and
//! exposes the three cache operations. Each operation:
//!
//! 1. enqueues its job on the worker **at call time** (so effects apply in
//!    call order even if the returned futures are polled out of order),
//! 2. returns a future that resolves when the worker delivers the result
//!    through a oneshot completion channel,
//! 3. resolves exactly once, on the worker's schedule rather than the
//!    caller's.
//!
//! There is no cancellation: dropping a returned future does not stop the
//! submitted operation, it only discards the result.

use std::future::Future;
use std::path::Path;

use feedcache_core::{CachedFeed, FeedImage, FeedSnapshot, StoreError, StoreResult, Timestamp};
use tokio::sync::oneshot;

use crate::lmdb::{LmdbCacheTable, StoreOptions};
use crate::serial::SerialExecutor;
use crate::table::CacheTable;

/// Durable single-slot feed store.
///
/// Cheap to share behind an `Arc`; all methods take `&self` and may be
/// called concurrently from any number of threads.
pub struct FeedStore<T: CacheTable = LmdbCacheTable> {
    executor: SerialExecutor<T>,
}

impl FeedStore<LmdbCacheTable> {
    /// Open (or create) a store whose durable state lives at `path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::SchemaNotFound`] if the expected schema cannot be
    ///   located at open time. Fatal; the store is not constructed.
    /// - [`StoreError::Io`] if the backend cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open (or create) a store with explicit options.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> StoreResult<Self> {
        let table = LmdbCacheTable::open_with(path, options)?;
        Self::with_table(table)
    }
}

impl<T: CacheTable> FeedStore<T> {
    /// Build a store on top of any [`CacheTable`] backend.
    ///
    /// The worker takes exclusive ownership of `table`; nothing else may
    /// touch backend state afterwards.
    pub fn with_table(table: T) -> StoreResult<Self> {
        let executor = SerialExecutor::spawn("feedcache-store", table)
            .map_err(|e| StoreError::io(format!("failed to spawn store worker: {e}")))?;
        Ok(Self { executor })
    }

    /// Read the current snapshot.
    ///
    /// Resolves to [`CachedFeed::Empty`] when no snapshot is stored, or
    /// [`CachedFeed::Found`] with fully materialized items in their original
    /// order.
    pub fn retrieve(&self) -> impl Future<Output = StoreResult<CachedFeed>> {
        let (tx, rx) = oneshot::channel();
        self.executor.submit(move |table: &mut T| {
            let result = table.fetch_current().map(CachedFeed::from);
            let _ = tx.send(result);
        });
        Self::completed(rx)
    }

    /// Replace the stored snapshot with `(feed, timestamp)`.
    ///
    /// Delete-then-create runs as one atomic unit; on failure the store
    /// state is unchanged.
    pub fn insert(
        &self,
        feed: Vec<FeedImage>,
        timestamp: Timestamp,
    ) -> impl Future<Output = StoreResult<()>> {
        let (tx, rx) = oneshot::channel();
        self.executor.submit(move |table: &mut T| {
            let snapshot = FeedSnapshot::new(feed, timestamp);
            let _ = tx.send(table.insert_new(&snapshot));
        });
        Self::completed(rx)
    }

    /// Remove the stored snapshot, if any. Deleting an empty store succeeds
    /// as a no-op.
    pub fn delete_cached_feed(&self) -> impl Future<Output = StoreResult<()>> {
        let (tx, rx) = oneshot::channel();
        self.executor.submit(move |table: &mut T| {
            let _ = tx.send(table.delete_current());
        });
        Self::completed(rx)
    }

    /// Await the worker's single result for one operation.
    ///
    /// A closed channel means the worker died before completing the job;
    /// that still yields exactly one result for the caller.
    async fn completed<R>(rx: oneshot::Receiver<StoreResult<R>>) -> StoreResult<R> {
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::io(
                "store worker disconnected before completing the operation",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// In-memory table whose operations all panic; used to observe the
    /// exactly-once completion contract when the worker dies.
    struct PanickingTable;

    impl CacheTable for PanickingTable {
        fn fetch_current(&mut self) -> StoreResult<Option<FeedSnapshot>> {
            panic!("backend down");
        }

        fn delete_current(&mut self) -> StoreResult<()> {
            panic!("backend down");
        }

        fn insert_new(&mut self, _snapshot: &FeedSnapshot) -> StoreResult<()> {
            panic!("backend down");
        }
    }

    #[tokio::test]
    async fn test_dead_worker_still_delivers_exactly_one_result() {
        let store = FeedStore::with_table(PanickingTable).unwrap();

        let first = store.retrieve();
        let second = store.delete_cached_feed();

        assert!(matches!(first.await, Err(StoreError::Io { .. })));
        assert!(matches!(second.await, Err(StoreError::Io { .. })));
    }

    #[tokio::test]
    async fn test_dropped_future_does_not_cancel_the_operation() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FeedStore::open(dir.path()).unwrap();

        // Submit and immediately drop the future; the insert must still land.
        drop(store.insert(vec![], Utc::now()));

        let retrieved = store.retrieve().await.unwrap();
        assert!(matches!(retrieved, CachedFeed::Found { .. }));
    }
}
