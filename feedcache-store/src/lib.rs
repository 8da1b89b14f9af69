//! feedcache store - durable single-slot feed snapshot store.
//!
//! Persists one "current feed" (an ordered list of images plus a timestamp)
//! to disk, replacing it wholesale on every insert. The public surface is the
//! [`FeedStore`] facade with three asynchronous operations: `retrieve`,
//! `insert`, and `delete_cached_feed`.
//!
//! # Architecture
//!
//! - [`codec`] converts between [`feedcache_core::FeedSnapshot`] and the
//!   durable byte form.
//! - [`table`] defines the [`CacheTable`] seam: the three primitives every
//!   storage backend must provide (fetch / delete / delete-then-insert).
//! - [`lmdb`] implements that seam on top of heed (LMDB). Write transactions
//!   make delete-then-insert a single atomic unit with rollback on failure.
//! - [`serial`] runs all backend work on one dedicated worker in strict FIFO
//!   submission order, so concurrent callers can never observe or produce a
//!   torn snapshot.
//! - [`store`] ties the pieces together and delivers exactly one result per
//!   operation through a oneshot completion channel.
//!
//! # Concurrency contract
//!
//! Callers on any number of threads may invoke operations simultaneously.
//! Submission is non-blocking and happens at call time, before the returned
//! future is first polled, so effects apply in call order. Blocking backend
//! I/O blocks only the worker, never callers. Once submitted, an operation
//! runs to completion even if its future is dropped.

pub mod codec;
pub mod lmdb;
pub mod serial;
pub mod store;
pub mod table;

pub use lmdb::{LmdbCacheTable, LmdbTableError, StoreOptions};
pub use serial::SerialExecutor;
pub use store::FeedStore;
pub use table::CacheTable;
