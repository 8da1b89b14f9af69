//! LMDB-backed cache table.
//!
//! Uses the heed crate (Rust bindings for LMDB) for the durable slot. Two
//! named databases live in the environment:
//!
//! - `meta` holds the schema version marker written when the store is first
//!   created;
//! - `feed` holds the single snapshot under a fixed key.
//!
//! # Atomicity
//!
//! LMDB transactions are ACID. Every mutation runs inside one write
//! transaction; an error path drops the transaction before commit, which
//! aborts it, so the slot is always either the pre-operation or the
//! post-operation state.
//!
//! # Schema check
//!
//! A fresh environment gets the schema laid down and stamped. An existing
//! environment whose marker is missing, unreadable, or from a different
//! version fails construction with [`StoreError::SchemaNotFound`]; the store
//! is unusable and is not constructed.

use std::path::{Path, PathBuf};

use feedcache_core::{FeedSnapshot, StoreError, StoreResult};
use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use tracing::{debug, trace};

use crate::codec;
use crate::table::CacheTable;

const META_DB: &str = "meta";
const FEED_DB: &str = "feed";
const SCHEMA_VERSION_KEY: &str = "schema_version";
const SCHEMA_VERSION: &str = "1";
const CURRENT_KEY: &[u8] = b"current";

/// Error type for LMDB table operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbTableError {
    /// Failed to open or create the LMDB environment.
    #[error("failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open or create a database within the environment.
    #[error("failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbTableError> for StoreError {
    fn from(e: LmdbTableError) -> Self {
        StoreError::io(e.to_string())
    }
}

/// Construction options for the LMDB environment.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Maximum size of the memory map in megabytes.
    pub map_size_mb: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { map_size_mb: 64 }
    }
}

impl StoreOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum memory-map size.
    pub fn with_map_size_mb(mut self, map_size_mb: usize) -> Self {
        self.map_size_mb = map_size_mb;
        self
    }
}

/// LMDB-backed implementation of [`CacheTable`].
pub struct LmdbCacheTable {
    env: Env,
    feed: Database<Bytes, Bytes>,
    path: PathBuf,
}

impl std::fmt::Debug for LmdbCacheTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbCacheTable")
            .field("path", &self.path)
            .finish()
    }
}

impl LmdbCacheTable {
    /// Open (or create) the store at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::SchemaNotFound`] if an existing environment does not
    ///   carry the expected schema.
    /// - [`StoreError::Io`] if the environment cannot be opened.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> StoreResult<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(LmdbTableError::Io)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(options.map_size_mb * 1024 * 1024)
                .max_dbs(2)
                .open(path)
        }
        .map_err(|e| LmdbTableError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        let meta: Option<Database<Str, Str>> = env
            .open_database(&wtxn, Some(META_DB))
            .map_err(|e| LmdbTableError::DbOpen(e.to_string()))?;

        let feed = match meta {
            Some(meta) => {
                // Existing environment: the marker and the feed database
                // must both be present and the version must match.
                let version = meta
                    .get(&wtxn, SCHEMA_VERSION_KEY)
                    .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;
                if version != Some(SCHEMA_VERSION) {
                    return Err(Self::schema_not_found(path));
                }
                env.open_database::<Bytes, Bytes>(&wtxn, Some(FEED_DB))
                    .map_err(|e| LmdbTableError::DbOpen(e.to_string()))?
                    .ok_or_else(|| Self::schema_not_found(path))?
            }
            None => {
                // No marker. A feed database that exists anyway is foreign
                // state from some other writer, not a store of ours.
                if env
                    .open_database::<Bytes, Bytes>(&wtxn, Some(FEED_DB))
                    .map_err(|e| LmdbTableError::DbOpen(e.to_string()))?
                    .is_some()
                {
                    return Err(Self::schema_not_found(path));
                }

                // Fresh environment: lay down the schema and stamp it.
                let meta: Database<Str, Str> = env
                    .create_database(&mut wtxn, Some(META_DB))
                    .map_err(|e| LmdbTableError::DbOpen(e.to_string()))?;
                meta.put(&mut wtxn, SCHEMA_VERSION_KEY, SCHEMA_VERSION)
                    .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;
                env.create_database(&mut wtxn, Some(FEED_DB))
                    .map_err(|e| LmdbTableError::DbOpen(e.to_string()))?
            }
        };

        wtxn.commit()
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        debug!(path = %path.display(), "opened feed cache store");

        Ok(Self {
            env,
            feed,
            path: path.to_path_buf(),
        })
    }

    /// Location of the durable state.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn schema_not_found(path: &Path) -> StoreError {
        StoreError::SchemaNotFound {
            schema: format!("{FEED_DB} v{SCHEMA_VERSION}"),
            path: path.to_path_buf(),
        }
    }
}

impl CacheTable for LmdbCacheTable {
    fn fetch_current(&mut self) -> StoreResult<Option<FeedSnapshot>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        match self
            .feed
            .get(&rtxn, CURRENT_KEY)
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?
        {
            Some(bytes) => Ok(Some(codec::decode(bytes)?)),
            None => Ok(None),
        }
    }

    fn delete_current(&mut self) -> StoreResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        // An empty slot is a no-op success.
        let deleted = self
            .feed
            .delete(&mut wtxn, CURRENT_KEY)
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        if deleted {
            trace!("deleted cached feed");
        } else {
            trace!("delete on empty slot, nothing to remove");
        }
        Ok(())
    }

    fn insert_new(&mut self, snapshot: &FeedSnapshot) -> StoreResult<()> {
        let bytes = codec::encode(snapshot)?;

        // Delete and put share one transaction: both land or neither does.
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        self.feed
            .delete(&mut wtxn, CURRENT_KEY)
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;
        self.feed
            .put(&mut wtxn, CURRENT_KEY, &bytes)
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbTableError::Transaction(e.to_string()))?;

        trace!(items = snapshot.feed.len(), "replaced cached feed");
        Ok(())
    }
}
