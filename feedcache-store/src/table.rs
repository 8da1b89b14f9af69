//! Cache table abstraction: the pluggable-backend seam.
//!
//! A [`CacheTable`] holds at most one [`FeedSnapshot`] and exposes the three
//! primitives the store facade needs. Implementations run each primitive
//! inside their own transaction scope; on failure the staged mutation is
//! rolled back before the error is returned, so no partial state is ever
//! visible to a later `fetch_current`.

use feedcache_core::{FeedSnapshot, StoreResult};

/// The three primitive operations against the durable slot.
///
/// Methods take `&mut self`: the serial worker owns the table exclusively,
/// and the exclusive borrow makes that ownership explicit at the seam.
pub trait CacheTable: Send + 'static {
    /// Return the stored snapshot, or `None` if the slot is empty (not an
    /// error). Items are fully materialized; there is no lazy loading.
    fn fetch_current(&mut self) -> StoreResult<Option<FeedSnapshot>>;

    /// Remove the stored snapshot and all its owned items. Succeeds as a
    /// no-op when the slot is already empty.
    fn delete_current(&mut self) -> StoreResult<()>;

    /// Replace the slot: delete any existing snapshot, then store the new
    /// one, as a single atomic unit. Either both take effect or neither
    /// does.
    fn insert_new(&mut self, snapshot: &FeedSnapshot) -> StoreResult<()>;
}
