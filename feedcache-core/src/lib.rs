//! feedcache core - entity types
//!
//! Pure data structures with no behavior. The store crate depends on this.
//! This crate contains ONLY data types - no persistence logic.

pub mod error;

pub use error::{StoreError, StoreResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Identifier for a cached feed image.
///
/// Opaque 128-bit value, assigned when the image first enters the feed and
/// immutable afterwards. The store never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedImageId(Uuid);

impl FeedImageId {
    /// Wrap an existing UUID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh UUIDv7 id (timestamp-sortable).
    pub fn now_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for FeedImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

/// One cached feed item.
///
/// `id` and `url` are always present; `description` and `location` may be
/// absent. Images have no identity outside the snapshot that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedImage {
    pub id: FeedImageId,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: String,
}

impl FeedImage {
    /// Create an image with the required fields only.
    pub fn new(id: FeedImageId, url: impl Into<String>) -> Self {
        Self {
            id,
            description: None,
            location: None,
            url: url.into(),
        }
    }

    /// Set the optional description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the optional location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// The single persisted cache entry: an ordered feed plus the time it was
/// written.
///
/// At most one snapshot exists in a store at any time. It is created by an
/// insert, replaced wholesale by the next insert, and destroyed by a delete.
/// Item order is significant and round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub feed: Vec<FeedImage>,
    pub timestamp: Timestamp,
}

impl FeedSnapshot {
    pub fn new(feed: Vec<FeedImage>, timestamp: Timestamp) -> Self {
        Self { feed, timestamp }
    }
}

/// Result of a cache retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedFeed {
    /// The store holds no snapshot.
    Empty,
    /// The store holds a snapshot; items are fully materialized and in
    /// insertion order.
    Found {
        feed: Vec<FeedImage>,
        timestamp: Timestamp,
    },
}

impl From<Option<FeedSnapshot>> for CachedFeed {
    fn from(snapshot: Option<FeedSnapshot>) -> Self {
        match snapshot {
            Some(FeedSnapshot { feed, timestamp }) => CachedFeed::Found { feed, timestamp },
            None => CachedFeed::Empty,
        }
    }
}
