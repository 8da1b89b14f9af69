//! Durable record codec for the feed slot.
//!
//! On-disk value format:
//!
//! ```text
//! +------------------+
//! | Format Tag       | (u8, currently 1)
//! +------------------+
//! | Snapshot Body    | (JSON: ordered feed + timestamp)
//! +------------------+
//! ```
//!
//! The round trip is lossless: item order, absent optional fields, and full
//! nanosecond timestamp precision all survive `decode(encode(s)) == s`.
//! Malformed bytes decode to [`StoreError::CorruptData`]; items are never
//! silently dropped or reordered.

use feedcache_core::{FeedSnapshot, StoreError, StoreResult};

/// Current durable format tag. Bump when the body layout changes.
pub const FORMAT_TAG: u8 = 1;

/// Encode a snapshot into its durable byte form.
pub fn encode(snapshot: &FeedSnapshot) -> StoreResult<Vec<u8>> {
    let body = serde_json::to_vec(snapshot)
        .map_err(|e| StoreError::corrupt(format!("unencodable snapshot: {e}")))?;

    let mut bytes = Vec::with_capacity(1 + body.len());
    bytes.push(FORMAT_TAG);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode durable bytes back into a snapshot.
pub fn decode(bytes: &[u8]) -> StoreResult<FeedSnapshot> {
    match bytes.split_first() {
        None => Err(StoreError::corrupt("empty record")),
        Some((&FORMAT_TAG, body)) => serde_json::from_slice(body)
            .map_err(|e| StoreError::corrupt(format!("undecodable snapshot body: {e}"))),
        Some((tag, _)) => Err(StoreError::corrupt(format!("unknown format tag {tag}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use feedcache_core::{FeedImage, FeedImageId};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn sample_feed() -> Vec<FeedImage> {
        vec![
            FeedImage::new(FeedImageId::now_v7(), "https://example.com/first.png")
                .with_description("first")
                .with_location("somewhere"),
            FeedImage::new(FeedImageId::now_v7(), "https://example.com/second.png"),
            FeedImage::new(FeedImageId::now_v7(), "https://example.com/third.png")
                .with_location("elsewhere"),
        ]
    }

    #[test]
    fn test_round_trip_preserves_order_and_optional_fields() {
        let snapshot = FeedSnapshot::new(sample_feed(), Utc::now());
        let decoded = decode(&encode(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_round_trip_of_empty_feed() {
        let snapshot = FeedSnapshot::new(vec![], Utc::now());
        let decoded = decode(&encode(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_round_trip_preserves_nanosecond_timestamps() {
        let timestamp = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let snapshot = FeedSnapshot::new(vec![], timestamp);
        let decoded = decode(&encode(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded.timestamp, timestamp);
    }

    #[test]
    fn test_decode_of_empty_buffer_is_corrupt() {
        assert!(matches!(
            decode(&[]),
            Err(feedcache_core::StoreError::CorruptData { .. })
        ));
    }

    #[test]
    fn test_decode_of_unknown_tag_is_corrupt() {
        let mut bytes = encode(&FeedSnapshot::new(vec![], Utc::now())).unwrap();
        bytes[0] = FORMAT_TAG + 1;
        assert!(matches!(
            decode(&bytes),
            Err(feedcache_core::StoreError::CorruptData { .. })
        ));
    }

    #[test]
    fn test_decode_of_truncated_body_is_corrupt() {
        let bytes = encode(&FeedSnapshot::new(sample_feed(), Utc::now())).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() / 2]),
            Err(feedcache_core::StoreError::CorruptData { .. })
        ));
    }

    fn arb_image() -> impl Strategy<Value = FeedImage> {
        (
            any::<[u8; 16]>(),
            proptest::option::of(".{0,40}"),
            proptest::option::of(".{0,40}"),
            "https://[a-z]{1,12}\\.example/[a-z0-9]{1,16}",
        )
            .prop_map(|(id, description, location, url)| FeedImage {
                id: FeedImageId::new(Uuid::from_bytes(id)),
                description,
                location,
                url,
            })
    }

    fn arb_timestamp() -> impl Strategy<Value = feedcache_core::Timestamp> {
        (0i64..=4_102_444_800, 0u32..1_000_000_000)
            .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
    }

    proptest! {
        #[test]
        fn prop_round_trip_is_lossless(
            feed in proptest::collection::vec(arb_image(), 0..12),
            timestamp in arb_timestamp(),
        ) {
            let snapshot = FeedSnapshot::new(feed, timestamp);
            let decoded = decode(&encode(&snapshot).unwrap()).unwrap();
            prop_assert_eq!(decoded, snapshot);
        }
    }
}
