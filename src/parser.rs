//! Protobuf parser for GTFS Realtime feeds.

use anyhow::{Context, Result};
use prost::Message;

use crate::gtfs_rt::{FeedMessage, TripUpdate};

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage> {
    FeedMessage::decode(bytes).context("malformed GTFS-realtime payload")
}

/// Takes the trip-update entities out of a feed, in feed order.
pub fn trip_updates(feed: FeedMessage) -> Vec<TripUpdate> {
    feed.entity
        .into_iter()
        .filter_map(|entity| entity.trip_update)
        .collect()
}
