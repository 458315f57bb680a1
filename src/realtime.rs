//! Realtime feed fetcher.

use anyhow::Result;
use tracing::debug;

use crate::config::FeedConfig;
use crate::feeds::feed_url;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::gtfs_rt::TripUpdate;
use crate::parser::{parse_feed, trip_updates};
use crate::predictions::{Prediction, rank};

/// Fetches realtime trip updates for a stop or line using a fixed
/// [`FeedConfig`] supplied at construction.
pub struct FeedFetcher<C> {
    client: C,
    config: FeedConfig,
}

impl<C: HttpClient> FeedFetcher<C> {
    pub fn new(client: C, config: FeedConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Performs one GET against the feed serving `id` and returns its
    /// trip-update entities.
    ///
    /// # Errors
    ///
    /// Fails if no feed is configured for `id`, the request fails or the
    /// body is not a valid `FeedMessage`. Nothing is retried.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn trip_updates(&self, id: &str) -> Result<Vec<TripUpdate>> {
        let url = feed_url(&self.config, id)?;
        let bytes = fetch_bytes(&self.client, &url).await?;
        debug!(url = %url, bytes = bytes.len(), "Feed bytes received, parsing");

        let feed = parse_feed(&bytes)?;
        debug!(entity_count = feed.entity.len(), "Feed parsed successfully");

        Ok(trip_updates(feed))
    }

    /// Fetches the feed serving `stop_prefix` and ranks its arrivals there.
    pub async fn predictions(
        &self,
        stop_prefix: &str,
        now: i64,
        limit: usize,
    ) -> Result<Vec<Prediction>> {
        let updates = self.trip_updates(stop_prefix).await?;
        Ok(rank(&updates, stop_prefix, now, limit))
    }
}
