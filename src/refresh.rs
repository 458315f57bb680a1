//! One board refresh: optional static dataset sync, then fetch and rank.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::download;
use crate::fetch::HttpClient;
use crate::output::print_pretty;
use crate::realtime::FeedFetcher;
use crate::static_data::StaticData;

/// Remote ZIP of the supplemental dataset and where it is cached and
/// extracted locally.
#[derive(Debug, Clone)]
pub struct StaticSource {
    pub url: String,
    pub zip_path: PathBuf,
    pub dir: PathBuf,
}

/// Everything a refresh needs that stays fixed while the board runs.
pub struct Refresher<C, S> {
    fetcher: FeedFetcher<C>,
    static_client: S,
    source: Option<StaticSource>,
    stop: String,
    count: usize,
}

impl<C: HttpClient, S: HttpClient> Refresher<C, S> {
    /// `source` is `None` when the supplemental dataset is not synced.
    pub fn new(
        fetcher: FeedFetcher<C>,
        static_client: S,
        source: Option<StaticSource>,
        stop: impl Into<String>,
        count: usize,
    ) -> Self {
        Self {
            fetcher,
            static_client,
            source,
            stop: stop.into(),
            count,
        }
    }

    pub fn stop(&self) -> &str {
        &self.stop
    }

    /// Syncs the static dataset, then replaces the board with freshly
    /// ranked predictions.
    ///
    /// # Errors
    ///
    /// Only the prediction fetch fails the refresh; the board is left as
    /// it was. Sync and headsign reload problems are logged and the
    /// current headsigns are kept.
    #[tracing::instrument(level = "debug", skip_all, fields(stop = %self.stop))]
    pub async fn refresh(&self, data: &mut StaticData, board: &mut Board, now: i64) -> Result<()> {
        self.sync_static(data).await;

        let predictions = self.fetcher.predictions(&self.stop, now, self.count).await?;
        debug!(count = predictions.len(), "Predictions ranked");
        print_pretty(&predictions);
        board.replace(predictions);
        Ok(())
    }

    async fn sync_static(&self, data: &mut StaticData) {
        let Some(source) = &self.source else {
            return;
        };

        match download::sync(&self.static_client, &source.url, &source.zip_path, &source.dir).await {
            Ok(true) => match data.overlay_headsigns(&source.dir) {
                Ok(_) => info!("Supplemental headsigns reloaded"),
                Err(e) => warn!(error = %e, "Supplemental headsigns not reloaded"),
            },
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Static dataset sync failed"),
        }
    }
}
