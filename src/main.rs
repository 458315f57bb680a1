//! CLI entry point for the subway countdown board.
//!
//! Provides the long-running board loop plus one-shot subcommands for
//! predictions, static dataset sync and inspecting the reference tables.

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use subway_countdown::{
    board::Board,
    complexes,
    config::FeedConfig,
    download,
    fetch::{BasicClient, HttpClient, auth::ApiKey},
    output::{print_pretty, write_json},
    realtime::FeedFetcher,
    refresh::{Refresher, StaticSource},
    static_data::{StaticData, distinct_headsigns},
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const SUPPLEMENTAL_URL: &str = "https://rrgtfsfeeds.s3.amazonaws.com/gtfs_supplemented.zip";

#[derive(Parser)]
#[command(name = "subway_countdown")]
#[command(about = "Subway arrival countdown board driven by GTFS-realtime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the countdown board, refreshing and rotating on timers
    Watch(WatchArgs),
    /// Fetch and rank predictions once, printing them as JSON
    Predict {
        /// Stop id prefix to show arrivals for (e.g. "R36" or "R36S")
        #[arg(short, long, default_value = "R36")]
        stop: String,

        /// Maximum number of predictions
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        /// JSON file with the feed base URL and per-line suffixes
        #[arg(short, long, default_value = "urls.json")]
        config: String,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Download the supplemental static dataset if it changed, then extract it
    SyncStatic {
        #[arg(long, default_value = SUPPLEMENTAL_URL)]
        url: String,

        /// Local path of the cached ZIP
        #[arg(long, default_value = "gtfs_supplemented.zip")]
        zip_path: PathBuf,

        /// Directory to extract into
        #[arg(short, long, default_value = "gtfs-supplemented")]
        dir: PathBuf,
    },
    /// Group stops into station complexes using stops.txt and transfers.txt
    Complexes {
        #[arg(short, long, default_value = "gtfs")]
        gtfs_dir: PathBuf,
    },
    /// Print every distinct headsign, longest first
    Headsigns {
        #[arg(short, long, default_value = "gtfs")]
        gtfs_dir: PathBuf,

        #[arg(short, long, default_value = "gtfs-supplemented")]
        supplemental_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// Stop id prefix to show arrivals for (e.g. "R36" or "R36S")
    #[arg(short, long, default_value = "R36")]
    stop: String,

    /// Number of ranked predictions kept for rotation
    #[arg(short = 'n', long, default_value_t = 5)]
    count: usize,

    /// JSON file with the feed base URL and per-line suffixes
    #[arg(short, long, default_value = "urls.json")]
    config: String,

    /// Base GTFS static directory (stops.txt, trips.txt)
    #[arg(short, long, default_value = "gtfs")]
    gtfs_dir: PathBuf,

    /// Supplemental GTFS directory whose trips.txt overrides the base
    #[arg(long, default_value = "gtfs-supplemented")]
    supplemental_dir: PathBuf,

    /// Remote ZIP of the supplemental dataset
    #[arg(long, default_value = SUPPLEMENTAL_URL)]
    supplemental_url: String,

    /// Local path of the cached supplemental ZIP
    #[arg(long, default_value = "gtfs_supplemented.zip")]
    zip_path: PathBuf,

    /// Seconds between feed refreshes
    #[arg(long, default_value_t = 30)]
    refresh_secs: u64,

    /// Seconds between secondary-row rotations
    #[arg(long, default_value_t = 5)]
    rotate_secs: u64,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Skip the supplemental dataset sync on refresh
    #[arg(long, default_value_t = false)]
    no_sync: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/subway_countdown.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_countdown.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch(args) => watch(args).await?,
        Commands::Predict {
            stop,
            count,
            config,
            timeout_secs,
        } => {
            let fetcher = FeedFetcher::new(feed_client(timeout_secs)?, FeedConfig::load(&config)?);
            let predictions = fetcher
                .predictions(&stop, Utc::now().timestamp(), count)
                .await?;
            print_pretty(&predictions);
            write_json(std::io::stdout().lock(), &predictions)?;
        }
        Commands::SyncStatic { url, zip_path, dir } => {
            let client = BasicClient::with_timeout(STATIC_TIMEOUT)?;
            if download::sync(&client, &url, &zip_path, &dir).await? {
                info!(dir = %dir.display(), "Static dataset updated");
            } else {
                info!("Static dataset unchanged");
            }
        }
        Commands::Complexes { gtfs_dir } => {
            let complexes =
                complexes::load(&gtfs_dir.join("stops.txt"), &gtfs_dir.join("transfers.txt"))?;

            let mut ids: Vec<_> = complexes.complexes.keys().collect();
            ids.sort();
            for id in ids {
                let members = complexes.members(id);
                let name = complexes.station_names.get(id).map(String::as_str);
                if members.len() > 1 {
                    info!(complex_id = %id, name, members = ?members, "Complex");
                } else {
                    debug!(complex_id = %id, name, "Singleton complex");
                }
            }
        }
        Commands::Headsigns {
            gtfs_dir,
            supplemental_dir,
        } => {
            let data = StaticData::load(&gtfs_dir, Some(&supplemental_dir))?;
            let mut stdout = std::io::stdout().lock();
            for headsign in distinct_headsigns(&data.headsigns) {
                writeln!(stdout, "{headsign}")?;
            }
        }
    }

    Ok(())
}

/// ZIP downloads are much larger than feed snapshots.
const STATIC_TIMEOUT: Duration = Duration::from_secs(300);

/// Builds the transport for realtime feeds, adding the `MTA_API_KEY` header
/// when that variable is set.
fn feed_client(timeout_secs: u64) -> Result<Box<dyn HttpClient>> {
    let basic = BasicClient::with_timeout(Duration::from_secs(timeout_secs))?;
    match std::env::var("MTA_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(Box::new(ApiKey::mta(basic, &key)?)),
        _ => Ok(Box::new(basic)),
    }
}

/// Runs the board until Ctrl+C: one timer refreshes predictions, a faster
/// one rotates the secondary row. Both run on this thread.
#[tracing::instrument]
async fn watch(args: WatchArgs) -> Result<()> {
    let fetcher = FeedFetcher::new(feed_client(args.timeout_secs)?, FeedConfig::load(&args.config)?);
    let source = (!args.no_sync).then(|| StaticSource {
        url: args.supplemental_url.clone(),
        zip_path: args.zip_path.clone(),
        dir: args.supplemental_dir.clone(),
    });
    let refresher = Refresher::new(
        fetcher,
        BasicClient::with_timeout(STATIC_TIMEOUT)?,
        source,
        args.stop.clone(),
        args.count,
    );
    let mut data = StaticData::load(&args.gtfs_dir, Some(&args.supplemental_dir))?;
    let mut board = Board::new();

    let mut refresh = tokio::time::interval(Duration::from_secs(args.refresh_secs.max(1)));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut rotate = tokio::time::interval(Duration::from_secs(args.rotate_secs.max(1)));
    rotate.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately; rotation should wait a full period
    rotate.tick().await;

    info!(stop = %args.stop, refresh_secs = args.refresh_secs, "Board started. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                if let Err(e) = refresher.refresh(&mut data, &mut board, Utc::now().timestamp()).await {
                    error!(error = %e, "Refresh failed, keeping previous predictions");
                }
                draw(&board, refresher.stop(), &data)?;
            }
            _ = rotate.tick() => {
                board.rotate();
                draw(&board, refresher.stop(), &data)?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn draw(board: &Board, stop: &str, data: &StaticData) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    // clear screen and home the cursor
    write!(
        stdout,
        "\x1B[2J\x1B[H{}",
        board.render(stop, data, Utc::now().timestamp())
    )?;
    stdout.flush()?;
    Ok(())
}
