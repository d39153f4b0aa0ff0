//! CLI entry point for the subway arrivals board.
//!
//! Provides subcommands for showing the current board for a stop, polling it
//! on an interval, and inspecting a raw GTFS-RT payload.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use subway_arrivals::{
    arrivals::{aggregate_arrivals, extract_arrivals},
    config::SubwayConfig,
    fetch::{FeedFetcher, FeedSource},
    output::{print_pretty, render_board, to_json},
    parser::parse_feed,
    service::{DEFAULT_MAX_TRAINS, DEFAULT_STOP_ID, SubwayParams, SubwayService},
    stats::FeedSummary,
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "subway_arrivals")]
#[command(about = "Live subway arrival boards from the MTA GTFS-RT feed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct StopArgs {
    /// GTFS stop id (e.g. A42N)
    #[arg(short, long)]
    stop_id: Option<String>,

    /// Station name shown on the board
    #[arg(long)]
    station_name: Option<String>,

    /// Direction label shown on the board
    #[arg(short, long)]
    direction: Option<String>,

    /// Arrivals to keep per line
    #[arg(short = 'n', long)]
    max_trains: Option<usize>,
}

impl From<StopArgs> for SubwayParams {
    fn from(args: StopArgs) -> Self {
        SubwayParams {
            stop_id: args.stop_id,
            station_name: args.station_name,
            direction: args.direction,
            max_trains: args.max_trains,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current arrival board for a stop
    Show {
        #[command(flatten)]
        stop: StopArgs,

        /// Print the snapshot as JSON instead of a text board
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Refresh the board on an interval, serving from cache between fetches
    Watch {
        #[command(flatten)]
        stop: StopArgs,

        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 30)]
        interval: u64,

        /// Number of refreshes (0 = infinite)
        #[arg(long, default_value_t = 0)]
        samples: usize,
    },
    /// Decode a GTFS-RT payload from a file or URL and summarize it
    Inspect {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Stop to summarize matches for
        #[arg(short, long, default_value = DEFAULT_STOP_ID)]
        stop_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/subway_arrivals.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_arrivals.log"));

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
    let config = SubwayConfig::from_env()?;

    match cli.command {
        Commands::Show { stop, json } => {
            let service = SubwayService::from_config(&config);
            let snapshot = service.get_data(stop.into()).await;

            if json {
                println!("{}", to_json(&*snapshot)?);
            } else {
                println!("{}", render_board(&snapshot));
            }
        }
        Commands::Watch {
            stop,
            interval,
            samples,
        } => {
            watch(&config, stop.into(), interval, samples).await;
        }
        Commands::Inspect { source, stop_id } => {
            let bytes = fetcher(&source).await?;
            let feed = parse_feed(&bytes)?;
            let summary = FeedSummary::from_feed(&feed, &stop_id);
            print_pretty(&summary);
            println!("{}", to_json(&summary)?);

            let now = chrono::Utc::now();
            let aggregated = aggregate_arrivals(extract_arrivals(&feed, &stop_id, now), DEFAULT_MAX_TRAINS);
            for arrival in &aggregated.all {
                println!(
                    "{} train  {}  ({} min)",
                    arrival.line, arrival.arrival_time_str, arrival.minutes_away
                );
            }
        }
    }

    Ok(())
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument(skip_all, fields(source = %source))]
async fn fetcher(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        FeedFetcher::new(source).fetch().await?.to_vec()
    } else {
        std::fs::read(source)?
    };
    Ok(bytes)
}

/// Re-renders the board every `interval` seconds. Reads inside the cache TTL
/// are served without touching the feed.
#[tracing::instrument(skip(config, params), fields(interval, samples))]
async fn watch(config: &SubwayConfig, params: SubwayParams, interval: u64, samples: usize) {
    let service = SubwayService::from_config(config);

    if samples == 0 {
        info!(interval, "Refreshing indefinitely. Press Ctrl+C to stop.");
    }

    let mut sample_count = 0;
    loop {
        if samples > 0 && sample_count >= samples {
            break;
        }
        sample_count += 1;

        let snapshot = service.get_data(params.clone()).await;
        if snapshot.is_empty() {
            warn!(sample = sample_count, "Board is empty");
        } else {
            info!(
                sample = sample_count,
                arrivals = snapshot.arrivals.len(),
                generated_at = %snapshot.generated_at,
                cached_entries = service.cache().entry_count(),
                "Board refreshed"
            );
        }
        println!("{}\n", render_board(&snapshot));

        if samples == 0 || sample_count < samples {
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    }

    info!(samples = sample_count, "Finished watching");
}
