//! gf_cache CLI
//!
//! Live polling against a directory of feed payloads, one-off diffs and
//! inspection of saved payloads, completed-game cache packing.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "gf_cache")]
#[command(about = "Poll, diff and cache live game feed snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Poll the scheduled games and print what changes
    Watch {
        /// Directory holding <event_id>.json payloads
        #[arg(long)]
        feed_dir: PathBuf,

        /// Schedule JSON file
        #[arg(long)]
        schedule: PathBuf,

        /// Cache completed games here
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Poller config (YAML or JSON); defaults to $GF_POLLER_CONFIG
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop at this RFC3339 time
        #[arg(long)]
        until: Option<String>,
    },

    /// Diff two saved payloads of one game
    Diff {
        #[arg(long)]
        event_id: String,

        #[arg(long)]
        before: PathBuf,

        #[arg(long)]
        after: PathBuf,
    },

    /// Print the drives and plays of a saved payload
    Inspect {
        #[arg(long)]
        event_id: String,

        #[arg(long)]
        snapshot: PathBuf,
    },

    /// Pack a saved payload into the completed-game cache
    Pack {
        #[arg(long)]
        event_id: String,

        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long)]
        cache_dir: PathBuf,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Verify a cache entry
    Verify {
        #[arg(long)]
        event_id: String,

        #[arg(long)]
        cache_dir: PathBuf,

        /// Expected SHA256 of the entry file
        #[arg(long)]
        checksum: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { feed_dir, schedule, cache_dir, config, until } => {
            watch(feed_dir, schedule, cache_dir, config, until)?;
        }

        Commands::Diff { event_id, before, after } => {
            let before = load_snapshot(&event_id, &before)?;
            let after = load_snapshot(&event_id, &after)?;
            let delta = gf_core::diff(&before, &after)?;
            println!("{}", serde_json::to_string_pretty(&delta)?);
        }

        Commands::Inspect { event_id, snapshot } => {
            let snap = load_snapshot(&event_id, &snapshot)?;
            print_snapshot(&snap);
        }

        Commands::Pack { event_id, snapshot, cache_dir, metadata } => {
            println!("Packing {event_id}...");
            println!("   Input:  {}", snapshot.display());
            println!("   Cache:  {}", cache_dir.display());

            let meta = gf_cache::pack_snapshot(&snapshot, &cache_dir, &event_id)?;
            print_metadata(&meta);

            if let Some(path) = metadata {
                let json = serde_json::to_string_pretty(&meta)?;
                std::fs::write(&path, json)?;
                println!("\nMetadata saved to: {}", path.display());
            }
        }

        Commands::Verify { event_id, cache_dir, checksum } => {
            println!("Verifying {event_id} in {}...", cache_dir.display());
            if gf_cache::verify_entry(&cache_dir, &event_id, checksum.as_deref())? {
                println!("Cache verification passed");
            } else {
                anyhow::bail!("Cache verification failed for {event_id}");
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn watch(
    feed_dir: PathBuf,
    schedule: PathBuf,
    cache_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    until: Option<String>,
) -> Result<()> {
    use gf_cache::{CachingFeed, DirectoryFeed, JsonSchedule, SnapshotCache};
    use gf_core::{LivePoller, PollerConfig, SnapshotFeed, SystemClock};
    use std::sync::Arc;

    let config = match config {
        Some(path) => PollerConfig::from_file(&path.to_string_lossy())?,
        None => PollerConfig::from_env()?,
    };
    let deadline = until
        .map(|t| chrono::DateTime::parse_from_rfc3339(&t).map(|d| d.with_timezone(&chrono::Utc)))
        .transpose()
        .context("--until must be an RFC3339 timestamp")?;

    let feed: Arc<dyn SnapshotFeed> = match cache_dir {
        Some(dir) => {
            let cache = SnapshotCache::open(&dir)
                .with_context(|| format!("Failed to open cache directory: {}", dir.display()))?;
            Arc::new(CachingFeed::new(DirectoryFeed::new(feed_dir), cache))
        }
        None => Arc::new(DirectoryFeed::new(feed_dir)),
    };

    let tie_policy = config.tie_policy.clone();
    let mut poller = LivePoller::new(config, feed, JsonSchedule::new(schedule), SystemClock)?;
    poller.start()?;
    poller.run(deadline, |report| {
        for snap in &report.active {
            println!("{}", scoreline(snap));
        }
        for snap in &report.completed {
            println!("FINAL {} (winner: {})", scoreline(snap), snap.winner(&tie_policy).join(", "));
        }
        for delta in &report.diffs {
            println!("-- {} {} -> {}", delta.event_id, delta.before_clock, delta.after_clock);
            for play in &delta.plays {
                println!("   [{}] {}", play.clock, play.description);
            }
            for (id, stats) in &delta.entities {
                let fields: Vec<String> = stats.iter().map(|(k, v)| format!("{k} +{v}")).collect();
                println!("   {} ({id}): {}", stats.name, fields.join(", "));
            }
        }
    })?;
    Ok(())
}

#[cfg(feature = "cli")]
fn load_snapshot(event_id: &str, path: &Path) -> Result<gf_core::EventSnapshot> {
    let raw = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
    gf_core::SnapshotParser::default()
        .parse(event_id, &raw)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))
}

#[cfg(feature = "cli")]
fn scoreline(snap: &gf_core::EventSnapshot) -> String {
    format!(
        "{} {} {} @ {} {} [{}]",
        snap.event_id,
        snap.away.abbr,
        snap.away.score.total,
        snap.home.abbr,
        snap.home.score.total,
        snap.clock
    )
}

#[cfg(feature = "cli")]
fn print_snapshot(snap: &gf_core::EventSnapshot) {
    use gf_core::data::StatCategory;

    println!("{}", scoreline(snap));
    for drive in &snap.drives {
        let start = drive.start_position.map(|p| p.to_string()).unwrap_or_default();
        let end = drive.end_position.map(|p| p.to_string()).unwrap_or_default();
        println!(
            "\nDrive {} {}: {} -> {}, {} yds, {} ({})",
            drive.drive_id,
            drive.team,
            start,
            end,
            drive.total_yards,
            drive.result.as_deref().unwrap_or("-"),
            drive.possession
        );
        for play in &drive.plays {
            println!("   {:>5} [{}] {}", play.play_id, play.clock, play.description);
        }
    }
    println!("\nPlayers:");
    for stats in &snap.player_stats() {
        let rating = stats.passer_rating().map(|r| format!(" rating {r:.1}")).unwrap_or_default();
        println!("   {:<20} {} {} fields{}", stats.name, stats.owner.id, stats.len(), rating);
    }
    for category in [StatCategory::Passing, StatCategory::Rushing, StatCategory::Receiving] {
        let field = format!("{}_yds", category.prefix());
        let leaders = snap.player_stats().category(category).sort_by_field(&field, true).limit(1);
        if let Some(leader) = leaders.iter().next() {
            println!("   {field} leader: {} ({})", leader.name, leader.get(&field));
        }
    }
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &gf_cache::CacheMetadata) {
    println!("\nCache entry written");
    println!(
        "   Original size:   {} bytes ({:.2} KB)",
        meta.original_size,
        meta.original_size as f64 / 1024.0
    );
    println!(
        "   Compressed size: {} bytes ({:.2} KB)",
        meta.compressed_size,
        meta.compressed_size as f64 / 1024.0
    );
    println!("   Compression:     {:.1}%", meta.compression_ratio * 100.0);
    println!("   Checksum:        {}", meta.checksum);
    println!("   Created:         {}", meta.created_at);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("gf_cache CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
