//! review-planner CLI.

use std::process;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use review_planner::commands;
use review_planner::db::JsonRepository;
use review_planner::settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "review-planner", version, about = "Spaced-repetition review planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's review plan
    Plan {
        /// Maximum items (defaults to daily_limit from config.json)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Record a review outcome (1=forgot, 2=hard, 3=good, 4=easy, 5=perfect)
    Review { item_id: i64, rating: u8 },

    /// Review statistics over a trailing window
    Stats {
        #[arg(long, default_value = "30")]
        days: u32,
    },

    /// Suggest new items to start reviewing
    Suggest {
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Add an item to the local catalog
    Add {
        id: i64,
        title: String,
        /// easy, medium or hard
        tier: String,
        /// Topic tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        url: Option<String>,
    },
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let dir = settings::data_dir();
    tracing::debug!(dir = %dir.display(), "opening data directory");
    let repo = JsonRepository::open(&dir).context("failed to open data directory")?;
    let now = Utc::now();

    match cli.command {
        Commands::Plan { limit } => commands::plan(&repo, limit, now),
        Commands::Review { item_id, rating } => commands::review(&repo, item_id, rating, now),
        Commands::Stats { days } => commands::stats(&repo, days, now),
        Commands::Suggest { limit } => commands::suggest(&repo, limit),
        Commands::Add {
            id,
            title,
            tier,
            tags,
            url,
        } => commands::add(&repo, id, title, &tier, tags, url),
    }
}
