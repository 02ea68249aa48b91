mod error;
mod fetch;
mod parser;
mod pipeline;
mod render;
mod server;
mod store;
mod streaks;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};

use crate::fetch::FetchOptions;
use crate::pipeline::CycleConfig;
use crate::streaks::StreakPolicy;

#[derive(Parser)]
#[command(name = "board_streaks", about = "Track how many days companies stay on a stock breakout board")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// JSON file holding the tracked companies
    #[arg(long = "store", env = "STORE_PATH", default_value = store::DEFAULT_STORE_PATH)]
    path: PathBuf,
}

#[derive(Args)]
struct CycleArgs {
    /// Board page to scrape
    #[arg(long, env = "BOARD_URL", default_value = fetch::DEFAULT_BOARD_URL)]
    url: String,
    #[command(flatten)]
    store: StoreArgs,
    /// Purge companies not seen for this many days
    #[arg(long, env = "PURGE_MAX_AGE_DAYS", default_value_t = 2)]
    max_age_days: u32,
    /// Count given to a newly seen company
    #[arg(long, default_value_t = 1)]
    initial_count: u32,
    /// Seconds to wait for the board's server to accept the connection
    #[arg(long, default_value_t = 5)]
    connect_timeout: u64,
}

impl CycleArgs {
    fn into_config(self) -> CycleConfig {
        CycleConfig {
            url: self.url,
            store_path: self.store.path,
            policy: StreakPolicy {
                initial_count: self.initial_count,
                max_age: chrono::Duration::days(i64::from(self.max_age_days)),
                ..StreakPolicy::default()
            },
            fetch: FetchOptions {
                connect_timeout: Duration::from_secs(self.connect_timeout),
                ..FetchOptions::default()
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the board once and merge it into the store
    Update {
        #[command(flatten)]
        cycle: CycleArgs,
    },
    /// Print tracked companies, longest streak first
    Show {
        #[command(flatten)]
        store: StoreArgs,
        /// Print the full HTML page instead of a table
        #[arg(long)]
        html: bool,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Serve the display page and the cron trigger
    Serve {
        #[command(flatten)]
        cycle: CycleArgs,
        /// Value `/cron?req=` must match for an update to run
        #[arg(long, env = "TRIGGER_SECRET", hide_env_values = true)]
        secret: Option<String>,
        #[arg(short, long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Show store statistics
    Stats {
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Update { cycle } => {
            use indicatif::{ProgressBar, ProgressStyle};

            let config = cycle.into_config();
            let client = fetch::build_client(&config.fetch)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            spinner.set_message(format!("Updating from {}", config.url));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let report = pipeline::run_cycle(&client, &config).await;
            spinner.finish_and_clear();

            report?.print();
            Ok(())
        }
        Commands::Show { store: args, html, limit } => {
            let records = store::load(&args.path)?.unwrap_or_default();
            if html {
                print!("{}", render::html_page(&records));
                return Ok(());
            }
            if records.is_empty() {
                println!("No companies tracked yet. Run 'update' first.");
                return Ok(());
            }
            println!("{}", render::text_table(&records, limit));
            Ok(())
        }
        Commands::Serve { cycle, secret, port } => {
            let config = cycle.into_config();
            let client = fetch::build_client(&config.fetch)?;
            server::serve(server::AppState::new(config, secret, client), port).await
        }
        Commands::Stats { store: args } => {
            let records = store::load(&args.path)?.unwrap_or_default();
            let s = store::get_stats(&records);
            let fmt_date = |d: Option<chrono::NaiveDateTime>| {
                d.map(|d| d.format(streaks::record::DATE_FORMAT).to_string())
                    .unwrap_or_else(|| "-".into())
            };
            println!("Companies: {}", s.total);
            match &s.longest {
                Some((company, count)) => {
                    println!("Longest:   {} ({} days)", render::decode_entities(company), count)
                }
                None => println!("Longest:   -"),
            }
            println!("Newest:    {}", fmt_date(s.newest));
            println!("Oldest:    {}", fmt_date(s.oldest));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
