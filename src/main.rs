mod archiver;
mod builder;
mod config;
mod error;
mod fetcher;
mod models;
mod normalize;
mod page;
mod parser;
mod pipeline;
mod schema;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use url::Url;

use crate::builder::RecordBuilder;
use crate::config::Config;
use crate::page::HttpLauncher;
use crate::schema::Schema;

#[derive(Parser)]
#[command(name = "amazon_wishlist_archiver", about = "Archive an Amazon wishlist as dated rows")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Wishlist URL to visit
    #[arg(short, long, global = true)]
    wishlist: Option<String>,
    /// Directory receiving the dated output file
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,
    /// Seconds to wait for the wishlist items to appear
    #[arg(long, global = true)]
    wait_secs: Option<u64>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect wishlist links and append one row per product (default)
    Run,
    /// Print the wishlist's product links
    Links,
    /// Extract a single product page and print it
    Item {
        url: Url,
        /// Print as JSON instead of a delimited row
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let schema = Schema::amazon_br();
    let launcher = HttpLauncher::new(config.user_agent.clone(), config.request_timeout())
        .with_continuation(schema.links.more);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let today = chrono::Utc::now().date_naive();
            let summary = pipeline::run(&config, &launcher, &schema, today)?;
            println!(
                "Done: {} links, {} rows written, {} skipped -> {}",
                summary.links,
                summary.written,
                summary.skipped,
                summary.output.display()
            );
        }
        Commands::Links => {
            for link in pipeline::list_links(&config, &launcher, &schema)? {
                println!("{}", link);
            }
        }
        Commands::Item { url, json } => {
            let base = config.base()?;
            let builder = RecordBuilder::new(&schema, &base, config.link_wait());
            let record = pipeline::scrape_one(&launcher, &builder, url.as_str())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print!("{}", record.to_row());
            }
        }
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(wishlist) = &cli.wishlist {
        config.wishlist_url = wishlist.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(secs) = cli.wait_secs {
        config.link_wait_secs = secs;
    }
    Ok(config)
}
