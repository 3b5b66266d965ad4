use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wuhistory_fetch::HttpTableFetcher;
use wuhistory_parser::normalize;

mod input;
mod scrape;

/// Scrape historical daily weather observations into a CSV file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Destination for the scraped observation table.
    #[arg(short, long, default_value = "scraped_weatherdata.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();

    let template = input::prompt_url(&mut reader, &mut stdout)?;
    let start_date = input::prompt_date("start", &mut reader, &mut stdout)?;
    let end_date = input::prompt_date("end", &mut reader, &mut stdout)?;
    if start_date > end_date {
        bail!("start date {start_date} must not be after end date {end_date}");
    }

    let fetcher = HttpTableFetcher::new().context("failed to initialize the page fetcher")?;

    match scrape::scrape_range(&fetcher, &template, start_date, end_date) {
        Some(raw) => {
            let mut observations = normalize(&raw, start_date, end_date)
                .context("failed to normalize scraped rows")?;
            scrape::write_observations(&mut observations, &cli.output)?;
            info!(
                rows = observations.height(),
                path = %cli.output.display(),
                "observation table written"
            );
            println!("Data saved to {}", cli.output.display());
        }
        None => {
            println!("No data scraped.");
        }
    }

    Ok(())
}
