//! CLI commands for flashstat.
//!
//! Supports API server mode and one-shot crawls from the terminal.

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::crawler::{run_fixtures, run_results};
use crate::dataset::DatasetKey;
use crate::storage::{DatasetRepository, DatasetStore};
use crate::types::DatasetSummary;

#[derive(Parser)]
#[command(name = "flashstat")]
#[command(version, about = "Flashstat: football results crawler and dataset API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Crawl finished matches of a league season into its dataset
    Crawl {
        /// Country slug, e.g. england
        country: String,

        /// Tournament slug, e.g. premier-league
        tournament: String,

        /// Season slug, e.g. 2023-2024
        season: String,

        /// Statistics period (0 = full match, 1 = first half, 2 = second half)
        #[arg(default_value = "0")]
        time: String,
    },

    /// Refresh the upcoming fixtures of a league season
    Fixtures {
        country: String,
        tournament: String,
        season: String,
    },

    /// List stored datasets
    Datasets,
}

fn open_store(config: &AppConfig) -> anyhow::Result<DatasetRepository> {
    DatasetRepository::new(&config.storage.database_path)
}

/// Run a results crawl and print its report.
pub async fn run_crawl(
    country: String,
    tournament: String,
    season: String,
    time: String,
) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let store = open_store(&config)?;
    let key = DatasetKey::matches(&country, &tournament, &season, &time);

    let report = run_results(&config, &store, &key).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.failed.is_empty() {
        eprintln!(
            "{} matches could not be extracted; run again to retry them",
            report.failed.len()
        );
    }
    Ok(())
}

/// Run a fixtures crawl and print its report.
pub async fn run_fixtures_crawl(
    country: String,
    tournament: String,
    season: String,
) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let store = open_store(&config)?;
    let key = DatasetKey::fixtures(&country, &tournament, &season);

    let report = run_fixtures(&config, &store, &key).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Print stored datasets as a table.
pub fn run_datasets() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let store = open_store(&config)?;
    let datasets: Vec<DatasetSummary> = store
        .find_all()?
        .into_iter()
        .map(DatasetSummary::from)
        .collect();

    if datasets.is_empty() {
        println!("No datasets stored in {}", config.storage.database_path.display());
        return Ok(());
    }

    print_table(&datasets);
    Ok(())
}

fn print_table(datasets: &[DatasetSummary]) {
    println!(
        "{:>5}  {:<12} {:<36} {:<20}",
        "ID", "Country", "Filename", "Created"
    );
    for dataset in datasets {
        println!(
            "{:>5}  {:<12} {:<36} {:<20}",
            dataset.id,
            dataset.country,
            dataset.filename,
            dataset.created_at.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("{} datasets", datasets.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_crawl_defaults_to_full_match() {
        let cli = Cli::parse_from(["flashstat", "crawl", "brazil", "serie-a", "2023"]);
        match cli.command {
            Commands::Crawl {
                country,
                tournament,
                season,
                time,
            } => {
                assert_eq!(country, "brazil");
                assert_eq!(tournament, "serie-a");
                assert_eq!(season, "2023");
                assert_eq!(time, "0");
            }
            _ => panic!("expected crawl"),
        }
    }

    #[test]
    fn test_serve_overrides_are_optional() {
        let cli = Cli::parse_from(["flashstat", "serve"]);
        assert!(matches!(
            cli.command,
            Commands::Serve {
                host: None,
                port: None
            }
        ));
    }
}
