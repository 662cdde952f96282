mod corpus;
mod export;
mod listing;
mod normalize;
mod parser;
mod scraper;
mod tables;
mod terms;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "speech_scraper",
    about = "Presidential speech scraper and relational CSV exporter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch detail pages from the cached listing and write speeches JSON
    Scrape {
        /// Cached listing HTML
        #[arg(long, default_value = "data/speeches-listing.html")]
        listing: PathBuf,
        /// Output path for the speech collection
        #[arg(long, default_value = "data/presidential-speeches.json")]
        out: PathBuf,
        /// Base URL for relative detail links
        #[arg(long, default_value = "https://millercenter.org")]
        base_url: String,
        /// Max pages to fetch (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Build the five tables and export them as CSV
    Export {
        /// Scraped speech collection
        #[arg(long, default_value = "data/presidential-speeches.json")]
        speeches: PathBuf,
        /// Term start dates per speaker group, chronological
        #[arg(long, default_value = "data/terms.json")]
        terms: PathBuf,
        /// Directory for the five CSV files
        #[arg(long, default_value = "import_data")]
        out_dir: PathBuf,
    },
    /// Scrape + export in one pipeline
    Run {
        #[arg(long, default_value = "data/speeches-listing.html")]
        listing: PathBuf,
        #[arg(long, default_value = "data/presidential-speeches.json")]
        out: PathBuf,
        #[arg(long, default_value = "https://millercenter.org")]
        base_url: String,
        #[arg(long, default_value = "data/terms.json")]
        terms: PathBuf,
        #[arg(long, default_value = "import_data")]
        out_dir: PathBuf,
        /// Max pages to fetch (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Ingest the secondary corpus into document/speaker_documents CSVs
    Corpus {
        /// Corpus root holding trump/ and clinton/ subtrees
        #[arg(long, default_value = "data/corpus")]
        dir: PathBuf,
        /// Directory for the two CSV files (kept separate from the
        /// primary export so document.csv files don't collide)
        #[arg(long, default_value = "corpus_data")]
        out_dir: PathBuf,
        /// speaker_id for documents under trump/
        #[arg(long)]
        trump_speaker_id: u32,
        /// speaker_id for documents under clinton/
        #[arg(long)]
        clinton_speaker_id: u32,
        /// First document_id to assign
        #[arg(long)]
        start_document_id: u32,
    },
    /// Show counts over the scraped speeches JSON
    Stats {
        #[arg(long, default_value = "data/presidential-speeches.json")]
        speeches: PathBuf,
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
        Commands::Scrape { listing, out, base_url, limit } => {
            let stats = scraper::scrape_listing(&listing, &out, &base_url, limit).await?;
            println!(
                "Done: {} pages fetched ({} speeches, {} missed).",
                stats.total, stats.ok, stats.missed
            );
            Ok(())
        }
        Commands::Export { speeches, terms, out_dir } => {
            let counts = export::run(&speeches, &terms, &out_dir)?;
            counts.print();
            Ok(())
        }
        Commands::Run { listing, out, base_url, terms, out_dir, limit } => {
            // Phase 1: scrape
            let t_scrape = Instant::now();
            let stats = scraper::scrape_listing(&listing, &out, &base_url, limit).await?;
            println!(
                "Scraped {} pages ({} speeches, {} missed) in {:.1}s",
                stats.total,
                stats.ok,
                stats.missed,
                t_scrape.elapsed().as_secs_f64()
            );
            if stats.ok == 0 {
                println!("Nothing to export.");
                return Ok(());
            }

            // Phase 2: export
            let counts = export::run(&out, &terms, &out_dir)?;
            counts.print();
            Ok(())
        }
        Commands::Corpus {
            dir,
            out_dir,
            trump_speaker_id,
            clinton_speaker_id,
            start_document_id,
        } => {
            let cfg = corpus::CorpusConfig {
                trump_speaker_id,
                clinton_speaker_id,
                start_document_id,
            };
            let tables = corpus::ingest(&dir, &cfg)?;
            tables.write_csv(&out_dir)?;
            println!(
                "Saved {} documents ({} files skipped).",
                tables.documents.len(),
                tables.errors
            );
            Ok(())
        }
        Commands::Stats { speeches } => {
            let speeches = export::load_speeches(&speeches)?;
            let speakers: std::collections::HashSet<&str> =
                speeches.iter().map(|s| s.name.as_str()).collect();
            println!("Speeches: {}", speeches.len());
            println!("Speakers: {}", speakers.len());
            if let (Some(first), Some(last)) = (
                speeches.iter().map(|s| s.date).min(),
                speeches.iter().map(|s| s.date).max(),
            ) {
                println!("Range:    {} to {}", first, last);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
