use std::fs;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::listing;
use crate::parser;
use crate::tables::RawSpeech;

/// Outcome of one scrape run.
pub struct ScrapeStats {
    pub total: usize,
    pub ok: usize,
    pub missed: usize,
}

/// Read the cached listing, fetch every detail page, and write the
/// parsed speeches as a JSON array in listing order.
///
/// Fetches are strictly sequential, one in-flight request at a time, to
/// keep load on the source site predictable. There are no retries; a
/// network error aborts the run. Pages that fetch but yield no usable
/// speech are counted as missed and excluded.
pub async fn scrape_listing(
    listing_path: &Path,
    out_path: &Path,
    base_url: &str,
    limit: Option<usize>,
) -> Result<ScrapeStats> {
    let html = fs::read_to_string(listing_path)
        .with_context(|| format!("failed to read listing {}", listing_path.display()))?;
    let mut links = listing::detail_links(&html, base_url);
    if let Some(n) = limit {
        links.truncate(n);
    }

    let client = reqwest::Client::new();
    let total = links.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut speeches: Vec<RawSpeech> = Vec::with_capacity(total);
    let mut missed = 0usize;

    for url in &links {
        let page = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetch failed: {}", url))?
            .text()
            .await
            .with_context(|| format!("body read failed: {}", url))?;

        match parser::parse_speech_page(&page) {
            Some(speech) => speeches.push(speech),
            None => {
                missed += 1;
                warn!("missed (no transcript): {}", url);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(dir) = out_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::File::create(out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &speeches)?;

    info!(
        "Scraped {} pages ({} speeches, {} missed) -> {}",
        total,
        speeches.len(),
        missed,
        out_path.display()
    );

    Ok(ScrapeStats { total, ok: speeches.len(), missed })
}
