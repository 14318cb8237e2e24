use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::input;
use crate::models::{Result, ResultRecord};
use crate::output::{self, ResultWriter};
use crate::stats::RunStats;
use crate::web_crawler::{normalize_input_url, ScrapeOutcome, WebScraper};

const NOT_EXIST_REASON: &str = "Website does not exist (404/DNS)";
const GENERIC_FAILURE_REASON: &str = "Failed to scrape";

/// Drive the full URL list: one task per URL, admitted by a fixed-width
/// semaphore, each writing exactly one record. URLs already in the output
/// store are skipped before spawning, which is what makes reruns idempotent.
pub async fn run_batch(config: &Config) -> Result<()> {
    let started = Instant::now();

    let domains = input::read_domains(&config.input.csv_path).await?;
    let attempted = domains.len();
    info!("Loaded {} domains from {}", attempted, config.input.csv_path);

    let ledger = output::load_processed_urls(&config.output.ndjson_path).await?;
    if !ledger.is_empty() {
        info!(
            "Resuming: {} urls already recorded in {}",
            ledger.len(),
            config.output.ndjson_path
        );
    }

    let pending: Vec<String> = domains
        .iter()
        .map(|domain| normalize_input_url(domain))
        .filter(|url| !ledger.contains(url))
        .collect();
    let to_process = pending.len();
    info!(
        "Scraping {} urls with concurrency {}",
        to_process, config.scraping.concurrency
    );

    let writer = Arc::new(ResultWriter::open(&config.output.ndjson_path).await?);
    let scraper = Arc::new(WebScraper::new(config.scraping.clone()));
    let stats = Arc::new(RunStats::default());
    let semaphore = Arc::new(Semaphore::new(config.scraping.concurrency.max(1)));
    let processed = Arc::new(AtomicUsize::new(0));
    let progress_interval = config.logging.progress_interval.max(1);

    let mut handles = Vec::with_capacity(to_process);
    for url in pending {
        let semaphore = Arc::clone(&semaphore);
        let scraper = Arc::clone(&scraper);
        let writer = Arc::clone(&writer);
        let stats = Arc::clone(&stats);
        let processed = Arc::clone(&processed);

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.unwrap();

            let record = match scraper.process_url(&url).await {
                ScrapeOutcome::Success(data) => {
                    stats.record_success(&data);
                    ResultRecord::success(url, data)
                }
                ScrapeOutcome::NotExist => {
                    stats.record_not_exist();
                    ResultRecord::failure(url, NOT_EXIST_REASON)
                }
                ScrapeOutcome::Failed => {
                    stats.record_failure();
                    ResultRecord::failure(url, GENERIC_FAILURE_REASON)
                }
            };

            if let Err(e) = writer.write_record(&record).await {
                error!("Failed to write record for {}: {}", record.url(), e);
            }

            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % progress_interval == 0 {
                info!("Processed {}/{}", done, to_process);
            }
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            warn!("Scrape task aborted: {}", e);
        }
    }

    stats.print_report(attempted, started.elapsed(), &config.output.ndjson_path);
    Ok(())
}
