use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use contact_scraper::config::{load_config, Config};
use contact_scraper::models::Result;
use contact_scraper::{matcher, runner, server};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };

    // Setup logging
    std::env::set_var(
        "RUST_LOG",
        "contact_scraper=info,hyper=warn,chromiumoxide=warn",
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                format!("contact_scraper={}", config.logging.level)
                    .parse()
                    .unwrap(),
            ),
        )
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "scrape".to_string());
    match mode.as_str() {
        "scrape" => {
            // Ctrl+C is safe to hit mid-batch: every finished URL is already
            // on disk and the next run resumes from the output store.
            tokio::select! {
                result = runner::run_batch(&config) => {
                    result?;
                }
                _ = signal::ctrl_c() => {
                    info!(
                        "Received Ctrl+C, stopping. Rerun to resume from {}",
                        config.output.ndjson_path
                    );
                }
            }
        }
        "index" => {
            let indexed = matcher::build_index(&config.matching, &config.output.ndjson_path).await?;
            info!(
                "Indexed {} companies into {}",
                indexed, config.matching.index_dir
            );
        }
        "serve" => {
            let company_matcher = matcher::CompanyMatcher::open(&config.matching.index_dir)?;
            let _rocket = server::build_rocket(company_matcher).launch().await?;
        }
        other => {
            eprintln!("Unknown mode '{other}'. Usage: contact-scraper [scrape|index|serve]");
            std::process::exit(2);
        }
    }

    Ok(())
}
