use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub scraping: ScrapingConfig,
    pub logging: LoggingConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub csv_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub ndjson_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapingConfig {
    pub concurrency: usize,
    pub fetch_timeout_ms: u64,
    pub render_timeout_ms: u64,
    pub contact_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub progress_interval: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    pub company_csv_path: String,
    pub index_dir: String,
}

impl ScrapingConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn contact_timeout(&self) -> Duration {
        Duration::from_millis(self.contact_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig {
                csv_path: "data/sample-websites.csv".to_string(),
            },
            output: OutputConfig {
                ndjson_path: "data/scraped-results.ndjson".to_string(),
            },
            scraping: ScrapingConfig {
                concurrency: 25,
                fetch_timeout_ms: 10_000,
                render_timeout_ms: 20_000,
                contact_timeout_ms: 5_000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                progress_interval: 50,
            },
            matching: MatchingConfig {
                company_csv_path: "data/sample-websites-company-names.csv".to_string(),
                index_dir: "data/company-index".to_string(),
            },
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
