use std::collections::HashSet;
use std::path::Path;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::{Result, ResultRecord};

/// Load the resume ledger: every `url` already present in the output store.
/// A missing file means a fresh run; malformed lines are ignored.
pub async fn load_processed_urls(path: &str) -> Result<HashSet<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(parse_ledger(&content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(err) => Err(err.into()),
    }
}

pub fn parse_ledger(content: &str) -> HashSet<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            serde_json::from_str::<serde_json::Value>(line)
                .ok()?
                .get("url")?
                .as_str()
                .map(|url| url.to_string())
        })
        .collect()
}

/// Append-only NDJSON store. Each record goes out as one newline-terminated
/// write, so concurrent pipelines can never interleave inside a line.
pub struct ResultWriter {
    file: Mutex<File>,
}

impl ResultWriter {
    pub async fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub async fn write_record(&self, record: &ResultRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web_crawler::ExtractionResult;

    #[test]
    fn ledger_ignores_malformed_lines() {
        let content = r#"{"url":"https://a.com","error":"Failed to scrape","percentage":"0%"}
not json at all
{"no_url_field":true}
{"url":"https://b.com","phones":[],"socialMedia":[],"addresses":[],"counts":{"phones":0,"socialMedia":0,"addresses":0},"percentage":"0.0%"}
"#;
        let ledger = parse_ledger(content);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("https://a.com"));
        assert!(ledger.contains("https://b.com"));
    }

    #[tokio::test]
    async fn written_records_come_back_through_the_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ndjson");
        let path = path.to_str().unwrap();

        let writer = ResultWriter::open(path).await.unwrap();
        let data = ExtractionResult {
            phones: vec!["+15551234567".to_string()],
            social_media: vec![],
            addresses: vec![],
        };
        writer
            .write_record(&ResultRecord::success("https://example.com".to_string(), data))
            .await
            .unwrap();
        writer
            .write_record(&ResultRecord::failure(
                "https://gone.example".to_string(),
                "Website does not exist (404/DNS)",
            ))
            .await
            .unwrap();

        let ledger = load_processed_urls(path).await.unwrap();
        assert!(ledger.contains("https://example.com"));
        assert!(ledger.contains("https://gone.example"));

        // The success line keeps the original key casing.
        let content = tokio::fs::read_to_string(path).await.unwrap();
        assert!(content.lines().next().unwrap().contains("\"socialMedia\""));
        assert!(content.lines().next().unwrap().contains("\"percentage\":\"33.3%\""));
    }

    #[tokio::test]
    async fn missing_output_file_means_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nothing-here.ndjson");
        let ledger = load_processed_urls(path.to_str().unwrap()).await.unwrap();
        assert!(ledger.is_empty());
    }
}
