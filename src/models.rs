use serde::{Deserialize, Serialize};

use crate::web_crawler::ExtractionResult;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One line of the append-only NDJSON output store. Success and failure share
/// the file; the serialized shape is distinguished by its fields, not a tag.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultRecord {
    Success {
        url: String,
        phones: Vec<String>,
        #[serde(rename = "socialMedia")]
        social_media: Vec<String>,
        addresses: Vec<String>,
        counts: SignalCounts,
        percentage: String,
    },
    Failure {
        url: String,
        error: String,
        percentage: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignalCounts {
    pub phones: usize,
    #[serde(rename = "socialMedia")]
    pub social_media: usize,
    pub addresses: usize,
}

impl ResultRecord {
    pub fn success(url: String, data: ExtractionResult) -> Self {
        let percentage = data.percentage();
        let counts = SignalCounts {
            phones: data.phones.len(),
            social_media: data.social_media.len(),
            addresses: data.addresses.len(),
        };
        Self::Success {
            url,
            phones: data.phones,
            social_media: data.social_media,
            addresses: data.addresses,
            counts,
            percentage,
        }
    }

    pub fn failure(url: String, reason: &str) -> Self {
        Self::Failure {
            url,
            error: reason.to_string(),
            percentage: "0%".to_string(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => url,
        }
    }
}
