// src/web_crawler/fetcher.rs
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::web_crawler::types::{FetchError, FetchOptions};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; ContactScraper/1.0)";

/// Plain-HTTP retrieval with the layered fallback the pipeline relies on.
/// Holds one strict client and one with certificate validation disabled;
/// both are built once and shared across every in-flight pipeline.
pub struct PageFetcher {
    client: Client,
    insecure_client: Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        // Counterpart of the strict client for sites with expired or
        // self-signed certificates; only ever used on the SSL retry.
        let insecure_client = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()
            .expect("Failed to create insecure HTTP client");

        Self {
            client,
            insecure_client,
        }
    }

    /// Fetch a page as text. A certificate-class failure is retried exactly
    /// once with validation disabled; every other failure is classified and
    /// returned for the caller to match on.
    pub async fn fetch(&self, url: &str, options: FetchOptions) -> Result<String, FetchError> {
        match self.fetch_once(url, options).await {
            Err(FetchError::Ssl(reason)) if !options.skip_certificate_validation => {
                debug!("Certificate failure on {}, retrying without validation: {}", url, reason);
                self.fetch_once(url, options.without_certificate_validation())
                    .await
            }
            other => other,
        }
    }

    async fn fetch_once(&self, url: &str, options: FetchOptions) -> Result<String, FetchError> {
        let client = if options.skip_certificate_validation {
            &self.insecure_client
        } else {
            &self.client
        };

        let response = client
            .get(url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(classify_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotExist(format!("HTTP 404 from {url}")));
        }

        let response = response.error_for_status().map_err(classify_error)?;
        response.text().await.map_err(classify_error)
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn classify_error(err: reqwest::Error) -> FetchError {
    if err.status() == Some(StatusCode::NOT_FOUND) {
        return FetchError::NotExist(err.to_string());
    }

    let reason = error_chain(&err);
    if is_certificate_failure(&reason) {
        return FetchError::Ssl(reason);
    }
    // Connect-level failures that are not TLS-related mean the site is not
    // reachable at all: DNS lookup failures and refused connections.
    if err.is_connect() {
        return FetchError::NotExist(reason);
    }
    FetchError::Transient(reason)
}

/// Flatten an error and its sources into one readable string; reqwest hides
/// the interesting part (dns, tls, refused) several levels down the chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut reason = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    reason
}

pub(crate) fn is_certificate_failure(reason: &str) -> bool {
    let reason = reason.to_ascii_lowercase();
    reason.contains("certificate") || reason.contains("ssl") || reason.contains("handshake")
}

#[cfg(test)]
mod tests {
    use super::is_certificate_failure;

    #[test]
    fn certificate_class_messages_are_detected() {
        assert!(is_certificate_failure(
            "error sending request: client error (Connect): invalid peer certificate"
        ));
        assert!(is_certificate_failure("SSL routines: unsafe legacy renegotiation"));
        assert!(is_certificate_failure("the handshake failed"));
    }

    #[test]
    fn unrelated_messages_are_not_certificate_failures() {
        assert!(!is_certificate_failure("operation timed out"));
        assert!(!is_certificate_failure("connection refused"));
        assert!(!is_certificate_failure("dns error: failed to lookup address"));
    }
}
