// src/web_crawler/crawler.rs
use tracing::{debug, info};

use crate::config::ScrapingConfig;
use crate::web_crawler::contact_pages::find_contact_urls;
use crate::web_crawler::extractor::SignalExtractor;
use crate::web_crawler::fetcher::PageFetcher;
use crate::web_crawler::renderer;
use crate::web_crawler::types::{ExtractionResult, FetchError, FetchOptions, ScrapeOutcome};

/// Per-URL scraping pipeline: homepage retrieval with layered fallbacks,
/// extraction, contact-page discovery and the final merge. Shared across all
/// in-flight pipelines; holds no per-URL state.
pub struct WebScraper {
    fetcher: PageFetcher,
    extractor: SignalExtractor,
    config: ScrapingConfig,
}

impl WebScraper {
    pub fn new(config: ScrapingConfig) -> Self {
        Self {
            fetcher: PageFetcher::new(),
            extractor: SignalExtractor::new(),
            config,
        }
    }

    /// Run the full pipeline for one normalized URL and classify the outcome.
    /// Never fails the batch: every error ends up in one of the three
    /// outcome variants.
    pub async fn process_url(&self, url: &str) -> ScrapeOutcome {
        info!("🕷️  Scraping {}", url);
        match self.scrape_website(url).await {
            Ok(Some(data)) => {
                info!(
                    "✅ {}: {} phones, {} social, {} addresses",
                    url,
                    data.phones.len(),
                    data.social_media.len(),
                    data.addresses.len()
                );
                ScrapeOutcome::Success(data)
            }
            Ok(None) => {
                info!("❌ {}: failed to scrape", url);
                ScrapeOutcome::Failed
            }
            Err(FetchError::NotExist(reason)) => {
                info!("❌ {}: does not exist ({})", url, reason);
                ScrapeOutcome::NotExist
            }
            Err(err) => {
                info!("❌ {}: {}", url, err);
                ScrapeOutcome::Failed
            }
        }
    }

    /// Homepage fetch -> extract -> render fallback when empty -> contact
    /// discovery -> merge. NotExist aborts the URL outright; any other
    /// homepage fetch error downgrades an https URL to http, otherwise the
    /// URL resolves to a null result.
    async fn scrape_website(
        &self,
        url: &str,
    ) -> Result<Option<ExtractionResult>, FetchError> {
        let options = FetchOptions::new(self.config.fetch_timeout());

        let mut homepage_html = match self.fetcher.fetch(url, options).await {
            Ok(html) => html,
            Err(FetchError::NotExist(reason)) => return Err(FetchError::NotExist(reason)),
            Err(err) => {
                if url.to_ascii_lowercase().starts_with("https://") {
                    debug!("Homepage fetch failed for {} ({}), trying http", url, err);
                    return self.try_http_fallback(url).await;
                }
                debug!("Homepage fetch failed for {}: {}", url, err);
                return Ok(None);
            }
        };

        let mut main_data = self.extractor.extract(&homepage_html);
        if !main_data.has_data() {
            match renderer::render_page(url, self.config.render_timeout()).await {
                Ok(rendered) => {
                    homepage_html = rendered;
                    main_data = self.extractor.extract(&homepage_html);
                }
                Err(err) => debug!("Render fallback failed for {}: {}", url, err),
            }
        }

        let contact_urls = find_contact_urls(&homepage_html, url);
        let contact_data = self.scrape_contact_pages(&contact_urls).await;

        Ok(Some(main_data.merge(contact_data)))
    }

    /// Rerun fetch + render against the insecure-scheme variant of the URL.
    /// Contact discovery is not re-entered on this path.
    async fn try_http_fallback(
        &self,
        https_url: &str,
    ) -> Result<Option<ExtractionResult>, FetchError> {
        let http_url = format!("http://{}", &https_url["https://".len()..]);

        let html = match self
            .fetcher
            .fetch(&http_url, FetchOptions::new(self.config.fetch_timeout()))
            .await
        {
            Ok(html) => html,
            Err(FetchError::NotExist(reason)) => return Err(FetchError::NotExist(reason)),
            Err(err) => {
                debug!("Http fallback failed for {}: {}", http_url, err);
                return Ok(None);
            }
        };

        let mut data = self.extractor.extract(&html);
        if !data.has_data() {
            match renderer::render_page(&http_url, self.config.render_timeout()).await {
                Ok(rendered) => data = self.extractor.extract(&rendered),
                Err(err) => debug!("Render fallback failed for {}: {}", http_url, err),
            }
        }

        Ok(Some(data))
    }

    /// Visit contact candidates in order and return the first non-empty
    /// extraction. A candidate that fetched but extracted empty gets one
    /// rendering attempt before moving on. Every candidate error is
    /// swallowed; the homepage result stands on its own.
    async fn scrape_contact_pages(&self, contact_urls: &[String]) -> Option<ExtractionResult> {
        let options = FetchOptions::new(self.config.contact_timeout());

        for candidate in contact_urls {
            let html = match self.fetcher.fetch(candidate, options).await {
                Ok(html) => html,
                Err(err) => {
                    debug!("Contact page fetch failed for {}: {}", candidate, err);
                    continue;
                }
            };

            let data = self.extractor.extract(&html);
            if data.has_data() {
                return Some(data);
            }

            match renderer::render_page(candidate, self.config.render_timeout()).await {
                Ok(rendered) => {
                    let data = self.extractor.extract(&rendered);
                    if data.has_data() {
                        return Some(data);
                    }
                }
                Err(err) => debug!("Contact page render failed for {}: {}", candidate, err),
            }
        }

        None
    }
}

/// Qualify a bare input domain with the secure scheme; already-qualified
/// URLs pass through untouched.
pub fn normalize_input_url(domain: &str) -> String {
    let trimmed = domain.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
