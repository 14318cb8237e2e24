pub mod contact_pages;
pub mod crawler;
pub mod extractor;
pub mod fetcher;
pub mod renderer;
pub mod types;

// Re-export the main types for easy importing
pub use crawler::{normalize_input_url, WebScraper};
pub use types::{ExtractionResult, FetchError, FetchOptions, ScrapeOutcome};
