// src/web_crawler/types.rs
use std::time::Duration;

/// Contact signals pulled out of one page. Each list is free of
/// normalized duplicates and keeps first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    pub phones: Vec<String>,
    pub social_media: Vec<String>,
    pub addresses: Vec<String>,
}

impl ExtractionResult {
    /// True when any of the three signal lists is non-empty. Gates the
    /// rendering fallback and contact-page early return.
    pub fn has_data(&self) -> bool {
        !self.phones.is_empty() || !self.social_media.is_empty() || !self.addresses.is_empty()
    }

    /// Union another result into this one. The other side only augments:
    /// existing entries keep their position, new ones are appended.
    pub fn merge(mut self, other: Option<ExtractionResult>) -> ExtractionResult {
        let Some(other) = other else {
            return self;
        };
        merge_unique(&mut self.phones, other.phones);
        merge_unique(&mut self.social_media, other.social_media);
        merge_unique(&mut self.addresses, other.addresses);
        self
    }

    /// Number of signal categories (0-3) that found at least one value.
    pub fn categories_found(&self) -> usize {
        [
            !self.phones.is_empty(),
            !self.social_media.is_empty(),
            !self.addresses.is_empty(),
        ]
        .iter()
        .filter(|found| **found)
        .count()
    }

    /// Fill rate over the three categories, formatted as "NN.N%".
    pub fn percentage(&self) -> String {
        format!("{:.1}%", self.categories_found() as f64 / 3.0 * 100.0)
    }
}

fn merge_unique(target: &mut Vec<String>, additions: Vec<String>) {
    for value in additions {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

/// Immutable per-request configuration handed to every retrieval call.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub skip_certificate_validation: bool,
}

impl FetchOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            skip_certificate_validation: false,
        }
    }

    pub fn without_certificate_validation(self) -> Self {
        Self {
            skip_certificate_validation: true,
            ..self
        }
    }
}

/// Closed classification of retrieval failures. Callers match on the
/// variant; nothing inspects error shapes beyond this enum.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP 404, DNS failure or connection refused. Terminal for the URL:
    /// no render fallback, no scheme downgrade.
    #[error("website does not exist: {0}")]
    NotExist(String),

    /// Certificate/handshake-class failure. Triggers exactly one retry with
    /// certificate validation disabled, never anything else.
    #[error("tls failure: {0}")]
    Ssl(String),

    /// Anything else. Triggers the scheme downgrade at the top level and is
    /// swallowed to a null result everywhere else.
    #[error("request failed: {0}")]
    Transient(String),
}

/// Outcome of one full per-URL pipeline, ready for the runner to record.
#[derive(Debug)]
pub enum ScrapeOutcome {
    Success(ExtractionResult),
    NotExist,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(
        phones: &[&str],
        social: &[&str],
        addresses: &[&str],
    ) -> ExtractionResult {
        ExtractionResult {
            phones: phones.iter().map(|s| s.to_string()).collect(),
            social_media: social.iter().map(|s| s.to_string()).collect(),
            addresses: addresses.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn merge_deduplicates_and_keeps_homepage_order() {
        let homepage = result_with(&["+15551234567"], &["https://facebook.com/acme"], &[]);
        let contact = result_with(
            &["+15551234567", "+15559876543"],
            &["https://facebook.com/acme"],
            &["123 Main Street, Springfield, IL 62704"],
        );

        let merged = homepage.merge(Some(contact));

        assert_eq!(merged.phones, vec!["+15551234567", "+15559876543"]);
        assert_eq!(merged.social_media, vec!["https://facebook.com/acme"]);
        assert_eq!(
            merged.addresses,
            vec!["123 Main Street, Springfield, IL 62704"]
        );
    }

    #[test]
    fn merge_with_empty_homepage_takes_contact_data() {
        let merged = ExtractionResult::default().merge(Some(result_with(
            &[],
            &[],
            &["456 Oak Avenue, Portland, OR 97201"],
        )));

        assert!(merged.has_data());
        assert_eq!(merged.addresses, vec!["456 Oak Avenue, Portland, OR 97201"]);
    }

    #[test]
    fn merge_with_no_contact_result_is_identity() {
        let homepage = result_with(&["+15551234567"], &[], &[]);
        let merged = homepage.clone().merge(None);
        assert_eq!(merged, homepage);
    }

    #[test]
    fn percentage_formats_one_decimal() {
        assert_eq!(ExtractionResult::default().percentage(), "0.0%");
        assert_eq!(result_with(&["+15551234567"], &[], &[]).percentage(), "33.3%");
        assert_eq!(
            result_with(&["+15551234567"], &["https://facebook.com/acme"], &[]).percentage(),
            "66.7%"
        );
        assert_eq!(
            result_with(&["p"], &["s"], &["a"]).percentage(),
            "100.0%"
        );
    }
}
