// src/web_crawler/extractor.rs
use std::collections::HashSet;

use phonenumber::{country, Mode};
use regex::Regex;
use scraper::{Html, Node, Selector};
use tracing::debug;

use crate::web_crawler::types::ExtractionResult;

/// Platform domains an anchor href must contain to count as a social link.
const SOCIAL_SITES: [&str; 9] = [
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "linkedin.com",
    "tiktok.com",
    "youtube.com",
    "pinterest.com",
    "snapchat.com",
    "threads.net",
];

/// Street suffix keywords recognized in US addresses, both inside the street
/// pattern and as the whole-word filter for candidates without a ZIP.
const STREET_SUFFIXES: [&str; 30] = [
    "Street", "St", "Avenue", "Ave", "Road", "Rd", "Boulevard", "Blvd", "Lane", "Ln",
    "Drive", "Dr", "Court", "Ct", "Square", "Sq", "Loop", "Trail", "Trl", "Parkway",
    "Pkwy", "Circle", "Cir", "Highway", "Hwy", "Way", "Place", "Pl", "Terrace", "Ter",
];

/// Tags whose subtrees never contribute visible text.
const NON_VISIBLE_TAGS: [&str; 7] = [
    "script", "style", "noscript", "head", "title", "meta", "link",
];

/// Derives phone, social-media and address signals from raw page HTML.
pub struct SignalExtractor {
    link_selector: Selector,
    address_selector: Selector,
    phone_finder: Regex,
    phone_candidate: Regex,
    us_street: Regex,
    po_box: Regex,
    city_state_zip: Regex,
    zip_token: Regex,
    street_suffix: Regex,
    dash_variants: Regex,
    zero_width: Regex,
    whitespace: Regex,
}

impl SignalExtractor {
    pub fn new() -> Self {
        let suffixes = STREET_SUFFIXES.join("|");
        Self {
            link_selector: Selector::parse("a[href]").unwrap(),
            address_selector: Selector::parse("address").unwrap(),
            // Country-prefix-tolerant finder; the strict US parser decides validity.
            phone_finder: Regex::new(r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
                .unwrap(),
            // Permissive pattern that catches separators the finder misses.
            phone_candidate: Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap(),
            us_street: Regex::new(&format!(
                r"\b\d{{1,6}}\s+(?:[A-Za-z0-9.'\-]+\s)+(?:{suffixes})\b[\w\s.,'-]*,?\s*[A-Za-z .'-]+,?\s*[A-Z]{{2}}\s*\d{{5}}(?:-\d{{4}})?"
            ))
            .unwrap(),
            po_box: Regex::new(
                r"(?i)\bP\.?O\.? Box \d{1,6},?\s*[A-Za-z .'-]+,?\s*[A-Z]{2}\s*\d{5}(?:-\d{4})?",
            )
            .unwrap(),
            city_state_zip: Regex::new(r"\b[A-Za-z .'-]+,\s*[A-Z]{2}\s*\d{5}(?:-\d{4})?").unwrap(),
            zip_token: Regex::new(r"\d{5}(?:-\d{4})?").unwrap(),
            street_suffix: Regex::new(&format!(r"(?i)\b(?:{suffixes})\b")).unwrap(),
            dash_variants: Regex::new("[\u{2010}-\u{2015}]").unwrap(),
            zero_width: Regex::new("[\u{200B}-\u{200D}\u{FEFF}]").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    pub fn extract(&self, html: &str) -> ExtractionResult {
        let document = Html::parse_document(html);
        let text = self.normalize_text(&visible_text(&document));

        let result = ExtractionResult {
            phones: self.extract_phones(&text),
            social_media: self.extract_social_media(&document),
            addresses: self.extract_addresses(&text, &document),
        };
        debug!(
            "Extracted {} phones, {} social links, {} addresses",
            result.phones.len(),
            result.social_media.len(),
            result.addresses.len()
        );
        result
    }

    /// Fold dash variants to a plain hyphen, strip zero-width characters and
    /// collapse whitespace runs so the pattern matchers see uniform text.
    pub fn normalize_text(&self, text: &str) -> String {
        let text = self.dash_variants.replace_all(text, "-");
        let text = self.zero_width.replace_all(&text, "");
        self.whitespace.replace_all(&text, " ").into_owned()
    }

    /// Two passes unioned: the locale-aware finder has fewer false positives,
    /// the permissive pattern catches irregular separators the finder misses.
    /// Every candidate goes through the strict US parser; dedup is by final
    /// E.164 value, first seen wins.
    fn extract_phones(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut phones = Vec::new();

        let candidates = self
            .phone_finder
            .find_iter(text)
            .chain(self.phone_candidate.find_iter(text));
        for candidate in candidates {
            if let Some(formatted) = parse_us_phone(candidate.as_str()) {
                if seen.insert(formatted.clone()) {
                    phones.push(formatted);
                }
            }
        }
        phones
    }

    fn extract_social_media(&self, document: &Html) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for element in document.select(&self.link_selector) {
            if let Some(href) = element.value().attr("href") {
                if SOCIAL_SITES.iter().any(|site| href.contains(site))
                    && seen.insert(href.to_string())
                {
                    links.push(href.to_string());
                }
            }
        }
        links
    }

    /// Explicit <address> elements verbatim plus three pattern matches over
    /// the normalized text, filtered to plausible lengths and anchored on a
    /// ZIP token or street suffix. Overlapping partial matches resolve in
    /// favor of completeness: longest first, substrings of kept entries drop.
    fn extract_addresses(&self, text: &str, document: &Html) -> Vec<String> {
        let mut candidates: Vec<String> = document
            .select(&self.address_selector)
            .map(|element| element.text().collect::<String>())
            .collect();
        for pattern in [&self.us_street, &self.po_box, &self.city_state_zip] {
            candidates.extend(pattern.find_iter(text).map(|m| m.as_str().to_string()));
        }

        let mut candidates: Vec<String> = candidates
            .into_iter()
            .map(|addr| addr.trim().to_string())
            .filter(|addr| (10..=120).contains(&addr.chars().count()))
            .filter(|addr| self.zip_token.is_match(addr) || self.street_suffix.is_match(addr))
            .collect();
        candidates.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut kept = Vec::new();
        let mut kept_normalized: Vec<String> = Vec::new();
        for candidate in candidates {
            let normalized = normalize_for_dedup(&candidate);
            let overlaps = kept_normalized
                .iter()
                .any(|prev| prev.contains(&normalized) || normalized.contains(prev));
            if !overlaps {
                kept.push(candidate);
                kept_normalized.push(normalized);
            }
        }
        kept
    }
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_us_phone(raw: &str) -> Option<String> {
    let number = phonenumber::parse(Some(country::US), raw).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::E164).to_string())
}

fn normalize_for_dedup(addr: &str) -> String {
    addr.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Concatenate the document's text nodes in order, skipping subtrees that
/// never render.
fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Element(element) if NON_VISIBLE_TAGS.contains(&element.name()) => continue,
            Node::Text(text) => out.push_str(text),
            _ => {}
        }
        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SignalExtractor {
        SignalExtractor::new()
    }

    #[test]
    fn extracts_phone_and_facebook_link() {
        let html = r#"<html><body>
            <p>Call us at (555) 123-4567</p>
            <a href="https://www.facebook.com/acme">Facebook</a>
            <a href="/about">About</a>
        </body></html>"#;

        let result = extractor().extract(html);

        assert_eq!(result.phones, vec!["+15551234567"]);
        assert_eq!(result.social_media, vec!["https://www.facebook.com/acme"]);
        assert_eq!(result.percentage(), "66.7%");
    }

    #[test]
    fn deduplicates_phone_formats_to_one_e164_value() {
        let html = "<p>(555) 123-4567 or 555.123.4567 or +1 555 123 4567</p>";
        let result = extractor().extract(html);
        assert_eq!(result.phones, vec!["+15551234567"]);
    }

    #[test]
    fn rejects_invalid_phone_candidates() {
        // Area code starting with 0 fails the strict US parser.
        let html = "<p>012-345-6789</p>";
        let result = extractor().extract(html);
        assert!(result.phones.is_empty());
    }

    #[test]
    fn ignores_text_in_non_visible_elements() {
        let html = r#"<html><head><title>(555) 123-4567</title></head><body>
            <script>var phone = "(555) 987-6543";</script>
            <style>.phone::before { content: "(555) 111-2222"; }</style>
            <p>No contact info here</p>
        </body></html>"#;

        let result = extractor().extract(html);
        assert!(result.phones.is_empty());
    }

    #[test]
    fn normalizes_dashes_and_zero_width_characters() {
        let ex = extractor();
        assert_eq!(
            ex.normalize_text("555\u{2013}123\u{2014}4567\u{200B} \n\t now"),
            "555-123-4567 now"
        );
    }

    #[test]
    fn social_links_are_deduplicated_exactly() {
        let html = r#"
            <a href="https://twitter.com/acme">x</a>
            <a href="https://twitter.com/acme">x again</a>
            <a href="https://linkedin.com/company/acme">li</a>
        "#;
        let result = extractor().extract(html);
        assert_eq!(
            result.social_media,
            vec!["https://twitter.com/acme", "https://linkedin.com/company/acme"]
        );
    }

    #[test]
    fn street_address_beats_its_city_state_zip_suffix() {
        let html = "<p>Visit us: 123 Main Street, Springfield, IL 62704</p>";
        let result = extractor().extract(html);
        assert_eq!(
            result.addresses,
            vec!["123 Main Street, Springfield, IL 62704"]
        );
    }

    #[test]
    fn address_filter_rejects_short_long_and_unanchored_candidates() {
        let ex = extractor();

        // Too short, even though it carries a street suffix.
        assert!(ex.extract("<address>Short St</address>").addresses.is_empty());

        // Neither a ZIP-like token nor a street suffix word.
        assert!(ex
            .extract("<address>somewhere in the middle of nowhere</address>")
            .addresses
            .is_empty());

        // Over 120 characters.
        let long = format!("<address>123 Main Street, {}</address>", "x".repeat(120));
        assert!(ex.extract(&long).addresses.is_empty());

        // A tagged address inside the bounds with a suffix word survives.
        let ok = ex.extract("<address>742 Evergreen Terrace, Springfield</address>");
        assert_eq!(ok.addresses, vec!["742 Evergreen Terrace, Springfield"]);
    }

    #[test]
    fn po_box_addresses_are_matched() {
        let html = "<p>Mail: P.O. Box 512, Springfield, IL 62704</p>";
        let result = extractor().extract(html);
        assert_eq!(result.addresses, vec!["P.O. Box 512, Springfield, IL 62704"]);
    }

    #[test]
    fn street_suffix_filter_is_whole_word_and_case_insensitive() {
        let ex = extractor();
        // "Stanley" contains "St" but not as a whole word.
        assert!(ex
            .extract("<address>Stanley building, somewhere</address>")
            .addresses
            .is_empty());
        assert_eq!(
            ex.extract("<address>10 downing STREET, london area</address>")
                .addresses,
            vec!["10 downing STREET, london area"]
        );
    }
}
