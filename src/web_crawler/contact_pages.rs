// src/web_crawler/contact_pages.rs
use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

/// Conventional contact paths probed when a homepage links to none.
const CONTACT_PATHS: [&str; 5] = [
    "/contact",
    "/contact-us",
    "/about/contact",
    "/contacts",
    "/contactus",
];

/// Collect candidate contact-page URLs from homepage HTML: every anchor whose
/// href mentions "contact" (mail links excluded), resolved against the
/// homepage and deduped in document order. Falls back to the conventional
/// paths when the page links to no contact page at all.
pub fn find_contact_urls(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href") {
            let lower = href.to_ascii_lowercase();
            if lower.contains("contact") && !lower.starts_with("mailto:") {
                if let Some(resolved) = resolve_url(base_url, href) {
                    if seen.insert(resolved.clone()) {
                        urls.push(resolved);
                    }
                }
            }
        }
    }

    if urls.is_empty() {
        urls = CONTACT_PATHS
            .iter()
            .filter_map(|path| resolve_url(base_url, path))
            .collect();
    }

    urls
}

/// Resolve a possibly-relative href against a base URL. Script and mail
/// pseudo-links and anything unresolvable yield None.
pub fn resolve_url(base: &str, relative: &str) -> Option<String> {
    if relative.is_empty() {
        return None;
    }
    let lower = relative.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("mailto:") {
        return None;
    }
    let base = Url::parse(base).ok()?;
    base.join(relative).ok().map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_and_resolves_contact_anchors_in_order() {
        let html = r#"
            <a href="/contact-us">Contact us</a>
            <a href="https://example.com/about">About</a>
            <a href="/Contact-Sales">Sales</a>
        "#;
        let urls = find_contact_urls(html, "https://example.com");
        assert_eq!(
            urls,
            vec![
                "https://example.com/contact-us",
                "https://example.com/Contact-Sales"
            ]
        );
    }

    #[test]
    fn excludes_mail_and_script_links() {
        let html = r#"
            <a href="mailto:contact@example.com">Email</a>
            <a href="javascript:showContactForm()">Form</a>
        "#;
        let urls = find_contact_urls(html, "https://example.com");
        // Both anchors are discarded, so the conventional paths kick in.
        assert_eq!(
            urls,
            vec![
                "https://example.com/contact",
                "https://example.com/contact-us",
                "https://example.com/about/contact",
                "https://example.com/contacts",
                "https://example.com/contactus",
            ]
        );
    }

    #[test]
    fn deduplicates_repeated_anchors() {
        let html = r#"
            <a href="/contact">Contact</a>
            <a href="/contact">Contact (footer)</a>
        "#;
        let urls = find_contact_urls(html, "https://example.com");
        assert_eq!(urls, vec!["https://example.com/contact"]);
    }

    #[test]
    fn resolve_url_handles_absolute_relative_and_bogus_targets() {
        assert_eq!(
            resolve_url("https://example.com/home", "/contact"),
            Some("https://example.com/contact".to_string())
        );
        assert_eq!(
            resolve_url("https://example.com", "https://other.example.org/contact"),
            Some("https://other.example.org/contact".to_string())
        );
        assert_eq!(resolve_url("https://example.com", "mailto:hi@example.com"), None);
        assert_eq!(resolve_url("https://example.com", "JAVASCRIPT:void(0)"), None);
        assert_eq!(resolve_url("not a url", "/contact"), None);
        assert_eq!(resolve_url("https://example.com", ""), None);
    }
}
