use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::web_crawler::ExtractionResult;

/// Process-wide run counters. Incremented exactly once per completed
/// pipeline; atomics keep the increments safe across worker tasks.
#[derive(Debug, Default)]
pub struct RunStats {
    success_count: AtomicUsize,
    fail_count: AtomicUsize,
    no_data_count: AtomicUsize,
    not_exist_count: AtomicUsize,
    total_phones: AtomicUsize,
    total_social: AtomicUsize,
    total_addresses: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub success_count: usize,
    pub fail_count: usize,
    pub no_data_count: usize,
    pub not_exist_count: usize,
    pub total_phones: usize,
    pub total_social: usize,
    pub total_addresses: usize,
}

impl RunStats {
    pub fn record_success(&self, data: &ExtractionResult) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
        self.total_phones.fetch_add(data.phones.len(), Ordering::Relaxed);
        self.total_social
            .fetch_add(data.social_media.len(), Ordering::Relaxed);
        self.total_addresses
            .fetch_add(data.addresses.len(), Ordering::Relaxed);
        if data.categories_found() == 0 {
            self.no_data_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self) {
        self.fail_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_exist(&self) {
        self.not_exist_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            success_count: self.success_count.load(Ordering::Relaxed),
            fail_count: self.fail_count.load(Ordering::Relaxed),
            no_data_count: self.no_data_count.load(Ordering::Relaxed),
            not_exist_count: self.not_exist_count.load(Ordering::Relaxed),
            total_phones: self.total_phones.load(Ordering::Relaxed),
            total_social: self.total_social.load(Ordering::Relaxed),
            total_addresses: self.total_addresses.load(Ordering::Relaxed),
        }
    }

    /// One-shot run summary, printed after the batch completes.
    pub fn print_report(&self, attempted: usize, elapsed: Duration, output_path: &str) {
        let stats = self.snapshot();
        let seconds = elapsed.as_secs_f64();

        println!("\n🏁 Scraping complete. Results saved to {output_path}");
        println!(
            "Time taken: {:.2} seconds ({:.2} minutes)",
            seconds,
            seconds / 60.0
        );
        println!("Websites attempted: {attempted}");
        println!("Websites successfully crawled: {}", stats.success_count);
        println!("Websites failed: {}", stats.fail_count);
        println!("Websites with no data extracted: {}", stats.no_data_count);
        println!(
            "Websites that do not exist (network errors): {}",
            stats.not_exist_count
        );
        println!("Total phone numbers extracted: {}", stats.total_phones);
        println!("Total social media links extracted: {}", stats.total_social);
        println!("Total addresses extracted: {}", stats.total_addresses);

        let percent = |count: usize| {
            if attempted == 0 {
                "0.0%".to_string()
            } else {
                format!("{:.1}%", count as f64 / attempted as f64 * 100.0)
            }
        };
        println!("\n--- Percentages ---");
        println!("Successfully crawled: {}", percent(stats.success_count));
        println!(
            "Successfully crawled with data extracted: {}",
            percent(stats.success_count - stats.no_data_count)
        );
        println!("Not existing websites: {}", percent(stats.not_exist_count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_no_signals_counts_as_no_data() {
        let stats = RunStats::default();
        stats.record_success(&ExtractionResult::default());
        stats.record_success(&ExtractionResult {
            phones: vec!["+15551234567".to_string()],
            social_media: vec![],
            addresses: vec![],
        });
        stats.record_failure();
        stats.record_not_exist();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.success_count, 2);
        assert_eq!(snapshot.no_data_count, 1);
        assert_eq!(snapshot.fail_count, 1);
        assert_eq!(snapshot.not_exist_count, 1);
        assert_eq!(snapshot.total_phones, 1);
    }
}
