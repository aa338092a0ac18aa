//! Result URL accumulation.
//!
//! Each engine re-extracts every visible anchor on every pagination cycle, so
//! the collector's job is cheap set-union plus a count of what was actually
//! new. That count doubles as the progress signal for stagnation tracking on
//! engines that paginate by result count.

use std::collections::HashSet;

use url::Url;

/// Deduplicating accumulator for harvested result links.
#[derive(Debug, Default)]
pub struct LinkCollector {
    links: HashSet<String>,
}

impl LinkCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch of candidate URLs into the set, skipping anything that is
    /// not absolute http(s). Returns how many links were newly added.
    pub fn merge<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.links.len();
        for candidate in candidates {
            if is_http_url(&candidate) {
                self.links.insert(candidate);
            }
        }
        self.links.len() - before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Consume the collector, yielding the deduplicated set.
    #[must_use]
    pub fn into_set(self) -> HashSet<String> {
        self.links
    }
}

/// True when `candidate` parses as an absolute URL with an http or https
/// scheme. Relative fragments and javascript: pseudo-links are rejected.
fn is_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_reports_newly_added_count() {
        let mut collector = LinkCollector::new();
        let added = collector.merge(vec![
            "https://a.com/1".to_string(),
            "https://a.com/2".to_string(),
        ]);
        assert_eq!(added, 2);

        // One repeat, one genuinely new.
        let added = collector.merge(vec![
            "https://a.com/2".to_string(),
            "https://a.com/3".to_string(),
        ]);
        assert_eq!(added, 1);
        assert_eq!(collector.len(), 3);
    }

    #[test]
    fn test_non_http_candidates_are_dropped() {
        let mut collector = LinkCollector::new();
        let added = collector.merge(vec![
            "javascript:void(0)".to_string(),
            "ftp://files.example.com/x".to_string(),
            "/relative/path".to_string(),
            "not a url".to_string(),
            "https://kept.example.com".to_string(),
        ]);
        assert_eq!(added, 1);
        assert!(collector.into_set().contains("https://kept.example.com"));
    }

    #[test]
    fn test_http_and_https_both_pass() {
        assert!(is_http_url("http://plain.example.com"));
        assert!(is_http_url("https://secure.example.com/path?q=1"));
        assert!(!is_http_url("file:///etc/passwd"));
    }

    #[test]
    fn test_merging_the_same_batch_twice_is_idempotent() {
        let batch = vec![
            "https://a.com/1".to_string(),
            "https://a.com/2".to_string(),
        ];
        let mut collector = LinkCollector::new();
        collector.merge(batch.clone());
        let snapshot = collector.len();
        let added = collector.merge(batch);
        assert_eq!(added, 0);
        assert_eq!(collector.len(), snapshot);
    }

    #[test]
    fn test_empty_collector_reports_empty() {
        let collector = LinkCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.len(), 0);
    }
}
