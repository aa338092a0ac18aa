//! Stagnation tracking against realistic pagination traces.

use dorkharvest::LinkCollector;
use dorkharvest::engine::pagination::StagnationTracker;

/// Replays a trace of (signal, clicked) cycles and returns how many cycles
/// ran before the tracker called a stop, or None if the trace ran out first.
fn cycles_until_stop(trace: &[(u64, bool)], limit: u32) -> Option<usize> {
    let mut tracker = StagnationTracker::new(limit);
    for (cycle, &(signal, clicked)) in trace.iter().enumerate() {
        if tracker.observe(signal, clicked) {
            return Some(cycle + 1);
        }
    }
    None
}

#[test]
fn test_steadily_growing_results_never_stop() {
    let trace: Vec<(u64, bool)> = (1..=20).map(|n| (n * 10, false)).collect();
    assert_eq!(cycles_until_stop(&trace, 3), None);
}

#[test]
fn test_exhausted_results_stop_after_three_flat_cycles() {
    let trace = [
        (10, false),
        (20, false),
        (28, false),
        (28, false),
        (28, false),
        (28, false),
    ];
    assert_eq!(cycles_until_stop(&trace, 3), Some(6));
}

#[test]
fn test_slow_loading_page_survives_on_clicks() {
    // Height never moves but the more-results button keeps landing, so the
    // engine keeps waiting for content instead of giving up.
    let trace = [
        (500, true),
        (500, true),
        (500, true),
        (500, true),
        (900, false),
    ];
    assert_eq!(cycles_until_stop(&trace, 3), None);
}

#[test]
fn test_click_outage_in_the_middle_resets_cleanly() {
    let trace = [
        (10, false),
        (10, false), // stalled 1
        (10, true),  // click rescues the streak
        (10, false), // stalled 1 again
        (10, false), // stalled 2
        (10, false), // stalled 3, stop
    ];
    assert_eq!(cycles_until_stop(&trace, 3), Some(6));
}

#[test]
fn test_collector_counts_drive_a_link_signal_trace() {
    // Simulates the google loop: each cycle re-extracts every visible link,
    // merges into the collector, and feeds the running total to the tracker.
    let pages: Vec<Vec<String>> = vec![
        vec!["https://a.com/1".into(), "https://a.com/2".into()],
        // Second cycle re-sees page one plus new results.
        vec![
            "https://a.com/1".into(),
            "https://a.com/2".into(),
            "https://b.com/1".into(),
        ],
        // From here the page stops changing.
        vec!["https://a.com/1".into(), "https://b.com/1".into()],
        vec!["https://a.com/1".into()],
        vec!["https://a.com/1".into()],
    ];

    let mut collector = LinkCollector::new();
    let mut tracker = StagnationTracker::new(3);
    let mut stopped_at = None;
    for (cycle, page) in pages.iter().enumerate() {
        collector.merge(page.iter().cloned());
        if tracker.observe(collector.len() as u64, false) {
            stopped_at = Some(cycle + 1);
            break;
        }
    }

    assert_eq!(stopped_at, Some(5));
    assert_eq!(collector.len(), 3);
    let links = collector.into_set();
    assert!(links.contains("https://a.com/1"));
    assert!(links.contains("https://b.com/1"));
}
