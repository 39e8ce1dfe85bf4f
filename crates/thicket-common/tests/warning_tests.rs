//! Tests for warning deduplication.
//!
//! The warning set is process-global, so everything runs in one test to
//! keep `clear_warnings` from racing with the other assertions.

use thicket_common::warning::{clear_warnings, warn_once};

#[test]
fn test_warn_once_deduplicates_and_clears() {
    assert!(warn_once("test-dedup", "first message"));
    assert!(!warn_once("test-dedup", "first message"));

    // Same message from a different component is a different warning
    assert!(warn_once("test-dedup-other", "first message"));

    clear_warnings();
    assert!(warn_once("test-dedup", "first message"));
}
