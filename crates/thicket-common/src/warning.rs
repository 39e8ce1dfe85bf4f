//! Deduplicated warnings.
//!
//! Markup builders and adapters report recoverable problems (parse errors,
//! skipped node kinds) through here. Each distinct message is emitted once
//! as a `tracing` warning until [`clear_warnings`] is called.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a recoverable problem (emitted once per unique message).
///
/// Returns `true` when the warning was emitted, `false` when it had already
/// been reported.
///
/// # Example
/// ```
/// use thicket_common::warning::warn_once;
///
/// assert!(warn_once("html", "unexpected-null-character"));
/// assert!(!warn_once("html", "unexpected-null-character"));
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let fresh = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if fresh {
        tracing::warn!(component, "{message}");
    }
    fresh
}

/// Clear all recorded warnings. Markup builders call this before reporting
/// the problems of a new document.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
