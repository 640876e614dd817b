//! Annotation scanner.
//!
//! Presence-only matching: a watched key matches when it exists in the
//! object's annotation set, whatever its value.

use std::collections::BTreeMap;

use crate::types::WatchList;

/// Return the watch-list keys present in `annotations`, in watch-list order.
pub fn scan<'w>(annotations: &BTreeMap<String, String>, watch_list: &'w WatchList) -> Vec<&'w str> {
    if annotations.is_empty() {
        return Vec::new();
    }
    watch_list
        .iter()
        .filter(|key| annotations.contains_key(*key))
        .collect()
}
