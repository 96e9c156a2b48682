//! Utility functions

use std::collections::HashSet;

/// Remove duplicate strings, keeping the first occurrence of each.
pub fn dedupe<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for item in items {
        let item = item.into();
        if seen.insert(item.clone()) {
            result.push(item);
        }
    }
    result
}
