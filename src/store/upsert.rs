use crate::error::ScrapeError;
use crate::store::table::{load_table, save_table};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;

/// Merges incoming rows over existing ones. On a key collision the incoming
/// row replaces the existing one entirely (no field-wise union); key order is
/// first-seen, so re-running the same batch leaves the table unchanged.
pub fn merge_rows<T, K, F>(existing: Vec<T>, incoming: Vec<T>, key_fn: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut order: Vec<K> = Vec::new();
    let mut by_key: HashMap<K, T> = HashMap::new();

    for row in existing.into_iter().chain(incoming) {
        let key = key_fn(&row);
        if !by_key.contains_key(&key) {
            order.push(key_fn(&row));
        }
        by_key.insert(key, row);
    }

    order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect()
}

/// Insert-or-update against the table at `path`: newest row wins per key.
pub fn upsert<T, K, F>(path: impl AsRef<Path>, incoming: Vec<T>, key_fn: F) -> Result<(), ScrapeError>
where
    T: Serialize + DeserializeOwned,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let path = path.as_ref();
    let existing: Vec<T> = load_table(path)?;
    let before = existing.len();

    let merged = merge_rows(existing, incoming, key_fn);
    tracing::info!(
        "upsert into {:?}: {} existing rows -> {} merged rows",
        path,
        before,
        merged.len()
    );

    save_table(path, &merged)
}
