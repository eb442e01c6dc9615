//! BLAKE3 hashing of configured item state

use blake3::Hasher;

use crate::items::{Item, StateDict};

/// Hash of a statedict; an absent statedict hashes like JSON `null`
pub fn hash_statedict(statedict: Option<&StateDict>) -> String {
    // BTreeMap keys serialize in sorted order, so the JSON is canonical
    let json = serde_json::to_vec(&statedict).unwrap_or_default();
    blake3::hash(&json).to_hex().to_string()
}

/// Hash of a single item's configured state
pub fn hash_item(item: &Item) -> String {
    hash_statedict(item.cdict().as_ref())
}

/// Hash over all items, independent of their order
pub fn hash_items(items: &[Item]) -> String {
    let mut lines: Vec<String> = items
        .iter()
        .map(|item| format!("{} {}\n", item.id(), hash_item(item)))
        .collect();
    lines.sort();

    let mut hasher = Hasher::new();
    for line in &lines {
        hasher.update(line.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
