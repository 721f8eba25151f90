use crate::types::NameMap;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Name table shared by all workers.
///
/// Writes are serialized by the mutex. Entries are indexed by the producing
/// job's sequence number so the final table comes out in enumeration order no
/// matter which worker finished first.
#[derive(Debug, Default)]
pub struct ResultMap {
    entries: Mutex<BTreeMap<usize, (String, String)>>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, seq: usize, key: String, value: String) {
        self.entries.lock().await.insert(seq, (key, value));
    }

    /// Number of recorded entries (jobs that produced a name).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Ordered key -> name table.
    ///
    /// A key produced by several jobs sits at the position of the first one
    /// and carries the value of the last one.
    pub fn into_names(self) -> NameMap {
        let mut names = NameMap::new();
        for (_, (key, value)) in self.entries.into_inner() {
            names.insert(key, value);
        }
        names
    }
}

/// Add each `(key, name)` override whose key is missing. Existing entries are
/// never replaced. Returns how many were added.
pub fn apply_overrides<'a>(
    names: &mut NameMap,
    overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> usize {
    let mut added = 0;
    for (key, name) in overrides {
        if !names.contains_key(key) {
            names.insert(key.to_string(), name.to_string());
            added += 1;
        }
    }
    added
}
