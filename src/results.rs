use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Qualified names discovered during one scan. Shared by reference between
/// every walker of the scan; safe for concurrent insertion.
#[derive(Debug, Default)]
pub struct ResultSet {
    names: Mutex<HashSet<String>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the name was already present.
    pub fn insert(&self, name: String) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name)
    }

    /// Consumes the set into a lexicographically sorted listing.
    pub fn finalize(self) -> Vec<String> {
        let names = self.names.into_inner().unwrap_or_else(PoisonError::into_inner);
        let mut sorted: Vec<String> = names.into_iter().collect();
        sorted.sort();
        sorted
    }
}
