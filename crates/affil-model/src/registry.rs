//! Registry label rows and the label table consumed by the matcher.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Base URI of the ROR registry. Canonical IDs are stored without it.
pub const ROR_BASE_URI: &str = "https://ror.org/";

/// Returns the full registry URI for a bare canonical ID.
pub fn canonical_uri(canonical_id: &str) -> String {
    format!("{ROR_BASE_URI}{canonical_id}")
}

/// Strips the registry base URI from an identifier value.
///
/// Values without the prefix are returned trimmed but otherwise unchanged.
pub fn strip_registry_prefix(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix(ROR_BASE_URI)
        .or_else(|| value.strip_prefix("http://ror.org/"))
        .unwrap_or(value)
}

/// One (canonical ID, label) pair extracted from the registry dump.
///
/// The label may be a primary name, localized label, acronym, or alias; the
/// kind is not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLabelRow {
    pub canonical_id: String,
    pub label: String,
}

impl RegistryLabelRow {
    pub fn new(canonical_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            canonical_id: canonical_id.into(),
            label: label.into(),
        }
    }
}

/// Canonical ID to candidate labels.
///
/// Labels keep first-seen order and exact duplicates are collapsed, so the
/// table behaves as an ordered set per ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: BTreeMap<String, Vec<String>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a label for a canonical ID. Returns false if it was already present.
    pub fn insert(&mut self, canonical_id: impl Into<String>, label: impl Into<String>) -> bool {
        let label = label.into();
        let entry = self.labels.entry(canonical_id.into()).or_default();
        if entry.iter().any(|existing| existing == &label) {
            return false;
        }
        entry.push(label);
        true
    }

    pub fn get(&self, canonical_id: &str) -> Option<&[String]> {
        self.labels.get(canonical_id).map(Vec::as_slice)
    }

    pub fn contains(&self, canonical_id: &str) -> bool {
        self.labels.contains_key(canonical_id)
    }

    /// Number of canonical IDs in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Total number of labels across all IDs.
    pub fn label_count(&self) -> usize {
        self.labels.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.labels
            .iter()
            .map(|(id, labels)| (id.as_str(), labels.as_slice()))
    }
}

impl FromIterator<RegistryLabelRow> for LabelTable {
    fn from_iter<I: IntoIterator<Item = RegistryLabelRow>>(iter: I) -> Self {
        let mut table = Self::new();
        for row in iter {
            table.insert(row.canonical_id, row.label);
        }
        table
    }
}
