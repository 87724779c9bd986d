//! Harvested affiliation records.
//!
//! One record exists per document identifier. A record can be empty: the
//! document was returned by the source but reported no affiliations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Harvested records keyed by document identifier.
pub type RecordMap = BTreeMap<String, AffiliationRecord>;

/// Affiliation mentions collected for a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliationRecord {
    /// Opaque document identifier (a DOI for Crossref works).
    pub document_id: String,
    /// Bare canonical organization ID attached to the document, if any.
    #[serde(default)]
    pub canonical_id: Option<String>,
    /// Affiliation names and acronyms in harvesting order. Duplicates are kept.
    #[serde(default)]
    pub affiliation_names: Vec<String>,
}

impl AffiliationRecord {
    /// Creates an empty record for a document.
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            canonical_id: None,
            affiliation_names: Vec::new(),
        }
    }

    /// True when the document reported neither names nor a canonical ID.
    pub fn is_empty(&self) -> bool {
        self.canonical_id.is_none() && self.affiliation_names.is_empty()
    }
}
