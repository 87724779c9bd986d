//! Crossref work items and their normalization into affiliation records.
//!
//! Affiliation entries in the wild vary: some carry identifier blocks, some
//! don't, and `acronym` shows up both as a list and as a bare string. All of
//! that is folded into [`AffiliationEntry`] before records are built.
//!
//! Only the DOI is read strictly. Below it, values of the wrong type are
//! dropped where they sit, so one odd field never costs the whole document.

use affil_model::{AffiliationRecord, strip_registry_prefix};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `id-type` value that marks a registry identifier.
pub const REGISTRY_ID_TYPE: &str = "ROR";

/// A single item from `message.items`.
#[derive(Debug, Clone, Deserialize)]
pub struct Work {
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(default, deserialize_with = "objects")]
    pub author: Vec<Author>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    /// Kept raw; each entry is parsed on its own in [`NormalizedWork::from`].
    #[serde(default, deserialize_with = "array")]
    pub affiliation: Vec<Value>,
}

/// Affiliation entry as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAffiliation {
    #[serde(default, deserialize_with = "string")]
    pub name: Option<String>,
    /// Either a bare string or a list of strings.
    #[serde(default, deserialize_with = "strings")]
    pub acronym: Vec<String>,
    #[serde(default, deserialize_with = "objects")]
    pub id: Vec<RawIdentifier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIdentifier {
    #[serde(default, deserialize_with = "string")]
    pub id: Option<String>,
    #[serde(default, rename = "id-type", deserialize_with = "string")]
    pub id_type: Option<String>,
}

fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => vec![value],
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(value) => Some(value),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn array<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values,
        _ => Vec::new(),
    })
}

fn objects<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(array(deserializer)?
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|value| T::deserialize(value).ok())
        .collect())
}

/// Normalized affiliation mention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffiliationEntry {
    pub name: Option<String>,
    pub acronyms: Vec<String>,
    /// Bare registry ID (base URI stripped).
    pub canonical_id: Option<String>,
}

impl AffiliationEntry {
    /// Name first, then acronyms.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name
            .as_deref()
            .into_iter()
            .chain(self.acronyms.iter().map(String::as_str))
    }
}

impl From<RawAffiliation> for AffiliationEntry {
    fn from(raw: RawAffiliation) -> Self {
        let name = raw.name.filter(|n| !n.trim().is_empty());
        let acronyms = raw
            .acronym
            .into_iter()
            .filter(|a| !a.trim().is_empty())
            .collect();
        // Several registry IDs on one entry: the last one wins, like later entries do.
        let canonical_id = raw
            .id
            .into_iter()
            .filter(|ident| {
                ident
                    .id_type
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(REGISTRY_ID_TYPE))
            })
            .filter_map(|ident| ident.id)
            .map(|value| strip_registry_prefix(&value).to_string())
            .filter(|id| !id.is_empty())
            .last();
        Self {
            name,
            acronyms,
            canonical_id,
        }
    }
}

/// A work reduced to its document ID and normalized affiliation entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedWork {
    pub document_id: String,
    pub entries: Vec<AffiliationEntry>,
    /// Affiliation entries that were not objects and were dropped.
    pub entries_skipped: usize,
}

impl NormalizedWork {
    /// Builds the record for this document.
    ///
    /// Names accumulate in encounter order; the canonical ID is the one from
    /// the last entry that carried one.
    pub fn to_record(&self) -> AffiliationRecord {
        let mut record = AffiliationRecord::new(self.document_id.clone());
        for entry in &self.entries {
            record
                .affiliation_names
                .extend(entry.names().map(str::to_string));
            if let Some(id) = &entry.canonical_id {
                record.canonical_id = Some(id.clone());
            }
        }
        record
    }

    /// Every canonical ID seen on this work, in encounter order.
    pub fn canonical_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.canonical_id.as_deref())
    }
}

impl From<Work> for NormalizedWork {
    fn from(work: Work) -> Self {
        let mut entries = Vec::new();
        let mut entries_skipped = 0;
        for value in work.author.into_iter().flat_map(|author| author.affiliation) {
            let raw = match value {
                Value::Object(_) => RawAffiliation::deserialize(value).ok(),
                _ => None,
            };
            match raw {
                Some(raw) => entries.push(AffiliationEntry::from(raw)),
                None => entries_skipped += 1,
            }
        }
        Self {
            document_id: work.doi,
            entries,
            entries_skipped,
        }
    }
}

/// Parses one raw item.
///
/// # Errors
///
/// Returns the deserialization error when the item is not an object or
/// lacks a string DOI.
pub fn parse_work(item: &Value) -> Result<NormalizedWork, serde_json::Error> {
    if !item.is_object() {
        return Err(serde::de::Error::custom("work item is not an object"));
    }
    Work::deserialize(item).map(NormalizedWork::from)
}
