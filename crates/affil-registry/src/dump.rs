//! Registry dump model.
//!
//! Two dump layouts are understood:
//! - v1: `name`, `labels[].label`, `acronyms[]`, `aliases[]`
//! - v2: `names[]`, each with a `value` and `types` drawn from
//!   `ror_display`, `label`, `acronym`, `alias`
//!
//! Both are flattened to the same label order: primary name, localized
//! labels, acronyms, aliases.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};

const TYPE_DISPLAY: &str = "ror_display";
const TYPE_LABEL: &str = "label";
const TYPE_ACRONYM: &str = "acronym";
const TYPE_ALIAS: &str = "alias";

/// One organization object from the dump.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryRecord {
    /// Full identifier URI, e.g. `https://ror.org/04wxnsj81`.
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: Vec<LocalizedLabel>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub acronyms: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub names: Vec<RegistryName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalizedLabel {
    pub label: String,
    #[serde(default)]
    pub iso639: Option<String>,
}

/// v2 name entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryName {
    pub value: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub types: Vec<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl RegistryName {
    fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(kind))
    }
}

impl RegistryRecord {
    /// Primary name: v1 `name`, else the v2 `ror_display` entry.
    pub fn primary_name(&self) -> Option<&str> {
        self.name.as_deref().or_else(|| {
            self.names
                .iter()
                .find(|n| n.has_type(TYPE_DISPLAY))
                .map(|n| n.value.as_str())
        })
    }

    /// All match candidates in emission order.
    pub fn labels(&self) -> Vec<&str> {
        let mut out = Vec::new();
        out.extend(self.primary_name());

        out.extend(self.labels.iter().map(|l| l.label.as_str()));
        out.extend(
            self.names
                .iter()
                .filter(|n| n.has_type(TYPE_LABEL) && !n.has_type(TYPE_DISPLAY))
                .map(|n| n.value.as_str()),
        );

        out.extend(self.acronyms.iter().map(String::as_str));
        out.extend(self.v2_values(TYPE_ACRONYM));

        out.extend(self.aliases.iter().map(String::as_str));
        out.extend(self.v2_values(TYPE_ALIAS));
        out
    }

    fn v2_values<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.names
            .iter()
            .filter(move |n| n.has_type(kind))
            .map(|n| n.value.as_str())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parsed registry dump.
#[derive(Debug, Clone, Default)]
pub struct RegistryDump {
    records: Vec<RegistryRecord>,
    skipped: usize,
}

impl RegistryDump {
    /// Builds a dump from raw JSON objects, skipping those that do not parse.
    pub fn from_values(values: &[serde_json::Value]) -> Self {
        let mut records = Vec::with_capacity(values.len());
        let mut skipped = 0;
        for (index, value) in values.iter().enumerate() {
            match RegistryRecord::deserialize(value) {
                Ok(record) => records.push(record),
                Err(error) => {
                    skipped += 1;
                    warn!(index, %error, "skipping malformed registry object");
                }
            }
        }
        Self { records, skipped }
    }

    pub fn from_records(records: Vec<RegistryRecord>) -> Self {
        Self {
            records,
            skipped: 0,
        }
    }

    pub fn records(&self) -> &[RegistryRecord] {
        &self.records
    }

    /// Objects dropped because they did not parse.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifier URI to every object carrying it, in dump order.
    pub fn index(&self) -> HashMap<&str, Vec<&RegistryRecord>> {
        let mut index: HashMap<&str, Vec<&RegistryRecord>> = HashMap::new();
        for record in &self.records {
            index.entry(record.id.trim()).or_default().push(record);
        }
        index
    }
}

/// Loads a registry dump from a JSON array file.
///
/// # Errors
///
/// [`RegistryError::DumpNotFound`] when the file is missing,
/// [`RegistryError::DumpParse`] when it is not a JSON array.
pub fn load_dump(path: &Path) -> Result<RegistryDump> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RegistryError::DumpNotFound {
            path: path.to_path_buf(),
        },
        _ => RegistryError::io(path, e),
    })?;
    let values: Vec<serde_json::Value> =
        serde_json::from_str(&contents).map_err(|source| RegistryError::DumpParse {
            path: path.to_path_buf(),
            source,
        })?;
    let dump = RegistryDump::from_values(&values);
    debug!(
        path = %path.display(),
        objects = dump.len(),
        skipped = dump.skipped(),
        "registry dump loaded"
    );
    Ok(dump)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn v1_labels_follow_emission_order() {
        let record: RegistryRecord = serde_json::from_value(json!({
            "id": "https://ror.org/ABC123",
            "name": "Example University",
            "labels": [{"label": "Université Exemple", "iso639": "fr"}],
            "acronyms": ["EU"],
            "aliases": ["Example U"]
        }))
        .unwrap();

        assert_eq!(
            record.labels(),
            vec!["Example University", "Université Exemple", "EU", "Example U"]
        );
    }

    #[test]
    fn v2_names_are_classified_by_type() {
        let record: RegistryRecord = serde_json::from_value(json!({
            "id": "https://ror.org/ABC123",
            "names": [
                {"value": "EU", "types": ["acronym"], "lang": null},
                {"value": "Example University", "types": ["ror_display", "label"], "lang": "en"},
                {"value": "Example U", "types": ["alias"], "lang": null},
                {"value": "Université Exemple", "types": ["label"], "lang": "fr"}
            ]
        }))
        .unwrap();

        assert_eq!(record.primary_name(), Some("Example University"));
        assert_eq!(
            record.labels(),
            vec!["Example University", "Université Exemple", "EU", "Example U"]
        );
    }

    #[test]
    fn null_arrays_are_treated_as_empty() {
        let record: RegistryRecord = serde_json::from_value(json!({
            "id": "https://ror.org/ABC123",
            "name": "Example University",
            "labels": null,
            "acronyms": null,
            "aliases": null
        }))
        .unwrap();
        assert_eq!(record.labels(), vec!["Example University"]);
    }

    #[test]
    fn objects_without_id_are_skipped() {
        let dump = RegistryDump::from_values(&[
            json!({"name": "No identifier"}),
            json!({"id": "https://ror.org/ABC123", "name": "Example University"}),
        ]);
        assert_eq!(dump.len(), 1);
        assert_eq!(dump.skipped(), 1);
    }

    #[test]
    fn index_keeps_duplicates_in_dump_order() {
        let dump = RegistryDump::from_values(&[
            json!({"id": "https://ror.org/ABC123", "name": "First"}),
            json!({"id": "https://ror.org/XYZ789", "name": "Other"}),
            json!({"id": "https://ror.org/ABC123", "name": "Second"}),
        ]);
        let index = dump.index();
        let names: Vec<_> = index["https://ror.org/ABC123"]
            .iter()
            .map(|r| r.primary_name().unwrap())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
