#![deny(unsafe_code)]

pub mod matching;
pub mod record;
pub mod registry;

pub use matching::{ConfidenceTier, MatchResult};
pub use record::{AffiliationRecord, RecordMap};
pub use registry::{
    LabelTable, ROR_BASE_URI, RegistryLabelRow, canonical_uri, strip_registry_prefix,
};
