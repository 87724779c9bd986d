//! Match results and confidence tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete confidence bucket derived from a 0-100 similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceTier {
    /// Score of 90 or more.
    #[serde(rename = "High Confidence Match")]
    High,
    /// Score in `[80, 90)`.
    #[serde(rename = "Moderate Confidence Match")]
    Moderate,
    /// Score in `[70, 80)`.
    #[serde(rename = "Low Confidence Match")]
    Low,
    /// Score below 70 that still passed the matcher's cutoff.
    #[serde(rename = "No Reliable Match")]
    NoReliable,
}

impl ConfidenceTier {
    pub const HIGH_THRESHOLD: u8 = 90;
    pub const MODERATE_THRESHOLD: u8 = 80;
    pub const LOW_THRESHOLD: u8 = 70;

    /// All tiers, best first.
    pub const fn all() -> &'static [ConfidenceTier] {
        &[Self::High, Self::Moderate, Self::Low, Self::NoReliable]
    }

    /// Tier for a score. Does not apply any cutoff.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Self::High
        } else if score >= Self::MODERATE_THRESHOLD {
            Self::Moderate
        } else if score >= Self::LOW_THRESHOLD {
            Self::Low
        } else {
            Self::NoReliable
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::High => "High Confidence Match",
            Self::Moderate => "Moderate Confidence Match",
            Self::Low => "Low Confidence Match",
            Self::NoReliable => "No Reliable Match",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Best registry label found for one affiliation string of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub document_id: String,
    /// Raw affiliation string as harvested.
    pub affiliation_name: String,
    pub matched_label: String,
    pub canonical_id: String,
    /// Similarity score, 0-100.
    pub score: u8,
    pub confidence_tier: ConfidenceTier,
}
