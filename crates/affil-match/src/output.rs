//! Match result tables.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use affil_model::MatchResult;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{MatchError, Result};

pub const RESULT_HEADER: [&str; 6] = [
    "DOI",
    "Crossref affiliation",
    "Matched ROR name",
    "ROR ID",
    "Match score",
    "Match status",
];

/// Delimited output format for result tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Csv,
}

impl OutputFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            Self::Csv => b',',
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
            Self::Csv => "csv",
        }
    }

    /// Format implied by a file extension, if recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format '{other}' (expected tsv or csv)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes results with a header row, replacing `path` only on success.
///
/// # Errors
///
/// [`MatchError::Io`] when the temporary file cannot be created or moved
/// into place, [`MatchError::Write`] for serialization failures.
pub fn write_results(path: &Path, results: &[MatchResult], format: OutputFormat) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir).map_err(|e| MatchError::io(dir, e))?;
    {
        let mut writer = result_writer(temp.as_file(), format);
        writer
            .write_record(RESULT_HEADER)
            .map_err(|e| MatchError::write(path, e))?;
        for result in results {
            let score = result.score.to_string();
            writer
                .write_record([
                    result.document_id.as_str(),
                    result.affiliation_name.as_str(),
                    result.matched_label.as_str(),
                    result.canonical_id.as_str(),
                    score.as_str(),
                    result.confidence_tier.label(),
                ])
                .map_err(|e| MatchError::write(path, e))?;
        }
        writer.flush().map_err(|e| MatchError::io(path, e))?;
    }
    temp.persist(path)
        .map_err(|e| MatchError::io(path, e.error))?;
    Ok(())
}

fn result_writer(file: &File, format: OutputFormat) -> csv::Writer<&File> {
    csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(file)
}

#[cfg(test)]
mod tests {
    use affil_model::ConfidenceTier;

    use super::*;

    fn result() -> MatchResult {
        MatchResult {
            document_id: "10.1/x".to_string(),
            affiliation_name: "Dept of Physics, Example University".to_string(),
            matched_label: "Example University".to_string(),
            canonical_id: "ABC123".to_string(),
            score: 100,
            confidence_tier: ConfidenceTier::High,
        }
    }

    #[test]
    fn tsv_keeps_commas_unquoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.tsv");
        write_results(&path, &[result()], OutputFormat::Tsv).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "DOI\tCrossref affiliation\tMatched ROR name\tROR ID\tMatch score\tMatch status"
        );
        assert_eq!(
            lines[1],
            "10.1/x\tDept of Physics, Example University\tExample University\tABC123\t100\tHigh Confidence Match"
        );
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.csv");
        write_results(&path, &[result()], OutputFormat::Csv).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"Dept of Physics, Example University\""));
    }

    #[test]
    fn format_parses_and_follows_extension() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xlsx".parse::<OutputFormat>().is_err());
        assert_eq!(
            OutputFormat::from_path(Path::new("out/matches.tsv")),
            Some(OutputFormat::Tsv)
        );
        assert_eq!(OutputFormat::from_path(Path::new("matches")), None);
    }
}
