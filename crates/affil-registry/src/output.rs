//! Label table TSV: written by the extractor, read back by the matcher.

use std::fs::File;
use std::path::Path;

use affil_model::{LabelTable, RegistryLabelRow};
use tempfile::NamedTempFile;

use crate::error::{RegistryError, Result};

/// Header row of the label table.
pub const LABEL_TABLE_HEADER: [&str; 2] = ["ROR ID", "Label"];

/// Writes rows as a two-column TSV with a header.
///
/// Fields are written raw, never quoted. Tabs and line breaks inside a label
/// become spaces so every row stays two columns.
///
/// Rows go to a temporary sibling file that is renamed into place only after
/// every row has been written, so a failure never leaves a partial table.
///
/// # Errors
///
/// [`RegistryError::Write`] on any write failure.
pub fn write_label_rows(path: &Path, rows: &[RegistryLabelRow]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir).map_err(|e| RegistryError::write(path, e))?;
    {
        let mut writer = tsv_writer(temp.as_file());
        writer
            .write_record(LABEL_TABLE_HEADER)
            .map_err(|e| RegistryError::write(path, e))?;
        for row in rows {
            writer
                .write_record([row.canonical_id.as_str(), flatten(&row.label).as_str()])
                .map_err(|e| RegistryError::write(path, e))?;
        }
        writer.flush().map_err(|e| RegistryError::write(path, e))?;
    }
    temp.persist(path)
        .map_err(|e| RegistryError::write(path, e.error))?;
    Ok(())
}

/// Reads a label table written by [`write_label_rows`].
///
/// # Errors
///
/// [`RegistryError::Io`] when the file cannot be opened,
/// [`RegistryError::LabelsParse`] for rows that are not two columns.
pub fn load_label_table(path: &Path) -> Result<LabelTable> {
    Ok(read_label_rows(path)?.into_iter().collect())
}

/// Reads label rows in file order.
///
/// # Errors
///
/// See [`load_label_table`].
pub fn read_label_rows(path: &Path) -> Result<Vec<RegistryLabelRow>> {
    let file = File::open(path).map_err(|e| RegistryError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .from_reader(file);

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| labels_parse(path, e))?;
        let (Some(id), Some(label)) = (record.get(0), record.get(1)) else {
            return Err(RegistryError::LabelsParse {
                path: path.to_path_buf(),
                message: format!("row {} has fewer than two columns", line + 2),
            });
        };
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        rows.push(RegistryLabelRow::new(id, label));
    }
    Ok(rows)
}

fn tsv_writer(file: &File) -> csv::Writer<&File> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(file)
}

fn flatten(label: &str) -> String {
    label.replace(['\t', '\n', '\r'], " ")
}

fn labels_parse(path: &Path, error: csv::Error) -> RegistryError {
    RegistryError::LabelsParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
