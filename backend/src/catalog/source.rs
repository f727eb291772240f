//! Locating, decoding and tabulating the raw venue source.
//!
//! The dataset is a spreadsheet export: it may carry a UTF-8 BOM, a few title
//! lines above the real header, ragged rows and stray bytes that are not valid
//! UTF-8. This module turns it into a rectangular [`RawTable`] of trimmed
//! strings and leaves every semantic decision to the normalizer.

use std::fs;
use std::path::{Path, PathBuf};

use super::checksum::calculate_checksum;
use super::normalizer::COLUMN_ALIASES;
use crate::error::{DataError, DataResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Raw bytes read from a located source file.
#[derive(Debug, Clone)]
pub struct SourceBytes {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub checksum: String,
}

/// A decoded table: header names plus one row of cells per record.
///
/// Every row has exactly `headers.len()` cells; short rows are padded with
/// empty strings and long rows truncated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Return the first candidate path that exists.
pub fn locate(candidates: &[PathBuf]) -> DataResult<PathBuf> {
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| DataError::SourceNotFound {
            tried: candidates.to_vec(),
        })
}

/// Read a source file and fingerprint its content.
pub fn read_source(path: &Path) -> DataResult<SourceBytes> {
    let bytes = fs::read(path).map_err(|e| DataError::io(path, e))?;
    let checksum = calculate_checksum(&bytes);
    Ok(SourceBytes {
        path: path.to_path_buf(),
        bytes,
        checksum,
    })
}

/// Decode bytes as UTF-8, dropping a leading BOM.
///
/// Invalid sequences are replaced rather than rejected; the caller is told
/// through a warning so a mis-encoded export is visible in the logs.
pub fn decode_text(bytes: &[u8]) -> String {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(e) => {
            log::warn!(
                "Source is not valid UTF-8 (first bad byte at {}); decoding lossily",
                e.valid_up_to()
            );
            String::from_utf8_lossy(body).into_owned()
        }
    }
}

/// Trimmed, lower-cased cells of a single CSV line.
fn line_cells(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_lowercase).collect(),
        _ => line.split(',').map(|c| c.trim().to_lowercase()).collect(),
    }
}

/// Whether a cell is exactly one of the known column names.
fn is_column_alias(cell: &str) -> bool {
    COLUMN_ALIASES
        .iter()
        .flat_map(|(_, aliases)| aliases.iter())
        .any(|alias| alias.to_lowercase() == cell)
}

/// Number of leading lines to skip so the header becomes the first line.
///
/// Scans up to `scan_rows` lines for one with a cell that is a known column
/// name. Title text that merely mentions a column word does not count. When
/// no line qualifies the first line is assumed to be the header.
pub fn detect_header_row(text: &str, scan_rows: usize) -> usize {
    for (i, line) in text.lines().take(scan_rows).enumerate() {
        if line_cells(line).iter().any(|cell| is_column_alias(cell)) {
            return i;
        }
    }
    log::warn!(
        "No known column name found in the first {} lines; using line 0 as header",
        scan_rows
    );
    0
}

/// Byte offset of the start of line `n` (0-based).
fn line_offset(text: &str, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    text.match_indices('\n')
        .nth(n - 1)
        .map(|(i, _)| i + 1)
        .unwrap_or(text.len())
}

/// Decode, skip the preamble and parse the remaining CSV.
pub fn parse_table(bytes: &[u8], scan_rows: usize) -> DataResult<RawTable> {
    let text = decode_text(bytes);
    let skip = detect_header_row(&text, scan_rows);
    let body = &text[line_offset(&text, skip)..];

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    log::debug!(
        "Parsed {} rows x {} columns (skipped {} preamble lines)",
        rows.len(),
        width,
        skip
    );
    Ok(RawTable { headers, rows })
}
