//! Reference length scanner for FASTA files using noodles.
//!
//! Produces the name -> length table the reference collection is built from.
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use tracing::{info, warn};

use crate::parsing::sam::ParseError;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Scan a FASTA file into ordered `(name, length)` pairs.
///
/// Names are the first whitespace-delimited token of each description line.
/// The whole file is read to measure sequence lengths. Zero-length sequences
/// are skipped with a warning so the coverage engine never sees one.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles`
/// if record parsing fails, or `ParseError::InvalidFormat` if no sequences
/// are found.
pub fn reference_lengths(path: &Path) -> Result<Vec<(String, u64)>, ParseError> {
    let lengths = if is_gzipped(path) {
        let file = std::fs::File::open(path)?;
        let decoder = MultiGzDecoder::new(file);
        let reader = BufReader::new(decoder);
        scan_lengths(&mut fasta::io::Reader::new(reader))?
    } else {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        scan_lengths(&mut fasta::io::Reader::new(reader))?
    };

    info!(
        sequences = lengths.len(),
        file = %path.display(),
        "reference sequence lengths read"
    );
    Ok(lengths)
}

/// Scan sequence lengths from a noodles FASTA reader
fn scan_lengths<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<(String, u64)>, ParseError> {
    let mut lengths = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        let name = String::from_utf8_lossy(record.name()).to_string();
        let length = record.sequence().len() as u64;

        if length == 0 {
            warn!(sequence = %name, "skipping zero-length reference sequence");
            continue;
        }

        lengths.push((name, length));
    }

    if lengths.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(lengths)
}
