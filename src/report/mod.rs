//! Tabular summary output.
//!
//! Builds one row per reference sequence plus a synthetic `UNMAPPED` row, and
//! writes them as delimited text with a fixed column set:
//!
//! `QueryName, RefSequence, ProportionCovered, Coverage, Fragments, FPKM, TPM`
//!
//! `QueryName` is the sample label (derived from the alignment file name) and
//! repeats on every row. Rows are ordered by descending TPM so the most
//! abundant references lead the table.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::core::alignment::UNMAPPED;
use crate::core::reference::ReferenceCollection;

/// Column headers, in output order.
const COLUMNS: [&str; 7] = [
    "QueryName",
    "RefSequence",
    "ProportionCovered",
    "Coverage",
    "Fragments",
    "FPKM",
    "TPM",
];

/// One output row of the summary table.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub sample: String,
    pub reference: String,
    pub proportion_covered: f64,
    pub coverage: f64,
    pub fragments: f64,
    pub fpkm: f64,
    pub tpm: f64,
}

/// Build the summary rows for a normalized collection.
///
/// The `UNMAPPED` row carries the pooled excluded weight in its `Fragments`
/// column; its other metrics are zero by construction. Rows are sorted by
/// descending TPM, ties keeping their collection order.
#[must_use]
pub fn summary_rows(references: &ReferenceCollection, sample: &str) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = references
        .iter()
        .map(|ref_seq| SummaryRow {
            sample: sample.to_string(),
            reference: ref_seq.name.clone(),
            proportion_covered: ref_seq.covered,
            coverage: ref_seq.depth,
            fragments: ref_seq.weight_total,
            fpkm: ref_seq.fpkm,
            tpm: ref_seq.tpm,
        })
        .collect();

    rows.sort_by(|a, b| b.tpm.partial_cmp(&a.tpm).unwrap_or(Ordering::Equal));

    rows.push(SummaryRow {
        sample: sample.to_string(),
        reference: UNMAPPED.to_string(),
        proportion_covered: 0.0,
        coverage: 0.0,
        fragments: references.unmapped_weight(),
        fpkm: 0.0,
        tpm: 0.0,
    });

    rows
}

/// Derive the sample label from the alignment file name, dropping the
/// extension. Falls back to the full path when there is no file stem.
#[must_use]
pub fn sample_label(alignment_path: &Path) -> String {
    alignment_path
        .file_stem()
        .map_or_else(
            || alignment_path.display().to_string(),
            |stem| stem.to_string_lossy().to_string(),
        )
}

/// Write the summary table to `output` with the given field separator.
///
/// # Errors
///
/// Returns `std::io::Error` if the file cannot be created or written.
pub fn write_table(output: &Path, rows: &[SummaryRow], sep: &str) -> std::io::Result<()> {
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    render_table(&mut writer, rows, sep)?;
    writer.flush()?;

    info!(rows = rows.len(), file = %output.display(), "summary table written");
    Ok(())
}

/// Render rows into any writer. Numeric columns are rounded to three
/// decimal places.
fn render_table<W: Write>(writer: &mut W, rows: &[SummaryRow], sep: &str) -> std::io::Result<()> {
    writeln!(writer, "{}", COLUMNS.join(sep))?;
    for row in rows {
        writeln!(
            writer,
            "{sample}{sep}{reference}{sep}{covered:.3}{sep}{coverage:.3}{sep}{fragments:.3}{sep}{fpkm:.3}{sep}{tpm:.3}",
            sample = row.sample,
            reference = row.reference,
            covered = row.proportion_covered,
            coverage = row.coverage,
            fragments = row.fragments,
            fpkm = row.fpkm,
            tpm = row.tpm,
        )?;
    }
    Ok(())
}
