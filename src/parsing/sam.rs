//! Alignment scanner for SAM and BAM files using noodles.
//!
//! Produces the grouped alignment stream the coverage engine folds in:
//! reference name -> ordered raw `(query, start, cigar, weight)` tuples, plus
//! one pseudo-group keyed `UNMAPPED` whose single entry carries the summed
//! weight of every read that did not align (or whose alignment fell below the
//! mapping-quality threshold).
//!
//! Fragment weights follow template accounting: a mate contributes 0.5 when
//! both mates of its template mapped somewhere, 1.0 otherwise, divided by the
//! number of alignments recorded for that mate. Summed over a template, the
//! weights of one fragment never exceed 1.0.

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::RecordBuf;

use crate::core::alignment::{RawAlignment, UNMAPPED};
use crate::core::reference::AlignmentGroups;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid alignment file: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// One mapped record, held until the whole file has been audited for mate
/// pairing and per-mate alignment counts.
#[derive(Debug)]
struct ScannedAlignment {
    query: String,
    reference: String,
    start: u64,
    mapping_quality: Option<u8>,
    cigar: String,
    last_segment: bool,
}

/// Per-template audit used to derive fragment weights.
#[derive(Debug, Default)]
struct MateAudit {
    first_mapped: bool,
    last_mapped: bool,
    first_alignments: u32,
    last_alignments: u32,
}

/// Counters reported once per scan.
#[derive(Debug, Default)]
struct ScanStats {
    records: u64,
    mapped: u64,
    unmapped: u64,
    reverse: u64,
    multireads_dropped: u64,
    /// Pre-summed weight of reads that never aligned: half a fragment per
    /// paired read, one per unpaired read.
    unmapped_weight: f64,
}

/// Scan a SAM or BAM file into grouped raw alignments.
///
/// Secondary and supplementary records are dropped unless `multireads` is
/// set. Records with mapping quality below `min_mapq` are excluded after
/// weight assignment, their weight joining the unmapped pool so the global
/// fragment denominator still accounts for them. The `UNMAPPED` pseudo-group
/// is always present, even when its weight is zero.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles`
/// if record parsing fails, `ParseError::UnsupportedFormat` for unknown
/// extensions, or `ParseError::InvalidFormat` if the file holds no alignment
/// records at all.
pub fn scan_alignments(
    path: &Path,
    multireads: bool,
    min_mapq: u8,
) -> Result<AlignmentGroups, ParseError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let (matches, audit, stats) = match extension.as_deref() {
        Some("sam") | None => scan_sam_file(path, multireads)?,
        Some("bam") => scan_bam_file(path, multireads)?,
        Some(ext) => return Err(ParseError::UnsupportedFormat(ext.to_string())),
    };

    if stats.records == 0 {
        return Err(ParseError::InvalidFormat(format!(
            "No alignment records found in {}",
            path.display()
        )));
    }

    info!(
        records = stats.records,
        mapped = stats.mapped,
        unmapped = stats.unmapped,
        forward = stats.mapped - stats.reverse,
        reverse = stats.reverse,
        multireads_dropped = stats.multireads_dropped,
        file = %path.display(),
        "alignment file scanned"
    );

    Ok(assign_weights(matches, &audit, &stats, min_mapq))
}

/// Scan a SAM file (text format)
fn scan_sam_file(
    path: &Path,
    multireads: bool,
) -> Result<(Vec<ScannedAlignment>, HashMap<String, MateAudit>, ScanStats), ParseError> {
    use noodles::sam;

    let mut reader = std::fs::File::open(path)
        .map(BufReader::new)
        .map(sam::io::Reader::new)?;

    let header = reader
        .read_header()
        .map_err(|e| ParseError::Noodles(e.to_string()))?;

    collect_records(&header, reader.record_bufs(&header), multireads)
}

/// Scan a BAM file (binary format)
fn scan_bam_file(
    path: &Path,
    multireads: bool,
) -> Result<(Vec<ScannedAlignment>, HashMap<String, MateAudit>, ScanStats), ParseError> {
    use noodles::bam;

    let mut reader = std::fs::File::open(path).map(bam::io::Reader::new)?;

    let header = reader
        .read_header()
        .map_err(|e| ParseError::Noodles(e.to_string()))?;

    collect_records(&header, reader.record_bufs(&header), multireads)
}

/// Walk the record stream, keeping mapped records and auditing templates.
fn collect_records<I>(
    header: &noodles::sam::Header,
    records: I,
    multireads: bool,
) -> Result<(Vec<ScannedAlignment>, HashMap<String, MateAudit>, ScanStats), ParseError>
where
    I: Iterator<Item = std::io::Result<RecordBuf>>,
{
    let mut matches = Vec::new();
    let mut audit: HashMap<String, MateAudit> = HashMap::new();
    let mut stats = ScanStats::default();

    for result in records {
        let record = result.map_err(|e| ParseError::Noodles(e.to_string()))?;
        stats.records += 1;

        let flags = record.flags();

        if !multireads && (flags.is_secondary() || flags.is_supplementary()) {
            stats.multireads_dropped += 1;
            continue;
        }

        let coordinates = record.reference_sequence_id().zip(record.alignment_start());
        let Some((reference_id, start)) = coordinates.filter(|_| !flags.is_unmapped()) else {
            stats.unmapped += 1;
            stats.unmapped_weight += if flags.is_segmented() { 0.5 } else { 1.0 };
            continue;
        };

        let (reference_name, _) = header
            .reference_sequences()
            .get_index(reference_id)
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "record references sequence index {reference_id} absent from the header"
                ))
            })?;

        let query = record
            .name()
            .map(|name| String::from_utf8_lossy(name).to_string())
            .unwrap_or_default();

        let last_segment = flags.is_segmented() && flags.is_last_segment();
        let entry = audit.entry(query.clone()).or_default();
        if last_segment {
            entry.last_mapped = true;
            entry.last_alignments += 1;
        } else {
            entry.first_mapped = true;
            entry.first_alignments += 1;
        }

        stats.mapped += 1;
        if flags.is_reverse_complemented() {
            stats.reverse += 1;
        }
        matches.push(ScannedAlignment {
            query,
            reference: reference_name.to_string(),
            start: start.get() as u64,
            mapping_quality: record.mapping_quality().map(|mq| mq.get()),
            cigar: cigar_string(&record),
            last_segment,
        });
    }

    Ok((matches, audit, stats))
}

/// Render a record's CIGAR operations back into the text representation.
fn cigar_string(record: &RecordBuf) -> String {
    let ops: &[_] = record.cigar().as_ref();
    let mut text = String::with_capacity(ops.len() * 4);
    for op in ops {
        text.push_str(&op.len().to_string());
        text.push(match op.kind() {
            Kind::Match => 'M',
            Kind::Insertion => 'I',
            Kind::Deletion => 'D',
            Kind::Skip => 'N',
            Kind::SoftClip => 'S',
            Kind::HardClip => 'H',
            Kind::Pad => 'P',
            Kind::SequenceMatch => '=',
            Kind::SequenceMismatch => 'X',
        });
    }
    text
}

/// Derive per-record fragment weights from the template audit and group the
/// records by reference, pooling low-quality weight under `UNMAPPED`.
fn assign_weights(
    matches: Vec<ScannedAlignment>,
    audit: &HashMap<String, MateAudit>,
    stats: &ScanStats,
    min_mapq: u8,
) -> AlignmentGroups {
    let mut groups = AlignmentGroups::new();
    let mut pool = stats.unmapped_weight;
    let mut low_mapq = 0u64;

    for scanned in matches {
        let weight = audit
            .get(&scanned.query)
            .map_or(1.0, |entry| fragment_weight(entry, scanned.last_segment));

        if scanned.mapping_quality.is_some_and(|mq| mq < min_mapq) {
            low_mapq += 1;
            pool += weight;
            continue;
        }

        groups
            .entry(scanned.reference)
            .or_default()
            .push(RawAlignment::new(
                scanned.query,
                scanned.start,
                scanned.cigar,
                weight,
            ));
    }

    if low_mapq > 0 {
        debug!(
            records = low_mapq,
            threshold = min_mapq,
            "weight of low mapping-quality alignments moved to the unmapped pool"
        );
    }

    groups.insert(
        UNMAPPED.to_string(),
        vec![RawAlignment::new(UNMAPPED, 0, "", pool)],
    );
    groups
}

/// Weight of one mate's alignment: half a fragment when both mates mapped,
/// a whole fragment otherwise, split across that mate's alignment count.
fn fragment_weight(entry: &MateAudit, last_segment: bool) -> f64 {
    let numerator = if entry.first_mapped && entry.last_mapped {
        0.5
    } else {
        1.0
    };
    let alignments = if last_segment {
        entry.last_alignments
    } else {
        entry.first_alignments
    };
    numerator / f64::from(alignments.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_sam(lines: &[&str]) -> NamedTempFile {
        let mut temp = NamedTempFile::with_suffix(".sam").unwrap();
        for line in lines {
            writeln!(temp, "{line}").unwrap();
        }
        temp.flush().unwrap();
        temp
    }

    const HEADER: &[&str] = &[
        "@HD\tVN:1.6\tSO:unsorted",
        "@SQ\tSN:contig_1\tLN:1000",
        "@SQ\tSN:contig_2\tLN:500",
    ];

    fn sam_with(records: &[&str]) -> NamedTempFile {
        let mut lines: Vec<&str> = HEADER.to_vec();
        lines.extend_from_slice(records);
        write_sam(&lines)
    }

    #[test]
    fn test_single_unpaired_read_weighs_one() {
        let temp = sam_with(&["read_1\t0\tcontig_1\t1\t60\t100M\t*\t0\t0\t*\t*"]);
        let groups = scan_alignments(temp.path(), false, 0).unwrap();

        let raws = &groups["contig_1"];
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].query, "read_1");
        assert_eq!(raws[0].start, 1);
        assert_eq!(raws[0].cigar, "100M");
        assert!((raws[0].weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_paired_mates_weigh_half_each() {
        // 0x1 paired, 0x40 first / 0x80 last in template
        let temp = sam_with(&[
            "frag_1\t65\tcontig_1\t1\t60\t100M\t*\t0\t0\t*\t*",
            "frag_1\t129\tcontig_1\t201\t60\t100M\t*\t0\t0\t*\t*",
        ]);
        let groups = scan_alignments(temp.path(), false, 0).unwrap();

        let raws = &groups["contig_1"];
        assert_eq!(raws.len(), 2);
        for raw in raws {
            assert!((raw.weight - 0.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_orphan_mate_weighs_one() {
        // Only the first mate mapped, so it keeps a full fragment; the
        // unmapped mate contributes half a fragment to the pool.
        let temp = sam_with(&[
            "frag_1\t73\tcontig_1\t1\t60\t100M\t*\t0\t0\t*\t*",
            "frag_1\t133\t*\t0\t0\t*\t*\t0\t0\t*\t*",
        ]);
        let groups = scan_alignments(temp.path(), false, 0).unwrap();

        let raws = &groups["contig_1"];
        assert_eq!(raws.len(), 1);
        assert!((raws[0].weight - 1.0).abs() < f64::EPSILON);
        assert!((groups[UNMAPPED][0].weight - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unmapped_read_feeds_pool() {
        let temp = sam_with(&[
            "read_1\t0\tcontig_1\t1\t60\t100M\t*\t0\t0\t*\t*",
            "read_2\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*",
        ]);
        let groups = scan_alignments(temp.path(), false, 0).unwrap();

        let pool = &groups[UNMAPPED];
        assert_eq!(pool.len(), 1);
        assert!((pool[0].weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unmapped_group_always_present() {
        let temp = sam_with(&["read_1\t0\tcontig_1\t1\t60\t100M\t*\t0\t0\t*\t*"]);
        let groups = scan_alignments(temp.path(), false, 0).unwrap();

        assert!(groups.contains_key(UNMAPPED));
        assert!(groups[UNMAPPED][0].weight.abs() < f64::EPSILON);
    }

    #[test]
    fn test_secondary_alignment_dropped_without_multireads() {
        let temp = sam_with(&[
            "read_1\t0\tcontig_1\t1\t60\t100M\t*\t0\t0\t*\t*",
            "read_1\t256\tcontig_2\t1\t60\t100M\t*\t0\t0\t*\t*",
        ]);
        let groups = scan_alignments(temp.path(), false, 0).unwrap();

        assert_eq!(groups["contig_1"].len(), 1);
        assert!(!groups.contains_key("contig_2"));
        assert!((groups["contig_1"][0].weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multireads_split_weight_across_alignments() {
        let temp = sam_with(&[
            "read_1\t0\tcontig_1\t1\t60\t100M\t*\t0\t0\t*\t*",
            "read_1\t256\tcontig_2\t1\t60\t100M\t*\t0\t0\t*\t*",
        ]);
        let groups = scan_alignments(temp.path(), true, 0).unwrap();

        assert!((groups["contig_1"][0].weight - 0.5).abs() < f64::EPSILON);
        assert!((groups["contig_2"][0].weight - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_low_mapq_weight_moves_to_pool() {
        let temp = sam_with(&[
            "read_1\t0\tcontig_1\t1\t10\t100M\t*\t0\t0\t*\t*",
            "read_2\t0\tcontig_1\t1\t60\t100M\t*\t0\t0\t*\t*",
        ]);
        let groups = scan_alignments(temp.path(), false, 30).unwrap();

        assert_eq!(groups["contig_1"].len(), 1);
        assert_eq!(groups["contig_1"][0].query, "read_2");
        assert!((groups[UNMAPPED][0].weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_soft_clips_preserved_in_cigar() {
        let temp = sam_with(&["read_1\t0\tcontig_1\t1\t60\t5S45M\t*\t0\t0\t*\t*"]);
        let groups = scan_alignments(temp.path(), false, 0).unwrap();

        assert_eq!(groups["contig_1"][0].cigar, "5S45M");
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let temp = write_sam(HEADER);
        assert!(matches!(
            scan_alignments(temp.path(), false, 0),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let mut temp = NamedTempFile::with_suffix(".vcf").unwrap();
        temp.write_all(b"x\n").unwrap();
        temp.flush().unwrap();

        assert!(matches!(
            scan_alignments(temp.path(), false, 0),
            Err(ParseError::UnsupportedFormat(_))
        ));
    }
}
