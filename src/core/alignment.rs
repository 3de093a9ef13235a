use crate::core::cigar;
use crate::core::error::CoreError;

/// Pseudo-reference name aggregating all reads that did not align or were
/// excluded by upstream filters. Its single record may carry an arbitrarily
/// large pre-summed weight.
pub const UNMAPPED: &str = "UNMAPPED";

/// One raw alignment tuple as produced by the SAM/BAM scanner:
/// query name, 1-based start, CIGAR string, fragment weight.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAlignment {
    pub query: String,
    pub start: u64,
    pub cigar: String,
    pub weight: f64,
}

impl RawAlignment {
    pub fn new(query: impl Into<String>, start: u64, cigar: impl Into<String>, weight: f64) -> Self {
        Self {
            query: query.into(),
            start,
            cigar: cigar.into(),
            weight,
        }
    }
}

/// One read mapped against one reference, with coordinates derived from its
/// CIGAR string. Built once per raw tuple and discarded after it is folded
/// into a reference's running statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    pub query: String,
    pub reference: String,
    /// 1-based leftmost reference coordinate.
    pub start: u64,
    /// Inclusive rightmost reference coordinate; `end >= start - 1`.
    pub end: u64,
    /// Query length recovered from the CIGAR (soft clips included).
    pub read_length: u64,
    pub weight: f64,
}

impl AlignmentRecord {
    /// Build a validated record from a raw scanner tuple.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidWeight` if the fragment weight exceeds 1.0
    /// on any reference other than the UNMAPPED sentinel.
    pub fn from_raw(reference: &str, raw: &RawAlignment) -> Result<Self, CoreError> {
        if raw.weight > 1.0 && reference != UNMAPPED {
            return Err(CoreError::InvalidWeight {
                query: raw.query.clone(),
                weight: raw.weight,
            });
        }

        let (reference_consumed, query_consumed) = cigar::consumed_lengths(&raw.cigar);

        Ok(Self {
            query: raw.query.clone(),
            reference: reference.to_string(),
            start: raw.start,
            end: cigar::alignment_end(raw.start, reference_consumed),
            read_length: query_consumed,
            weight: raw.weight,
        })
    }

    /// Reference span aligned, as a percentage of the read length.
    ///
    /// Note the numerator is a reference-coordinate span while the
    /// denominator is a query-coordinate length; this asymmetry is the
    /// historical definition and is kept as-is.
    #[must_use]
    pub fn percent_aligned(&self) -> f64 {
        if self.read_length == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            100.0 * self.end.saturating_sub(self.start) as f64 / self.read_length as f64
        }
    }
}
