//! CIGAR string decoding.
//!
//! A CIGAR string is a run-length encoding of alignment operations, e.g.
//! `5S45M3D2S`. Each operation either consumes reference coordinates, query
//! coordinates, both, or neither; the two consumed totals are what the
//! coverage engine needs from it.

/// Operations that advance the reference coordinate.
const CONSUMES_REFERENCE: [char; 5] = ['M', 'D', 'N', '=', 'X'];

/// Operations that advance the query coordinate.
const CONSUMES_QUERY: [char; 5] = ['M', 'I', 'S', '=', 'X'];

/// Decode a CIGAR string into `(reference_consumed, query_consumed)` lengths.
///
/// Scans left to right with a digit buffer; each operator character folds the
/// buffered run length into whichever totals its operation consumes and
/// resets the buffer. `H` and `P` consume neither. An operator with no
/// preceding digits is skipped. An empty CIGAR (unmapped) yields `(0, 0)`.
#[must_use]
pub fn consumed_lengths(cigar: &str) -> (u64, u64) {
    let mut reference_consumed = 0;
    let mut query_consumed = 0;
    let mut run: u64 = 0;
    let mut have_run = false;

    for c in cigar.chars() {
        if let Some(digit) = c.to_digit(10) {
            run = run * 10 + u64::from(digit);
            have_run = true;
        } else {
            if have_run {
                if CONSUMES_REFERENCE.contains(&c) {
                    reference_consumed += run;
                }
                if CONSUMES_QUERY.contains(&c) {
                    query_consumed += run;
                }
            }
            run = 0;
            have_run = false;
        }
    }

    (reference_consumed, query_consumed)
}

/// Inclusive end coordinate of an alignment starting at `start` (1-based).
///
/// SAM coordinates are 1-based, so a 45 bp match starting at 1 ends at 45.
#[must_use]
pub fn alignment_end(start: u64, reference_consumed: u64) -> u64 {
    (start + reference_consumed).saturating_sub(1)
}
