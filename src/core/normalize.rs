//! Multi-pass FPKM/TPM normalization.
//!
//! The passes must run in a strict order: every global denominator is
//! finalized across the whole collection before any per-reference value that
//! depends on it is written. References that retained no mapped weight are
//! skipped (their metrics stay 0) and never contribute to a denominator.

use tracing::debug;

use crate::core::reference::ReferenceCollection;

/// Global sums produced while normalizing; surfaced for run diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizationSums {
    /// Total mapped weight plus the unmapped/discarded pool.
    pub global_mapped_weight: f64,
    /// Sum of fragments-per-kilobase over references with mapped weight.
    pub rpk_sum: f64,
    /// Sum of FPKM over references with mapped weight.
    pub fpkm_sum: f64,
}

/// Annotate every reference with RPK, FPKM and TPM.
///
/// Runs after the low-coverage filter, whose discarded weight is already in
/// the collection's unmapped pool and therefore in the per-million
/// denominator. When no reference retained any weight (`fpkm_sum == 0`) all
/// TPM values stay 0 rather than dividing by zero.
pub fn normalize(references: &mut ReferenceCollection) -> NormalizationSums {
    let mut sums = NormalizationSums {
        global_mapped_weight: references.unmapped_weight()
            + references.iter().map(|r| r.weight_total).sum::<f64>(),
        ..NormalizationSums::default()
    };

    // Pass 1: fragments per kilobase.
    for ref_seq in references.iter_mut().filter(|r| r.weight_total > 0.0) {
        #[allow(clippy::cast_precision_loss)]
        {
            ref_seq.rpk = ref_seq.weight_total / (ref_seq.length as f64 / 1e3);
        }
        sums.rpk_sum += ref_seq.rpk;
    }

    // Pass 2: FPKM against the million-fragment denominator.
    let million_frag_denom = sums.global_mapped_weight / 1e6;
    for ref_seq in references.iter_mut() {
        if ref_seq.weight_total > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            {
                ref_seq.fpkm = (ref_seq.weight_total / ref_seq.length as f64) / million_frag_denom;
            }
        } else {
            ref_seq.fpkm = 0.0;
        }
    }

    // Pass 3: total FPKM of retained references only.
    sums.fpkm_sum = references
        .iter()
        .filter(|r| r.weight_total > 0.0)
        .map(|r| r.fpkm)
        .sum();

    // Pass 4: TPM. fpkm_sum == 0 means nothing was retained; leave TPM at 0.
    if sums.fpkm_sum > 0.0 {
        for ref_seq in references.iter_mut().filter(|r| r.weight_total > 0.0) {
            ref_seq.tpm = 1e6 * ref_seq.fpkm / sums.fpkm_sum;
        }
    }

    debug!(
        global_mapped_weight = sums.global_mapped_weight,
        rpk_sum = sums.rpk_sum,
        fpkm_sum = sums.fpkm_sum,
        "normalization metrics computed"
    );
    sums
}
