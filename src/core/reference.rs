//! Per-reference statistics and the reference collection.
//!
//! A `RefSequence` owns the running statistics for one entry of the reference
//! FASTA. The `ReferenceCollection` maps names to references, folds the
//! grouped alignment stream into them, and tracks the weight of every
//! fragment that ends up excluded (unmapped, short alignment, or removed by
//! the low-coverage filter).

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::core::alignment::{AlignmentRecord, RawAlignment, UNMAPPED};
use crate::core::error::CoreError;
use crate::core::tile::{self, Tile};

/// Grouped alignment stream from the scanner: reference name to ordered raw
/// tuples, plus one pseudo-group keyed [`UNMAPPED`] whose single entry holds
/// the pre-summed weight of all reads that failed to align upstream.
pub type AlignmentGroups = IndexMap<String, Vec<RawAlignment>>;

/// Running statistics for one reference sequence.
#[derive(Debug, Clone)]
pub struct RefSequence {
    pub name: String,
    /// Sequence length in bp; fixed at creation, always positive.
    pub length: u64,
    /// Leftmost observed covered coordinate (initialized to `length`).
    pub leftmost: u64,
    /// Rightmost observed covered coordinate (initialized to 0).
    pub rightmost: u64,
    /// Count of alignment records folded in. Independent of `weight_total`,
    /// which sums fractional fragment weights.
    pub reads_mapped: u64,
    /// Sum of fragment weights.
    pub weight_total: f64,
    /// Redundant, overlap-counting coverage estimate; reporting only.
    pub depth: f64,
    /// True non-redundant coverage proportion in `[0, 1]`.
    pub covered: f64,
    /// Fragments per kilobase of reference sequence.
    pub rpk: f64,
    pub fpkm: f64,
    pub tpm: f64,
    /// Raw mapped intervals, cleared once `depth` and `covered` are derived.
    intervals: Vec<Tile>,
}

impl RefSequence {
    #[must_use]
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
            leftmost: length,
            rightmost: 0,
            reads_mapped: 0,
            weight_total: 0.0,
            depth: 0.0,
            covered: 0.0,
            rpk: 0.0,
            fpkm: 0.0,
            tpm: 0.0,
            intervals: Vec::new(),
        }
    }

    /// Fold one alignment record into the running statistics.
    fn fold(&mut self, record: &AlignmentRecord) {
        self.reads_mapped += 1;
        self.weight_total += record.weight;
        self.leftmost = self.leftmost.min(record.start);
        self.rightmost = self.rightmost.max(record.end);
        self.intervals.push(Tile::from(record));
    }

    /// Derive `depth` and `covered` from the accumulated intervals, then
    /// discard them to bound memory across large alignment streams.
    fn finalize_coverage(&mut self) {
        #[allow(clippy::cast_precision_loss)]
        let length = self.length as f64;

        #[allow(clippy::cast_precision_loss)]
        let bases_mapped: f64 = self
            .intervals
            .iter()
            .map(|t| (t.end - t.start) as f64)
            .sum();
        self.depth = bases_mapped / length;

        self.covered = self.proportion_covered();
        self.intervals.clear();
        self.intervals.shrink_to_fit();
    }

    /// Fraction of the reference covered by at least one interval, counting
    /// overlapping regions once. Zero mapped reads short-circuits to 0.
    #[must_use]
    fn proportion_covered(&self) -> f64 {
        if self.reads_mapped == 0 {
            return 0.0;
        }
        let tiles = tile::merge(self.intervals.clone());
        #[allow(clippy::cast_precision_loss)]
        {
            tile::total_span(&tiles) as f64 / self.length as f64
        }
    }

    /// Zero the statistics of an under-covered reference. `covered` itself
    /// and the observed extent are retained for reporting.
    fn clear_stats(&mut self) {
        self.reads_mapped = 0;
        self.depth = 0.0;
        self.weight_total = 0.0;
        self.rpk = 0.0;
        self.fpkm = 0.0;
        self.tpm = 0.0;
    }
}

/// The full reference set plus the discarded/unmapped weight pool.
#[derive(Debug, Default)]
pub struct ReferenceCollection {
    references: IndexMap<String, RefSequence>,
    unmapped_weight: f64,
}

impl ReferenceCollection {
    /// Build the collection from the FASTA-derived length table.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DuplicateReferenceName` if two entries share a
    /// name.
    pub fn from_lengths<I>(lengths: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut references = IndexMap::new();
        for (name, length) in lengths {
            if references.contains_key(&name) {
                return Err(CoreError::DuplicateReferenceName { name });
            }
            let ref_seq = RefSequence::new(name.clone(), length);
            references.insert(name, ref_seq);
        }
        Ok(Self {
            references,
            unmapped_weight: 0.0,
        })
    }

    /// Fold the grouped alignment stream into per-reference statistics.
    ///
    /// Records whose aligned span falls below `min_aln_percent` of their read
    /// length are excluded and their weight moved to the unmapped pool. Once
    /// a reference's group is folded in, its depth and covered proportion are
    /// derived and its raw interval list is dropped.
    ///
    /// Returns the total mapped weight accumulated.
    ///
    /// # Errors
    ///
    /// `CoreError::ReferenceNotFound` if a group names a reference absent
    /// from the length table; `CoreError::InvalidWeight` per record
    /// validation.
    pub fn accumulate(
        &mut self,
        groups: AlignmentGroups,
        min_aln_percent: u32,
    ) -> Result<f64, CoreError> {
        let mut mapped_weight = 0.0;
        let mut pool = 0.0;

        for (reference_name, raw_alignments) in groups {
            let Some(ref_seq) = self.references.get_mut(&reference_name) else {
                if reference_name == UNMAPPED {
                    pool += raw_alignments.iter().map(|raw| raw.weight).sum::<f64>();
                    continue;
                }
                return Err(CoreError::ReferenceNotFound {
                    name: reference_name,
                });
            };

            for raw in &raw_alignments {
                let record = AlignmentRecord::from_raw(&reference_name, raw)?;

                if record.percent_aligned() < f64::from(min_aln_percent) {
                    pool += record.weight;
                    continue;
                }

                mapped_weight += record.weight;
                ref_seq.fold(&record);
            }

            ref_seq.finalize_coverage();
        }

        self.unmapped_weight += pool;

        debug!(
            mapped_weight,
            unmapped_weight = self.unmapped_weight,
            "alignment stream folded into references"
        );
        Ok(mapped_weight)
    }

    /// Zero out references whose covered proportion falls below
    /// `min_coverage_percent`, returning their weight to the unmapped pool.
    ///
    /// Must run before normalization: the discarded weight changes the
    /// per-million denominators.
    pub fn filter_low_coverage(&mut self, min_coverage_percent: u32) {
        info!(
            threshold = min_coverage_percent,
            "filtering out reference sequences below coverage threshold"
        );
        let mut discarded = 0.0;
        for ref_seq in self.references.values_mut() {
            if 100.0 * ref_seq.covered < f64::from(min_coverage_percent) {
                discarded += ref_seq.weight_total;
                ref_seq.clear_stats();
            }
        }
        self.unmapped_weight += discarded;
        debug!(discarded_weight = discarded, "low-coverage filter applied");
    }

    /// Total weight of fragments excluded from every reference: unmapped
    /// reads, short alignments, and low-coverage discards.
    #[must_use]
    pub fn unmapped_weight(&self) -> f64 {
        self.unmapped_weight
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RefSequence> {
        self.references.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefSequence> {
        self.references.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut RefSequence> {
        self.references.values_mut()
    }
}
