//! Interval merging for non-redundant coverage.
//!
//! The raw intervals accumulated for a reference overlap freely; true
//! coverage counts each covered base once. Merging reduces them to a minimal
//! set of disjoint tiles with a sort-then-sweep pass.

use crate::core::alignment::AlignmentRecord;

/// A merged genomic interval. Closed coordinates; `weight` is the sum of all
/// contributing fragment weights. Tiles only live for the duration of one
/// reference's coverage computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub start: u64,
    pub end: u64,
    pub weight: f64,
}

impl Tile {
    #[must_use]
    pub fn new(start: u64, end: u64, weight: f64) -> Self {
        Self { start, end, weight }
    }

    /// Widen this tile to cover `other`, summing weights.
    fn absorb(&mut self, other: &Tile) {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
        self.weight += other.weight;
    }

    /// Closed-interval overlap: touching tiles (e.g. `[0,100]` and
    /// `[100,150]`) count as overlapping and must merge.
    #[must_use]
    pub fn overlaps(&self, other: &Tile) -> bool {
        (self.start <= other.start && other.start <= self.end)
            || (self.start <= other.end && other.end <= self.end)
            || (other.start <= self.start && self.start <= other.end)
            || (other.start <= self.end && self.end <= other.end)
    }
}

impl From<&AlignmentRecord> for Tile {
    fn from(record: &AlignmentRecord) -> Self {
        Self::new(record.start, record.end, record.weight)
    }
}

/// Merge an unordered set of closed intervals into a minimal set of disjoint
/// tiles.
///
/// Sorts by start and sweeps once, folding each interval into the top of the
/// output whenever it overlaps (touching included). A single sweep reaches
/// the fixed point: after sorting, any interval that transitively connects
/// two tiles is seen between them. The result is independent of the input
/// order.
#[must_use]
pub fn merge(mut intervals: Vec<Tile>) -> Vec<Tile> {
    intervals.sort_unstable_by_key(|tile| (tile.start, tile.end));

    let mut merged: Vec<Tile> = Vec::with_capacity(intervals.len());
    for tile in intervals {
        match merged.last_mut() {
            Some(top) if top.overlaps(&tile) => top.absorb(&tile),
            _ => merged.push(tile),
        }
    }
    merged
}

/// Total number of bases spanned by a set of disjoint tiles.
#[must_use]
pub fn total_span(tiles: &[Tile]) -> u64 {
    tiles.iter().map(|tile| tile.end - tile.start).sum()
}
