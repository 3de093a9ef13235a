//! Coverage-and-normalization engine.
//!
//! This module holds the in-memory data model and the numerical pipeline:
//!
//! - [`cigar`]: CIGAR decoding into reference/query consumed lengths
//! - [`alignment`]: [`AlignmentRecord`](alignment::AlignmentRecord), one
//!   validated mapped read
//! - [`tile`]: interval merging into disjoint coverage tiles
//! - [`reference`]: [`RefSequence`](reference::RefSequence) statistics and the
//!   [`ReferenceCollection`](reference::ReferenceCollection)
//! - [`normalize`]: the four-pass RPK/FPKM/TPM arithmetic
//! - [`error`]: fatal data-integrity conditions
//!
//! The engine is a deterministic, single-threaded batch pipeline over
//! in-memory collections: accumulate per reference, filter low coverage,
//! then normalize in a strict pass order.

pub mod alignment;
pub mod cigar;
pub mod error;
pub mod normalize;
pub mod reference;
pub mod tile;
