//! # covsum
//!
//! A library for summarizing read recruitment to reference sequences.
//!
//! Metagenomic and transcriptomic analyses routinely need to know how well a
//! set of reads covers each sequence in a reference FASTA, and how abundant
//! each reference is relative to the others. Raw read counts answer neither
//! question: mates of one fragment must not count twice, a read aligned in
//! ten places must not count ten times, and counts must be scaled by sequence
//! length before references of different sizes can be compared.
//!
//! `covsum` scans a SAM/BAM file into fragment-weighted alignments, folds
//! them into per-reference coverage statistics, drops references that are too
//! sparsely covered to trust, and normalizes the rest into FPKM and TPM.
//!
//! ## Features
//!
//! - **Fragment weighting**: mates share one fragment, multireads split it
//! - **Non-redundant coverage**: overlapping alignments count bases once
//! - **Low-coverage filtering**: sparsely covered references are zeroed and
//!   their weight returned to the unmapped pool
//! - **FPKM/TPM normalization**: per-million denominators include unmapped
//!   and discarded weight, so abundances are comparable across samples
//!
//! ## Example
//!
//! ```rust,no_run
//! use covsum::core::normalize;
//! use covsum::core::reference::ReferenceCollection;
//! use covsum::parsing::{fasta, sam};
//! use std::path::Path;
//!
//! let lengths = fasta::reference_lengths(Path::new("refs.fasta")).unwrap();
//! let mut references = ReferenceCollection::from_lengths(lengths).unwrap();
//!
//! let groups = sam::scan_alignments(Path::new("sample.bam"), false, 0).unwrap();
//! references.accumulate(groups, 10).unwrap();
//! references.filter_low_coverage(50);
//! normalize::normalize(&mut references);
//!
//! for ref_seq in references.iter() {
//!     println!("{}: {:.1} TPM", ref_seq.name, ref_seq.tpm);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: coverage engine, reference statistics, and normalization
//! - [`parsing`]: scanners for FASTA references and SAM/BAM alignments
//! - [`report`]: the tabular summary output
//! - [`cli`]: command-line interface implementation

pub mod cli;
pub mod core;
pub mod parsing;
pub mod report;

// Re-export commonly used types for convenience
pub use crate::core::alignment::{AlignmentRecord, RawAlignment, UNMAPPED};
pub use crate::core::normalize::NormalizationSums;
pub use crate::core::reference::{AlignmentGroups, RefSequence, ReferenceCollection};
pub use crate::report::SummaryRow;
