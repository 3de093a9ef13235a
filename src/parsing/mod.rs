//! Scanners for the two input files of a run.
//!
//! This module provides the external collaborators of the coverage engine:
//!
//! - **FASTA files**: scan the reference FASTA into a name -> length table
//! - **SAM/BAM files**: scan alignments into a grouped stream of raw
//!   per-alignment tuples with fragment weights, plus the `UNMAPPED`
//!   pseudo-group aggregating everything that failed to align
//!
//! ## Example
//!
//! ```rust,no_run
//! use covsum::parsing::{fasta, sam};
//! use std::path::Path;
//!
//! let lengths = fasta::reference_lengths(Path::new("refs.fasta")).unwrap();
//! let groups = sam::scan_alignments(Path::new("sample.sam"), false, 0).unwrap();
//! ```

pub mod fasta;
pub mod sam;
