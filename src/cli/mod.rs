//! Command-line interface for covsum.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **stats**: Compute coverage and abundance statistics for a reference
//!   FASTA from a SAM/BAM alignment file
//!
//! ## Usage
//!
//! ```text
//! # Summarize an alignment against its reference FASTA
//! covsum stats -f refs.fasta -a sample.bam
//!
//! # Tab-separated output, keeping multireads
//! covsum stats -f refs.fasta -a sample.sam --multireads -s $'\t' -o sample.tsv
//!
//! # Require mapping quality 30 and 80% reference coverage
//! covsum stats -f refs.fasta -a sample.bam -q 30 -p 80
//! ```

use clap::{Parser, Subcommand};

pub mod stats;

#[derive(Parser)]
#[command(name = "covsum")]
#[command(version)]
#[command(about = "Coverage and abundance statistics for read alignments")]
#[command(
    long_about = "covsum summarizes how reads recruit to a set of reference sequences.\n\nGiven a reference FASTA and a SAM/BAM alignment file it reports, per reference:\n- Proportion of the sequence covered by at least one read\n- Redundant coverage depth\n- Fragment counts weighted by mate pairing and alignment multiplicity\n- FPKM and TPM abundance estimates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute per-reference coverage and abundance statistics
    Stats(stats::StatsArgs),
}
