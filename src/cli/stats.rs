use std::path::PathBuf;

use clap::Args;

use crate::core::normalize;
use crate::core::reference::ReferenceCollection;
use crate::parsing;
use crate::report;

#[derive(Args)]
pub struct StatsArgs {
    /// Reference FASTA the reads were aligned against (.fa/.fasta/.fna,
    /// optionally gzip compressed)
    #[arg(short = 'f', long = "ref-fasta", required = true)]
    pub ref_fasta: PathBuf,

    /// Alignment file (SAM or BAM)
    #[arg(short = 'a', long = "alignments", required = true)]
    pub alignments: PathBuf,

    /// Minimum percentage of a read that must be aligned for the alignment
    /// to count (0-100)
    #[arg(short = 'l', long = "aln-percent", default_value = "10", value_parser = clap::value_parser!(u32).range(0..=100))]
    pub aln_percent: u32,

    /// Minimum percentage of a reference sequence that must be covered for
    /// its reads to be retained (0-100)
    #[arg(short = 'p', long = "seq-coverage", default_value = "50", value_parser = clap::value_parser!(u32).range(0..=100))]
    pub seq_coverage: u32,

    /// Minimum mapping quality; alignments below it are treated as unmapped
    #[arg(short = 'q', long = "map-quality", default_value = "0")]
    pub map_quality: u8,

    /// Keep secondary and supplementary alignments, splitting each mate's
    /// weight across its alignments
    #[arg(long)]
    pub multireads: bool,

    /// Output table path
    #[arg(short = 'o', long = "output", default_value = "./covsum_table.csv")]
    pub output: PathBuf,

    /// Field separator for the output table
    #[arg(short = 's', long = "sep", default_value = ",")]
    pub sep: String,
}

/// Execute the stats subcommand: scan both inputs, fold alignments into
/// per-reference coverage, filter, normalize, and write the summary table.
///
/// # Errors
///
/// Returns an error if either input cannot be parsed, the alignment stream
/// references an unknown sequence, or the output file cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: StatsArgs, verbose: bool) -> anyhow::Result<()> {
    if !parsing::fasta::is_fasta_file(&args.ref_fasta) {
        anyhow::bail!(
            "'{}' does not look like a FASTA file (expected .fa/.fasta/.fna, optionally gzip compressed)",
            args.ref_fasta.display()
        );
    }

    let lengths = parsing::fasta::reference_lengths(&args.ref_fasta)?;
    let mut references = ReferenceCollection::from_lengths(lengths)?;

    if verbose {
        eprintln!(
            "Loaded {} reference sequences from {}",
            references.len(),
            args.ref_fasta.display()
        );
    }

    let groups = parsing::sam::scan_alignments(&args.alignments, args.multireads, args.map_quality)?;

    let mapped_weight = references.accumulate(groups, args.aln_percent)?;
    references.filter_low_coverage(args.seq_coverage);
    let sums = normalize::normalize(&mut references);

    if verbose {
        let retained = references.iter().filter(|r| r.weight_total > 0.0).count();
        eprintln!(
            "Mapped weight {mapped_weight:.3}, unmapped/discarded {:.3}, {retained} of {} references retained",
            references.unmapped_weight(),
            references.len(),
        );
        eprintln!("Global fragment denominator: {:.3}", sums.global_mapped_weight);
    }

    let sample = report::sample_label(&args.alignments);
    let rows = report::summary_rows(&references, &sample);
    report::write_table(&args.output, &rows, &args.sep)?;

    println!("Summary table written to {}", args.output.display());
    Ok(())
}
