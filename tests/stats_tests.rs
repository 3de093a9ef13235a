//! End-to-end tests for the stats subcommand.
//!
//! Each test writes a small reference FASTA and SAM fixture into a temporary
//! directory, runs the binary, and checks the summary table it produces.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Two references: contig_1 (100 bp) is well covered, contig_2 (50 bp) only
/// partially. One read never aligns.
fn write_fixture(dir: &TempDir) -> (PathBuf, PathBuf) {
    let fasta_path = dir.path().join("refs.fasta");
    let sam_path = dir.path().join("sample.sam");

    let fasta = format!(">contig_1\n{}\n>contig_2\n{}\n", "A".repeat(100), "C".repeat(50));
    fs::write(&fasta_path, fasta).unwrap();

    let sam = concat!(
        "@HD\tVN:1.6\tSO:unsorted\n",
        "@SQ\tSN:contig_1\tLN:100\n",
        "@SQ\tSN:contig_2\tLN:50\n",
        "read_1\t0\tcontig_1\t1\t60\t99M\t*\t0\t0\t*\t*\n",
        "read_2\t0\tcontig_2\t1\t60\t10M\t*\t0\t0\t*\t*\n",
        "read_3\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*\n",
    );
    fs::write(&sam_path, sam).unwrap();

    (fasta_path, sam_path)
}

#[test]
fn test_stats_writes_summary_table() {
    let dir = TempDir::new().unwrap();
    let (fasta_path, sam_path) = write_fixture(&dir);
    let output_path = dir.path().join("table.csv");

    Command::cargo_bin("covsum")
        .unwrap()
        .args(["stats", "-f"])
        .arg(&fasta_path)
        .arg("-a")
        .arg(&sam_path)
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary table written"));

    let table = fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(
        lines[0],
        "QueryName,RefSequence,ProportionCovered,Coverage,Fragments,FPKM,TPM"
    );
    // Rows are sorted by descending TPM with the UNMAPPED row last.
    assert!(lines[1].starts_with("sample,contig_1,"));
    assert!(lines[2].starts_with("sample,contig_2,"));
    assert!(lines[3].starts_with("sample,UNMAPPED,"));
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_stats_low_coverage_weight_joins_unmapped_row() {
    let dir = TempDir::new().unwrap();
    let (fasta_path, sam_path) = write_fixture(&dir);
    let output_path = dir.path().join("table.csv");

    Command::cargo_bin("covsum")
        .unwrap()
        .args(["stats", "-f"])
        .arg(&fasta_path)
        .arg("-a")
        .arg(&sam_path)
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success();

    let table = fs::read_to_string(&output_path).unwrap();

    // contig_1: 98 of 100 bases covered, one full fragment, all the TPM.
    assert!(table.contains("sample,contig_1,0.980,0.980,1.000,"));
    assert!(table.contains(",1000000.000\n"));
    // contig_2 fell below the 50% coverage threshold and was zeroed; its
    // fragment joined the unmapped read in the pool.
    assert!(table.contains("sample,contig_2,0.180,0.000,0.000,0.000,0.000"));
    assert!(table.contains("sample,UNMAPPED,0.000,0.000,2.000,0.000,0.000"));
}

#[test]
fn test_stats_custom_separator() {
    let dir = TempDir::new().unwrap();
    let (fasta_path, sam_path) = write_fixture(&dir);
    let output_path = dir.path().join("table.tsv");

    Command::cargo_bin("covsum")
        .unwrap()
        .args(["stats", "-f"])
        .arg(&fasta_path)
        .arg("-a")
        .arg(&sam_path)
        .arg("-o")
        .arg(&output_path)
        .args(["-s", "\t"])
        .assert()
        .success();

    let table = fs::read_to_string(&output_path).unwrap();
    assert!(table.starts_with("QueryName\tRefSequence\t"));
}

#[test]
fn test_stats_unknown_reference_is_fatal() {
    let dir = TempDir::new().unwrap();
    let (fasta_path, _) = write_fixture(&dir);

    // Alignment names a sequence absent from the FASTA.
    let sam_path = dir.path().join("other.sam");
    let sam = concat!(
        "@HD\tVN:1.6\tSO:unsorted\n",
        "@SQ\tSN:contig_9\tLN:100\n",
        "read_1\t0\tcontig_9\t1\t60\t50M\t*\t0\t0\t*\t*\n",
    );
    fs::write(&sam_path, sam).unwrap();

    Command::cargo_bin("covsum")
        .unwrap()
        .args(["stats", "-f"])
        .arg(&fasta_path)
        .arg("-a")
        .arg(&sam_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in FASTA"));
}

#[test]
fn test_stats_rejects_non_fasta_reference() {
    let dir = TempDir::new().unwrap();
    let (_, sam_path) = write_fixture(&dir);

    // Valid FASTA content under a non-FASTA extension is rejected up front.
    let refs_path = dir.path().join("refs.txt");
    fs::write(&refs_path, format!(">contig_1\n{}\n", "A".repeat(100))).unwrap();

    Command::cargo_bin("covsum")
        .unwrap()
        .args(["stats", "-f"])
        .arg(&refs_path)
        .arg("-a")
        .arg(&sam_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FASTA"));
}

#[test]
fn test_stats_missing_alignment_file() {
    let dir = TempDir::new().unwrap();
    let (fasta_path, _) = write_fixture(&dir);

    Command::cargo_bin("covsum")
        .unwrap()
        .args(["stats", "-f"])
        .arg(&fasta_path)
        .args(["-a", "does_not_exist.sam"])
        .assert()
        .failure();
}

#[test]
fn test_stats_requires_both_inputs() {
    Command::cargo_bin("covsum")
        .unwrap()
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
