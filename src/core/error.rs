use thiserror::Error;

/// Fatal data-integrity errors raised by the coverage engine.
///
/// All variants abort the run: there is no partial-result mode. Each carries
/// enough context to name the offending reference or read in the diagnostic.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Two references share a name during collection construction.
    #[error("duplicate reference sequence names encountered: {name}")]
    DuplicateReferenceName { name: String },

    /// An alignment names a reference absent from the FASTA-derived length
    /// table (and it is not the UNMAPPED sentinel).
    #[error("reference sequence from alignment file not found in FASTA: {name}")]
    ReferenceNotFound { name: String },

    /// A non-UNMAPPED alignment record carries a fragment weight above 1.0.
    #[error("weight for '{query}' is greater than 1 ({weight})")]
    InvalidWeight { query: String, weight: f64 },
}
