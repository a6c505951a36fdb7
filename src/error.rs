use thiserror::Error;

/// Errors surfaced by the scanner. Nothing is recovered internally; any
/// failure aborts the whole scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The requested range cannot contain any prime. Raised before the scan
    /// starts, so no partial output precedes it.
    #[error("no primes possible in range ({lower}, {upper})")]
    InvalidRange { lower: u64, upper: u64 },

    /// The factorization service was handed a number outside its domain.
    /// Indicates a defect in the caller, not in the input data.
    #[error("factorization rejected input {0}")]
    InvalidInput(u64),
}
