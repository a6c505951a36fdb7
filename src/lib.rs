mod error;
mod factor;
mod scan;
mod sieve;

pub use error::ScanError;
pub use factor::{factorize, is_prime, radical, radical_factors};
pub use scan::{scan_gaps, scan_records, GapAnalyzer, GapRecord};
pub use sieve::PrimeSequencer;
