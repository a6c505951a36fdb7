//! Record prime gap detection and per-gap ratio computation.
//!
//! A gap between consecutive primes is a record when it is strictly larger
//! than every gap seen earlier in the scan. For each record two summaries are
//! computed: the classical Cramér ratio gap / ln²(p) and the compression
//! ratio q_w, the total log-volume of the gap's interior composites divided
//! by the total logarithm of the union of their radicals.
//! Reference: <https://en.wikipedia.org/wiki/Prime_gap>

use std::collections::BTreeSet;

use crate::error::ScanError;
use crate::factor::radical_factors;
use crate::sieve::PrimeSequencer;

/// One record gap, read-only once emitted. Fields are in the reporting
/// order: lower prime, gap magnitude, squared logarithm of the lower prime,
/// Cramér ratio, compression ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct GapRecord {
    pub lower_prime: u64,
    pub gap: u64,
    pub log_p_squared: f64,
    pub cramer_ratio: f64,
    pub q_w: f64,
}

/// The scan state machine: the previous prime and the running maximum gap.
///
/// The analyzer owns no I/O and no clock, so feeding it the same prime
/// sequence always reproduces the same records.
#[derive(Debug, Clone)]
pub struct GapAnalyzer {
    last_prime: u64,
    max_gap: u64,
}

impl GapAnalyzer {
    /// Start a scan seeded at the prime 2, with no record yet.
    pub fn new() -> Self {
        GapAnalyzer {
            last_prime: 2,
            max_gap: 0,
        }
    }

    /// The largest gap seen so far, 0 before the first prime is consumed.
    pub fn max_gap(&self) -> u64 {
        self.max_gap
    }

    /// Consume the next prime of the sequence. Returns the record emitted by
    /// this step, if any; `last_prime` advances unconditionally.
    pub fn advance(&mut self, p: u64) -> Result<Option<GapRecord>, ScanError> {
        debug_assert!(p > self.last_prime);
        let gap = p - self.last_prime;

        let record = if gap > self.max_gap {
            self.max_gap = gap;

            let log_p = (self.last_prime as f64).ln();
            let log_p_squared = log_p * log_p;
            let cramer_ratio = gap as f64 / log_p_squared;

            // aggregate the interior composites, with a factor set scoped to
            // this one record
            let mut total_log_vol = 0.0;
            let mut gap_factors: BTreeSet<u64> = BTreeSet::new();
            for composite in (self.last_prime + 1)..p {
                total_log_vol += (composite as f64).ln();
                gap_factors.extend(radical_factors(composite)?);
            }

            let total_log_rad: f64 = gap_factors.iter().map(|&f| (f as f64).ln()).sum();
            let q_w = if total_log_rad > 0.0 {
                total_log_vol / total_log_rad
            } else {
                1.0 // degenerate case: the gap has no interior composites
            };

            Some(GapRecord {
                lower_prime: self.last_prime,
                gap,
                log_p_squared,
                cramer_ratio,
                q_w,
            })
        } else {
            None
        };

        self.last_prime = p;
        Ok(record)
    }
}

impl Default for GapAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan all primes below `limit`, streaming every record gap to `sink` in
/// detection order. Returns the final maximum gap. The limit is validated
/// before any scanning starts.
pub fn scan_gaps<F>(limit: u64, mut sink: F) -> Result<u64, ScanError>
where
    F: FnMut(&GapRecord),
{
    let mut analyzer = GapAnalyzer::new();
    for p in PrimeSequencer::new(limit)? {
        if let Some(record) = analyzer.advance(p)? {
            log::debug!(
                "record gap {} after prime {} (q_w {:.4})",
                record.gap,
                record.lower_prime,
                record.q_w
            );
            sink(&record);
        }
    }
    log::debug!("scan below {} complete, max gap {}", limit, analyzer.max_gap());
    Ok(analyzer.max_gap())
}

/// Scan all primes below `limit` and collect the record gaps in order.
pub fn scan_records(limit: u64) -> Result<Vec<GapRecord>, ScanError> {
    let mut records = Vec::new();
    scan_gaps(limit, |record| records.push(record.clone()))?;
    Ok(records)
}
