//! Lazy prime generation over a bounded half-open range.

use bitvec::bitvec;

use crate::error::ScanError;

/// Number of odd candidates sieved per segment.
const SEGMENT_BITS: u64 = 1 << 16;

/// A lazy, strictly increasing stream of the primes p with `lower < p < upper`.
///
/// The stream is single-pass and not restartable; build a fresh sequencer to
/// scan the range again. Primes are produced by an odd-only segmented bit
/// sieve, so memory stays bounded by one segment regardless of the range.
pub struct PrimeSequencer {
    base: Vec<u64>,    // primes up to sqrt(upper), used to mark segments
    pending: Vec<u64>, // primes of the current segment, in increasing order
    cursor: usize,
    segment_low: u64, // first odd candidate of the next segment
    upper: u64,
}

impl PrimeSequencer {
    /// The scan range used by the gap analyzer: primes p with `2 < p < upper`.
    /// The seed prime 2 is never yielded.
    pub fn new(upper: u64) -> Result<Self, ScanError> {
        Self::with_lower(2, upper)
    }

    /// Primes p with `lower < p < upper` (both bounds exclusive).
    pub fn with_lower(lower: u64, upper: u64) -> Result<Self, ScanError> {
        if upper <= 2 || upper <= lower {
            return Err(ScanError::InvalidRange { lower, upper });
        }

        let base = simple_sieve(num_integer::sqrt(upper) + 1);
        log::debug!(
            "sequencer for ({}, {}): {} base primes",
            lower,
            upper,
            base.len()
        );

        let mut pending = Vec::new();
        if lower < 2 {
            pending.push(2);
        }
        // first odd candidate above the lower bound
        let start = (lower + 1).max(3) | 1;
        Ok(PrimeSequencer {
            base,
            pending,
            cursor: 0,
            segment_low: start,
            upper,
        })
    }

    fn sieve_segment(&mut self) {
        let low = self.segment_low;
        let high = self.upper.min(low.saturating_add(2 * SEGMENT_BITS));
        let count = ((high - low + 1) / 2) as usize;

        let mut mask = bitvec![0; count];
        for &p in &self.base {
            if p == 2 {
                continue; // even candidates are never sieved
            }
            if p.saturating_mul(p) >= high {
                break;
            }
            let mut multi = p * p;
            if multi < low {
                multi = ((low + p - 1) / p) * p;
                if multi & 1 == 0 {
                    multi += p; // start from an odd multiple
                }
            }
            while multi < high {
                mask.set(((multi - low) / 2) as usize, true);
                multi += 2 * p;
            }
        }

        self.pending.clear();
        self.pending
            .extend(mask.iter_zeros().map(|i| low + 2 * i as u64));
        self.cursor = 0;
        self.segment_low = high | 1;
    }
}

impl Iterator for PrimeSequencer {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if self.cursor < self.pending.len() {
                let p = self.pending[self.cursor];
                self.cursor += 1;
                return Some(p);
            }
            if self.segment_low >= self.upper {
                return None;
            }
            self.sieve_segment();
        }
    }
}

/// Eager sieve of Eratosthenes returning all primes below `bound`, used for
/// the base primes of the segmented pass.
fn simple_sieve(bound: u64) -> Vec<u64> {
    if bound <= 2 {
        return Vec::new();
    }
    let mut primes = vec![2];
    let count = ((bound - 2) / 2) as usize; // odd candidates 3, 5, ... < bound

    let mut mask = bitvec![0; count];
    for i in 0..count {
        if mask[i] {
            continue;
        }
        let p = 3 + 2 * i as u64;
        if p.saturating_mul(p) >= bound {
            break;
        }
        let mut multi = p * p;
        while multi < bound {
            mask.set(((multi - 3) / 2) as usize, true);
            multi += 2 * p;
        }
    }

    primes.extend(mask.iter_zeros().map(|i| 3 + 2 * i as u64));
    primes
}
