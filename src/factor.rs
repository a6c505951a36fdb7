//! Exact integer factorization and the radical operations built on it.
//!
//! Everything here is pure integer arithmetic; the floating-point logarithms
//! taken downstream rely on these prime values being exact.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;

use num_integer::Integer;
use num_modular::{ModularCoreOps, ModularPow, ModularUnaryOps};
use rand::random;

use crate::error::ScanError;

/// All primes below 256, used for trial division and small-input lookups.
const SMALL_PRIMES: [u8; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Strong probable prime test (Miller-Rabin) to the given base.
fn is_sprp(target: u64, base: u64) -> bool {
    // write target - 1 = 2^shift * u with u odd
    let tm1 = target - 1;
    let shift = tm1.trailing_zeros();
    let u = tm1 >> shift;

    let mut x = base.powm(u, &target);
    if x == 1 || x == tm1 {
        return true;
    }
    for _ in 0..shift {
        x = x.sqm(&target);
        if x == tm1 {
            return true;
        }
    }
    x == 1
}

/// Deterministic primality test for u64 integers, based on Miller-Rabin tests
/// with fixed witness sets per integer width.
pub fn is_prime(target: u64) -> bool {
    // shortcuts
    if target < 2 {
        return false;
    }
    if target & 1 == 0 {
        return target == 2;
    }

    if let Ok(u) = u8::try_from(target) {
        return SMALL_PRIMES.binary_search(&u).is_ok();
    }

    // The collection of witnesses are from http://miller-rabin.appspot.com/
    if let Ok(u) = u16::try_from(target) {
        // 2, 3 for u16 range
        return is_sprp(u as u64, 2) && is_sprp(u as u64, 3);
    }
    if let Ok(u) = u32::try_from(target) {
        // 2, 7, 61 for u32 range
        return is_sprp(u as u64, 2) && is_sprp(u as u64, 7) && is_sprp(u as u64, 61);
    }

    const WITNESS64: [u64; 7] = [2, 325, 9375, 28178, 450775, 9780504, 1795265022];
    WITNESS64.iter().all(|&x| is_sprp(target, x))
}

/// Find factors by trial division, returning the found factors and the
/// residual. The residual is Ok(1) or Ok(p) with p prime if the target was
/// fully factored, otherwise Err with the unfactored remainder.
fn trial_division<I: Iterator<Item = u64>>(
    primes: I,
    target: u64,
) -> (BTreeMap<u64, usize>, Result<u64, u64>) {
    let mut residual = target;
    let mut result = BTreeMap::new();
    let mut factored = false;
    for p in primes {
        if p * p > residual {
            factored = true;
            break;
        }
        while residual % p == 0 {
            residual /= p;
            *result.entry(p).or_insert(0) += 1;
        }
        if residual == 1 {
            factored = true;
            break;
        }
    }
    if factored {
        (result, Ok(residual))
    } else {
        (result, Err(residual))
    }
}

/// Find a proper factor using Pollard's rho algorithm with Brent's loop
/// detection. Returns None when the iteration cycles without meeting one.
fn pollard_rho(target: u64, start: u64, offset: u64) -> Option<u64> {
    let mut a = start;
    let mut b = start;
    // Brent's loop detection, i = tortoise, j = hare
    let (mut i, mut j) = (1usize, 2usize);
    loop {
        i += 1;
        a = a.sqm(&target).addm(offset, &target);
        if a == b {
            return None;
        }
        let diff = if b > a { b - a } else { a - b }; // abs_diff
        let d = diff.gcd(&target);
        if 1 < d && d < target {
            return Some(d);
        }
        if i == j {
            b = a;
            j <<= 1;
        }
    }
}

/// Complete prime factorization of a u64 integer, as a map from prime factor
/// to multiplicity. Fails with [ScanError::InvalidInput] for targets below 2.
pub fn factorize(target: u64) -> Result<BTreeMap<u64, usize>, ScanError> {
    if target < 2 {
        return Err(ScanError::InvalidInput(target));
    }

    // quick check on factors of 2
    let f2 = target.trailing_zeros() as usize;
    let target = target >> f2;
    let mut result = BTreeMap::new();
    if f2 > 0 {
        result.insert(2, f2);
    }
    if target == 1 {
        return Ok(result);
    }
    if is_prime(target) {
        result.insert(target, 1);
        return Ok(result);
    }

    // trial division using the small prime table, skipping the stripped 2
    let piter = SMALL_PRIMES.iter().skip(1).map(|&p| p as u64);
    let (factors, trial) = trial_division(piter, target);
    result.extend(factors);
    let residual = match trial {
        Ok(1) => return Ok(result),
        Ok(p) => {
            *result.entry(p).or_insert(0) += 1;
            return Ok(result);
        }
        Err(res) => res,
    };

    // then split the residual with Pollard's rho until fully factored
    let mut todo = vec![residual];
    while let Some(target) = todo.pop() {
        if is_prime(target) {
            *result.entry(target).or_insert(0) += 1;
        } else {
            let divisor = loop {
                let start = random::<u64>() % target;
                let offset = random::<u64>() % target;
                if let Some(d) = pollard_rho(target, start, offset) {
                    break d;
                }
            };
            todo.push(divisor);
            todo.push(target / divisor);
        }
    }
    Ok(result)
}

/// The set of distinct prime divisors of the target. Empty for targets
/// below 2.
pub fn radical_factors(target: u64) -> Result<BTreeSet<u64>, ScanError> {
    if target <= 1 {
        return Ok(BTreeSet::new());
    }
    Ok(factorize(target)?.into_iter().map(|(p, _)| p).collect())
}

/// The radical of the target: the product of its distinct prime divisors.
/// Defined as 1 for targets below 2.
/// Reference: <https://en.wikipedia.org/wiki/Radical_of_an_integer>
pub fn radical(target: u64) -> Result<u64, ScanError> {
    Ok(radical_factors(target)?.into_iter().product())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::FromIterator;

    #[test]
    fn is_prime_test() {
        // test small primes
        for x in 2..255 {
            assert_eq!(SMALL_PRIMES.contains(&(x as u8)), is_prime(x));
        }
        assert!(!is_prime(0));
        assert!(!is_prime(1));

        // some large primes
        assert!(is_prime(6469693333));
        assert!(is_prime(480194653));
        assert!(!is_prime(20074069));
        assert!(is_prime(8718775377449));
        assert!(is_prime(3315293452192821991));
        assert!(!is_prime(8651776913431));

        // products of two primes are rejected
        assert!(!is_prime(104729 * 104723));
    }

    #[test]
    fn pollard_rho_test() {
        assert!(matches!(pollard_rho(8051, 2, 1), Some(d) if d == 97 || d == 83));
        let d = loop {
            let start = random::<u64>() % 455459;
            if let Some(d) = pollard_rho(455459, start, 1) {
                break d;
            }
        };
        assert!(d == 743 || d == 613);
    }

    #[test]
    fn factorize_test() {
        // some known cases
        let fac123456789 = BTreeMap::from_iter([(3, 2), (3607, 1), (3803, 1)]);
        assert_eq!(factorize(123456789).unwrap(), fac123456789);

        let fac5040 = BTreeMap::from_iter([(2, 4), (3, 2), (5, 1), (7, 1)]);
        assert_eq!(factorize(5040).unwrap(), fac5040);

        assert_eq!(factorize(2).unwrap(), BTreeMap::from_iter([(2, 1)]));

        // inputs below 2 are outside the service's domain
        assert_eq!(factorize(0), Err(ScanError::InvalidInput(0)));
        assert_eq!(factorize(1), Err(ScanError::InvalidInput(1)));

        // multiplying the factorization back must reproduce the target
        for n in 2..2000u64 {
            let prod: u64 = factorize(n)
                .unwrap()
                .iter()
                .map(|(&p, &exp)| p.pow(exp as u32))
                .product();
            assert_eq!(n, prod, "factorization check failed for {}", n);
        }
        for _ in 0..50 {
            let n = random::<u64>() >> 16 | 2; // keep rho fast, avoid 0/1
            let fac = factorize(n).unwrap();
            let mut prod = 1u64;
            for (p, exp) in fac {
                assert!(is_prime(p), "non-prime factor {} of {}", p, n);
                prod *= p.pow(exp as u32);
            }
            assert_eq!(n, prod);
        }
    }

    #[test]
    fn radical_test() {
        // degenerate inputs
        assert!(radical_factors(0).unwrap().is_empty());
        assert!(radical_factors(1).unwrap().is_empty());
        assert_eq!(radical(0).unwrap(), 1);
        assert_eq!(radical(1).unwrap(), 1);

        // known values
        assert_eq!(radical(2).unwrap(), 2);
        assert_eq!(radical(8).unwrap(), 2);
        assert_eq!(radical(12).unwrap(), 6);
        assert_eq!(radical(5040).unwrap(), 210);
        assert_eq!(radical(123456789).unwrap(), 41152263);
        assert_eq!(
            radical_factors(360).unwrap(),
            BTreeSet::from_iter([2, 3, 5])
        );
    }

    #[test]
    fn radical_divides_and_is_square_free() {
        for n in 2..2000u64 {
            let factors = radical_factors(n).unwrap();
            assert!(!factors.is_empty());
            for &f in &factors {
                assert!(is_prime(f));
                assert_eq!(n % f, 0, "{} does not divide {}", f, n);
            }
            let rad = radical(n).unwrap();
            assert_eq!(n % rad, 0, "radical {} does not divide {}", rad, n);
            for &f in &factors {
                assert_ne!(rad % (f * f), 0, "radical of {} not square-free", n);
            }
        }
    }
}
