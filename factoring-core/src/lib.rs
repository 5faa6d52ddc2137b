//! Shared types and utilities for factorization experiments: exact
//! arbitrary-precision arithmetic helpers, base-digit conversion, and
//! RSA-style semiprime target generation for tests and benchmarks.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

/// RSA test target — a semiprime with known factors for verification.
#[derive(Debug, Clone)]
pub struct RsaTarget {
    pub n: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    pub bit_size: u32,
}

/// Generate a random prime of approximately `bits` bit size.
/// Uses probabilistic primality testing.
pub fn random_prime(bits: u32, rng: &mut impl Rng) -> BigUint {
    assert!(bits >= 2, "Cannot generate a prime with fewer than 2 bits");
    loop {
        let num_bytes = (bits as usize + 7) / 8;
        let mut bytes = vec![0u8; num_bytes];
        rng.fill(&mut bytes[..]);

        // Clear excess high bits so the candidate fits in `bits` bits, then
        // pin the top bit (exact width) and the bottom bit (odd).
        let excess_bits = (num_bytes * 8) as u32 - bits;
        if excess_bits > 0 {
            bytes[0] &= (1u8 << (8 - excess_bits)) - 1;
        }
        let top_bit_in_byte = (bits - 1) % 8;
        bytes[0] |= 1u8 << top_bit_in_byte;
        if let Some(last) = bytes.last_mut() {
            *last |= 0x01;
        }

        let candidate = BigUint::from_bytes_be(&bytes);
        debug_assert!(
            candidate.bits() == bits as u64,
            "Generated number has {} bits, expected {}",
            candidate.bits(),
            bits
        );
        if is_probably_prime(&candidate, 20) {
            return candidate;
        }
    }
}

/// Generate an RSA test target with the given bit size.
pub fn generate_rsa_target(bits: u32, rng: &mut impl Rng) -> RsaTarget {
    let half_bits = bits / 2;
    let p = random_prime(half_bits, rng);
    let q = random_prime(half_bits, rng);
    let n = &p * &q;
    RsaTarget {
        n,
        p,
        q,
        bit_size: bits,
    }
}

/// Miller-Rabin probabilistic primality test.
pub fn is_probably_prime(n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = &one + &one;
    let three = &two + &one;

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as 2^r * d
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut r: u32 = 0;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    let mut rng = rand::thread_rng();

    'witness: for _ in 0..rounds {
        // Random a in [2, n-2]
        let a = loop {
            let bytes = n.to_bytes_be();
            let mut random_bytes = vec![0u8; bytes.len()];
            rng.fill(&mut random_bytes[..]);
            let a = BigUint::from_bytes_be(&random_bytes) % n;
            if a >= two && a <= &n_minus_1 - &one {
                break a;
            }
        };

        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_1 {
            continue 'witness;
        }

        for _ in 0..r - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Represent a number in an arbitrary base, most significant digit first.
pub fn to_base(n: &BigUint, base: u32) -> Vec<u32> {
    let mut digits = to_base_le(n, base);
    digits.reverse();
    digits
}

/// Represent a number in an arbitrary base, least significant digit first.
///
/// This is the order positional carry propagation consumes: index `i` holds
/// the coefficient of `base^i`.
pub fn to_base_le(n: &BigUint, base: u32) -> Vec<u32> {
    assert!(base >= 2, "digit conversion requires base >= 2");
    if n.is_zero() {
        return vec![0];
    }

    let base_big = BigUint::from(base);
    let mut digits = Vec::new();
    let mut remaining = n.clone();

    while !remaining.is_zero() {
        let digit = &remaining % &base_big;
        digits.push(digit.to_u32_digits().first().copied().unwrap_or(0));
        remaining /= &base_big;
    }

    digits
}

/// Integer square root ⌊√n⌋ via Newton's method.
///
/// Exact at every size — no floating point is involved, so the result is
/// safe to use in feasibility comparisons against unbounded integers.
pub fn isqrt(n: &BigUint) -> BigUint {
    if n.is_zero() {
        return BigUint::zero();
    }

    // Start above the root: 2^ceil(bits/2) >= sqrt(n). Newton iteration
    // x_{i+1} = (x_i + n/x_i) / 2 then decreases monotonically to the floor.
    let mut x = BigUint::one() << ((n.bits() as usize + 1) / 2);
    loop {
        let y = (&x + n / &x) >> 1u32;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Memoized powers of a base: `base^0 ..= base^max_exp`.
///
/// Built once per search and never mutated afterwards, so it can be shared
/// by reference across concurrent evaluators.
#[derive(Debug, Clone)]
pub struct PowerCache {
    base: u32,
    powers: Vec<BigUint>,
}

impl PowerCache {
    pub fn new(base: u32, max_exp: usize) -> Self {
        assert!(base >= 2, "power cache requires base >= 2");
        let base_big = BigUint::from(base);
        let mut powers = Vec::with_capacity(max_exp + 1);
        let mut value = BigUint::one();
        for _ in 0..=max_exp {
            powers.push(value.clone());
            value *= &base_big;
        }
        PowerCache { base, powers }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// `base^exp`. Panics if `exp` exceeds the precomputed range.
    pub fn get(&self, exp: usize) -> &BigUint {
        &self.powers[exp]
    }

    pub fn max_exp(&self) -> usize {
        self.powers.len() - 1
    }
}
