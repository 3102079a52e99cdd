// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::errors::{Error, Result};
use rand::{rngs::OsRng, RngCore};
use rand_chacha::{
    rand_core::{RngCore as ChaChaRngCore, SeedableRng},
    ChaCha20Rng,
};
use rug::{
    integer::IsPrime,
    rand::{RandGen, RandState},
    Integer,
};

/// Miller-Rabin repetitions used to accept a probable prime. GMP runs a BPSW
/// test followed by `reps - 24` MR rounds, which keeps the error below 2^-100.
pub const PRIME_REPS: u32 = 50;

struct ChaChaGen(ChaCha20Rng);

impl RandGen for ChaChaGen {
    fn gen(&mut self) -> u32 {
        self.0.next_u32()
    }
}

/// Runs `f` with a GMP random state backed by a fresh ChaCha20 stream seeded
/// from the operating system CSPRNG.
fn with_rand_state<T>(f: impl FnOnce(&mut RandState<'_>) -> T) -> Result<T> {
    let mut seed = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut seed)
        .map_err(|e| Error::RandomSourceFailure(e.to_string()))?;
    let mut generator = ChaChaGen(ChaCha20Rng::from_seed(seed));
    let mut state = RandState::new_custom(&mut generator);
    Ok(f(&mut state))
}

/// Uniform integer in `[0, 2^n)`.
pub fn random_bits(n: u32) -> Result<Integer> {
    with_rand_state(|state| Integer::from(Integer::random_bits(n, state)))
}

/// Uniform integer in `(-2^n, 2^n)`, sampled by rejecting the single value
/// that would make the shifted range asymmetric.
pub fn random_signed_bits(n: u32) -> Result<Integer> {
    let shift = Integer::from(1) << n;
    loop {
        let r = random_bits(n + 1)?;
        if r != 0 {
            return Ok(r - &shift);
        }
    }
}

/// Uniform integer in `[0, bound)`.
pub fn random_below(bound: &Integer) -> Result<Integer> {
    if *bound <= 0 {
        return Err(Error::ArithmeticError("random bound must be positive".to_owned()));
    }
    with_rand_state(|state| Integer::from(bound.random_below_ref(state)))
}

/// Probable prime in `[2^start, 2^start + 2^length)`: a random offset is drawn
/// and the next probable prime after it is taken, retrying when that prime
/// falls outside the range.
pub fn random_prime_in_range(start: u32, length: u32) -> Result<Integer> {
    if length >= start {
        return Err(Error::InvalidParameters(format!(
            "prime range length {} must be smaller than its start {}",
            length, start
        )));
    }
    let lower = Integer::from(1) << start;
    let upper = Integer::from(&lower + (Integer::from(1) << length));
    loop {
        let candidate = (random_bits(length)? + &lower).next_prime();
        if candidate < upper && candidate.is_probably_prime(PRIME_REPS) != IsPrime::No {
            return Ok(candidate);
        }
    }
}

/// Probable prime of exactly `n` bits whose two top bits are set, so that the
/// product of two such primes has exactly `2n` bits.
pub fn random_prime(n: u32) -> Result<Integer> {
    loop {
        let mut p = random_bits(n)?;
        p.set_bit(n - 1, true).set_bit(n - 2, true);
        let p = p.next_prime();
        if p.significant_bits() == n {
            return Ok(p);
        }
    }
}

/// Safe prime `p = 2p' + 1` of `n` bits, returned together with `p'`.
pub fn random_safe_prime(n: u32) -> Result<(Integer, Integer)> {
    loop {
        let pprime = random_prime(n - 1)?;
        let p: Integer = Integer::from(2) * &pprime + 1;
        if p.is_probably_prime(PRIME_REPS) != IsPrime::No {
            return Ok((p, pprime));
        }
    }
}

/// Random quadratic residue modulo `N` that is coprime with it.
pub fn random_qr(N: &Integer) -> Result<Integer> {
    loop {
        let x = random_below(N)?;
        if x > 1 && Integer::from(x.gcd_ref(N)) == 1 {
            return Ok(x.square() % N);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rug::ops::Pow;

    #[test]
    fn random_bits_stays_below_bound() {
        for _ in 0..50 {
            let r = random_bits(130).unwrap();
            assert!(r >= 0);
            assert!(r.significant_bits() <= 130);
        }
    }

    #[test]
    fn random_signed_bits_is_symmetric_and_bounded() {
        let bound = Integer::from(2).pow(40u32);
        let mut saw_negative = false;
        let mut saw_positive = false;
        for _ in 0..200 {
            let r = random_signed_bits(40).unwrap();
            assert!(Integer::from(r.abs_ref()) < bound);
            saw_negative |= r < 0;
            saw_positive |= r > 0;
        }
        assert!(saw_negative && saw_positive, "Error! Signed sampling should produce both signs");
    }

    #[test]
    fn prime_in_range() {
        let start = 300;
        let length = 100;
        let lower = Integer::from(2).pow(start);
        let upper = Integer::from(&lower + Integer::from(2).pow(length));
        for _ in 0..5 {
            let p = random_prime_in_range(start, length).unwrap();
            assert!(p >= lower && p < upper);
            assert_ne!(p.is_probably_prime(PRIME_REPS), IsPrime::No);
        }
    }

    #[test]
    fn prime_range_must_fit() {
        assert!(random_prime_in_range(10, 10).is_err());
    }

    #[test]
    fn safe_prime_structure() {
        let (p, pprime) = random_safe_prime(128).unwrap();
        assert_eq!(p.significant_bits(), 128);
        assert_eq!(p, Integer::from(2) * &pprime + 1);
        assert_ne!(pprime.is_probably_prime(PRIME_REPS), IsPrime::No);
    }

    #[test]
    fn quadratic_residue_is_coprime() {
        let n = Integer::from(1000003u32) * Integer::from(1000033u32);
        let qr = random_qr(&n).unwrap();
        assert_eq!(Integer::from(qr.gcd_ref(&n)), 1);
        assert!(qr < n);
    }
}
