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

//! Paillier encryption with generator `g = n + 1`, used by a keyshare server to
//! answer a challenge it only receives encrypted.

use crate::{
    errors::{Error, Result},
    utils::{
        random::{random_below, random_prime},
        util::{mod_inverse, mod_pow},
    },
};
use rug::Integer;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EncryptionKey {
    pub n: Integer,
    pub nn: Integer,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DecryptionKey {
    pub ek: EncryptionKey,
    lambda: Integer,
    mu: Integer,
}

impl EncryptionKey {
    pub fn new(n: Integer) -> Self {
        let nn = Integer::from(n.square_ref());
        Self { n, nn }
    }

    /// `(1 + n)^m * r^n mod n^2` for a fresh `r` coprime with `n`.
    pub fn encrypt(&self, m: &Integer) -> Result<Integer> {
        let r = loop {
            let r = random_below(&self.n)?;
            if r > 0 && Integer::from(r.gcd_ref(&self.n)) == 1 {
                break r;
            }
        };
        let gm = (Integer::from(m * &self.n) + 1u32) % &self.nn;
        Ok(gm * mod_pow(&r, &self.n, &self.nn)? % &self.nn)
    }

    /// Product of two ciphertexts, i.e. the encryption of the sum of their plaintexts.
    pub fn add(&self, c1: &Integer, c2: &Integer) -> Integer {
        Integer::from(c1 * c2) % &self.nn
    }

    /// Encryption of `k` times the plaintext of `c`.
    pub fn scale(&self, c: &Integer, k: &Integer) -> Result<Integer> {
        mod_pow(c, k, &self.nn)
    }
}

impl DecryptionKey {
    /// Generates a key whose modulus has exactly `bits` bits.
    pub fn generate(bits: u32) -> Result<Self> {
        let (p, q) = loop {
            let p = random_prime(bits / 2)?;
            let q = random_prime(bits / 2)?;
            if p != q {
                break (p, q);
            }
        };
        Self::from_primes(&p, &q)
    }

    pub fn from_primes(p: &Integer, q: &Integer) -> Result<Self> {
        let n = Integer::from(p * q);
        let lambda = Integer::from(p - 1u32).lcm(&Integer::from(q - 1u32));
        let mu = mod_inverse(&lambda, &n)
            .map_err(|_| Error::KeyGenError("lambda is not invertible modulo n".to_owned()))?;
        Ok(Self {
            ek: EncryptionKey::new(n),
            lambda,
            mu,
        })
    }

    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.ek
    }

    pub fn decrypt(&self, c: &Integer) -> Result<Integer> {
        let ek = &self.ek;
        if *c <= 0 || *c >= ek.nn {
            return Err(Error::ArithmeticError("ciphertext outside Z_{n^2}".to_owned()));
        }
        let u = mod_pow(c, &self.lambda, &ek.nn)?;
        let l = (u - 1u32) / &ek.n;
        Ok(l * &self.mu % &ek.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn key() -> &'static DecryptionKey {
        static KEY: OnceLock<DecryptionKey> = OnceLock::new();
        KEY.get_or_init(|| DecryptionKey::generate(1024).unwrap())
    }

    #[test]
    fn modulus_size() {
        assert_eq!(key().encryption_key().n.significant_bits(), 1024);
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let m = Integer::from(0xdead_beef_u32) << 300u32;
        let c = key().ek.encrypt(&m).unwrap();
        assert_ne!(c, m);
        assert_eq!(key().decrypt(&c).unwrap(), m);
    }

    #[test]
    fn encryption_is_randomized() {
        let m = Integer::from(42);
        let ek = key().encryption_key();
        assert_ne!(ek.encrypt(&m).unwrap(), ek.encrypt(&m).unwrap());
    }

    #[test]
    fn homomorphic_affine_combination() {
        // E(c)^x * E(r) decrypts to r + c*x
        let ek = key().encryption_key();
        let c = Integer::from(1) << 255u32;
        let x = Integer::from(987654321u64);
        let r = Integer::from(1) << 500u32;
        let combined = ek.add(&ek.scale(&ek.encrypt(&c).unwrap(), &x).unwrap(), &ek.encrypt(&r).unwrap());
        assert_eq!(key().decrypt(&combined).unwrap(), r + c * x);
    }

    #[test]
    fn out_of_range_ciphertext() {
        assert!(key().decrypt(&Integer::from(0)).is_err());
        assert!(key().decrypt(&key().ek.nn.clone()).is_err());
    }
}
