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

use super::asn1::encode_sequence;
use crate::errors::{Error, Result};
use digest::Digest;
use rug::{integer::Order, Integer};
use sha2::Sha256;

pub trait IntegerExt {
    /// Big-endian magnitude, empty for zero.
    fn to_bytes_be(&self) -> Vec<u8>;
    fn from_bytes_be(bytes: &[u8]) -> Self;
}

impl IntegerExt for Integer {
    fn to_bytes_be(&self) -> Vec<u8> {
        self.to_digits::<u8>(Order::MsfBe)
    }

    fn from_bytes_be(bytes: &[u8]) -> Self {
        Integer::from_digits(bytes, Order::MsfBe)
    }
}

/// SHA-256 digest of `data` read as a non-negative integer.
pub fn hash_to_integer(data: &[u8]) -> Integer {
    let digest = Sha256::digest(data);
    Integer::from_bytes_be(digest.as_slice())
}

/// Attribute values longer than `max_len` bits are replaced by the hash of
/// their magnitude before they are used as exponents.
pub fn fold_exponent(exp: &Integer, max_len: u32) -> Integer {
    if exp.significant_bits() > max_len {
        hash_to_integer(&exp.to_bytes_be())
    } else {
        exp.clone()
    }
}

/// `base^exp mod modulus`, accepting negative exponents when `base` is invertible.
pub fn mod_pow(base: &Integer, exp: &Integer, modulus: &Integer) -> Result<Integer> {
    base.pow_mod_ref(exp, modulus)
        .map(Integer::from)
        .ok_or_else(|| Error::ArithmeticError("base is not invertible modulo n".to_owned()))
}

pub fn mod_inverse(value: &Integer, modulus: &Integer) -> Result<Integer> {
    value
        .invert_ref(modulus)
        .map(Integer::from)
        .ok_or_else(|| Error::ArithmeticError("value is not invertible".to_owned()))
}

/// `prod bases[i]^exps[i] mod modulus`, folding over-long exponents through SHA-256.
pub fn represent_to_bases(
    bases: &[Integer],
    exps: &[Integer],
    modulus: &Integer,
    max_message_length: u32,
) -> Result<Integer> {
    if exps.len() > bases.len() {
        return Err(Error::MissingKeyMaterial(format!(
            "{} exponents but only {} bases",
            exps.len(),
            bases.len()
        )));
    }
    let mut r = Integer::from(1);
    for (base, exp) in bases.iter().zip(exps.iter()) {
        let exp = fold_exponent(exp, max_message_length);
        r = (r * mod_pow(base, &exp, modulus)?) % modulus;
    }
    Ok(r)
}

/// Hash of the DER encoding of `values`, optionally marked as a signature.
pub fn hash_commit(values: &[Integer], signature_marker: bool) -> Integer {
    let preimage = encode_sequence(values, signature_marker);
    log::trace!("challenge preimage {}", hex::encode(&preimage));
    hash_to_integer(&preimage)
}
