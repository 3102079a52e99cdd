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

use super::keys::{PublicKey, SecretKey};
use crate::{
    errors::{Error, Result},
    utils::{
        random::{random_bits, random_prime_in_range},
        util::{mod_inverse, mod_pow, represent_to_bases},
    },
};
use rug::Integer;
use serde::{Deserialize, Serialize};

/// CL signature `(A, e, v)` with `Z = A^e * S^v * prod R_i^m_i mod n`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CLSignature {
    pub A: Integer,
    pub e: Integer,
    pub v: Integer,
}

impl CLSignature {
    /// Signs `messages` on the bases `R[0], R[1], ...`.
    pub fn sign(sk: &SecretKey, pk: &PublicKey, messages: &[Integer]) -> Result<Self> {
        if messages.len() > pk.R.len() {
            return Err(Error::MissingKeyMaterial(format!(
                "{} messages but key {} only has {} bases",
                messages.len(),
                pk.identifier,
                pk.R.len()
            )));
        }
        sign_message_block(sk, pk, &pk.R, &Integer::from(1), messages)
    }

    /// Blind form used during issuance: `U` already carries the holder secret on
    /// `R[0]`, so `messages` are signed on `R[1], R[2], ...`.
    pub fn sign_with_commitment(
        sk: &SecretKey,
        pk: &PublicKey,
        U: &Integer,
        messages: &[Integer],
    ) -> Result<Self> {
        if messages.len() + 1 > pk.R.len() {
            return Err(Error::MissingKeyMaterial(format!(
                "{} attributes but key {} only supports {}",
                messages.len(),
                pk.identifier,
                pk.max_attributes()
            )));
        }
        sign_message_block(sk, pk, &pk.R[1..], U, messages)
    }

    pub fn verify(&self, pk: &PublicKey, messages: &[Integer]) -> bool {
        self.verify_distributed(pk, messages, &[])
    }

    /// Verifies a signature issued over a secret split between the holder, whose
    /// share is `messages[0]`, and parties whose public shares `R[0]^x` are given.
    pub fn verify_distributed(
        &self,
        pk: &PublicKey,
        messages: &[Integer],
        public_shares: &[Integer],
    ) -> bool {
        let params = &pk.params;
        let start = Integer::from(1) << (params.l_e - 1);
        let end = Integer::from(&start + (Integer::from(1) << (params.l_e_prime - 1)));
        if self.e < start || self.e > end {
            log::debug!("signature exponent e outside its interval");
            return false;
        }
        if messages.len() > pk.R.len() {
            log::debug!("more messages than bases in {}", pk.identifier);
            return false;
        }

        match self.reconstruct_Z(pk, messages, public_shares) {
            Ok(Z) if Z == pk.Z => true,
            Ok(_) => {
                log::debug!("signature does not match the messages under {}", pk.identifier);
                false
            }
            Err(e) => {
                log::debug!("signature verification failed: {}", e);
                false
            }
        }
    }

    fn reconstruct_Z(
        &self,
        pk: &PublicKey,
        messages: &[Integer],
        public_shares: &[Integer],
    ) -> Result<Integer> {
        let N = &pk.N;
        let mut Q = represent_to_bases(&pk.R, messages, N, pk.params.l_m)?;
        for share in public_shares {
            Q = Q * share % N;
        }
        Q = Q * mod_pow(&self.A, &self.e, N)? % N;
        Ok(Q * mod_pow(&pk.S, &self.v, N)? % N)
    }

    /// Returns an equivalent signature `(A * S^r, e, v - e*r)` for a fresh random `r`,
    /// unlinkable to this one.
    pub fn randomize(&self, pk: &PublicKey) -> Result<Self> {
        let r = random_bits(pk.params.l_r_a)?;
        let A = Integer::from(&self.A * mod_pow(&pk.S, &r, &pk.N)?) % &pk.N;
        let v = Integer::from(&self.v - Integer::from(&self.e * &r));
        Ok(Self {
            A,
            e: self.e.clone(),
            v,
        })
    }
}

fn sign_message_block(
    sk: &SecretKey,
    pk: &PublicKey,
    bases: &[Integer],
    U: &Integer,
    messages: &[Integer],
) -> Result<CLSignature> {
    let params = &pk.params;
    let N = &pk.N;
    let R = represent_to_bases(bases, messages, N, params.l_m)?;

    let e = random_prime_in_range(params.l_e - 1, params.l_e_prime - 1)?;
    let v = random_bits(params.l_v - 1)? + (Integer::from(1) << (params.l_v - 1));

    // Q = Z / (S^v * R * U)
    let denominator = mod_pow(&pk.S, &v, N)? * R % N * U % N;
    let Q = Integer::from(&pk.Z * mod_inverse(&denominator, N)?) % N;

    let e_inverse = mod_inverse(&e, &sk.order())?;
    let A = mod_pow(&Q, &e_inverse, N)?;

    Ok(CLSignature { A, e, v })
}
