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

use crate::{
    cl::{
        keys::{PublicKey, SecretKey},
        signature::CLSignature,
    },
    errors::Result,
    utils::{
        random::random_below,
        util::{hash_commit, mod_inverse, mod_pow},
    },
};
use rug::Integer;
use serde::{Deserialize, Serialize};

/// Proof by the issuer that `A = Q^(1/e)` was computed correctly, i.e. that it
/// knows `e^-1 mod p'q'`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IssuerProof {
    pub c: Integer,
    pub e_response: Integer,
}

impl IssuerProof {
    pub fn create(
        sk: &SecretKey,
        pk: &PublicKey,
        signature: &CLSignature,
        context: &Integer,
        nonce: &Integer,
    ) -> Result<Self> {
        let N = &pk.N;
        let order = sk.order();
        let Q = mod_pow(&signature.A, &signature.e, N)?;
        let d = mod_inverse(&signature.e, &order)?;

        let e_commit = random_below(&order)?;
        let A_commit = mod_pow(&Q, &e_commit, N)?;

        let c = hash_commit(
            &[context.clone(), Q, signature.A.clone(), nonce.clone(), A_commit],
            false,
        );
        let e_response = (e_commit - Integer::from(&c * &d)) % &order;
        let e_response = if e_response < 0 { e_response + &order } else { e_response };

        Ok(Self { c, e_response })
    }

    pub fn verify(&self, pk: &PublicKey, signature: &CLSignature, context: &Integer, nonce: &Integer) -> bool {
        let N = &pk.N;
        // A_commit = A^(c + e_response * e)
        let exponent = Integer::from(&self.e_response * &signature.e) + &self.c;
        let (Q, A_commit) = match (
            mod_pow(&signature.A, &signature.e, N),
            mod_pow(&signature.A, &exponent, N),
        ) {
            (Ok(Q), Ok(A_commit)) => (Q, A_commit),
            _ => {
                log::debug!("issuer proof reconstruction failed for {}", pk.identifier);
                return false;
            }
        };

        let c = hash_commit(
            &[context.clone(), Q, signature.A.clone(), nonce.clone(), A_commit],
            false,
        );
        if c != self.c {
            log::debug!("issuer proof challenge mismatch for {}", pk.identifier);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cl::keys::test_keypair, utils::random::random_bits};

    fn signed() -> CLSignature {
        let messages = vec![Integer::from(10), Integer::from(20)];
        CLSignature::sign(test_keypair().private_key(), test_keypair().public_key(), &messages).unwrap()
    }

    #[test]
    fn issuer_proof_verifies() {
        let (sk, pk) = (test_keypair().private_key(), test_keypair().public_key());
        let signature = signed();
        let (context, nonce) = (random_bits(256).unwrap(), random_bits(80).unwrap());
        let proof = IssuerProof::create(sk, pk, &signature, &context, &nonce).unwrap();
        assert!(proof.verify(pk, &signature, &context, &nonce));
    }

    #[test]
    fn issuer_proof_is_bound_to_nonce_and_signature() {
        let (sk, pk) = (test_keypair().private_key(), test_keypair().public_key());
        let signature = signed();
        let (context, nonce) = (random_bits(256).unwrap(), random_bits(80).unwrap());
        let proof = IssuerProof::create(sk, pk, &signature, &context, &nonce).unwrap();

        assert!(!proof.verify(pk, &signature, &context, &(nonce.clone() + 1u32)));
        assert!(!proof.verify(pk, &signed(), &context, &nonce));
    }
}
