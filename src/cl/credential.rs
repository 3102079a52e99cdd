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

use super::{
    keys::PublicKey,
    proofs::{
        disclosure::{DisclosureProof, DisclosureProofBuilder},
        Challenge, ChallengeDomain, ProofBuilder,
    },
    signature::CLSignature,
};
use crate::errors::Result;
use rug::Integer;
use serde::{Deserialize, Serialize};

/// A signed attribute vector held by its owner. `attributes[0]` is the holder secret.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Credential {
    pub pk: PublicKey,
    pub attributes: Vec<Integer>,
    pub signature: CLSignature,
}

impl Credential {
    pub fn new(pk: PublicKey, attributes: Vec<Integer>, signature: CLSignature) -> Self {
        Self {
            pk,
            attributes,
            signature,
        }
    }

    pub fn secret(&self) -> Option<&Integer> {
        self.attributes.first()
    }

    pub fn verify(&self) -> bool {
        self.signature.verify(&self.pk, &self.attributes)
    }

    pub fn create_disclosure_proof_builder(&self, disclosed: &[usize]) -> Result<DisclosureProofBuilder> {
        DisclosureProofBuilder::new(&self.pk, &self.signature, &self.attributes, disclosed)
    }

    /// Standalone disclosure proof, not bound to any other proof.
    pub fn create_disclosure_proof(
        &self,
        disclosed: &[usize],
        context: &Integer,
        nonce: &Integer,
        domain: ChallengeDomain,
    ) -> Result<DisclosureProof> {
        let builder = self.create_disclosure_proof_builder(disclosed)?;
        let randomizers = builder.generate_randomizers(None)?;
        let commitments = builder.calculate_commitments(&randomizers)?;
        let challenge = Challenge::recomputed(context, nonce, &commitments.to_vec(), domain);
        builder.create_proof(randomizers, &challenge)
    }
}

/// Credential whose holder secret is split with keyshare servers: `attributes[0]`
/// is only the holder share, the others are known through their public shares.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DistributedCredential {
    pub credential: Credential,
    pub public_shares: Vec<Integer>,
}

impl DistributedCredential {
    pub fn new(credential: Credential, public_shares: Vec<Integer>) -> Self {
        Self {
            credential,
            public_shares,
        }
    }

    pub fn verify(&self) -> bool {
        let c = &self.credential;
        c.signature.verify_distributed(&c.pk, &c.attributes, &self.public_shares)
    }

    /// Disclosure proofs of a distributed credential only verify once the keyshare
    /// server responses have been merged in.
    pub fn create_disclosure_proof_builder(&self, disclosed: &[usize]) -> Result<DisclosureProofBuilder> {
        self.credential.create_disclosure_proof_builder(disclosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cl::keys::test_keypair, utils::random::random_bits};

    fn credential() -> Credential {
        let (sk, pk) = (test_keypair().private_key(), test_keypair().public_key());
        let attributes: Vec<Integer> = [1u32, 2, 3, 4].iter().map(|m| Integer::from(*m)).collect();
        let signature = CLSignature::sign(sk, pk, &attributes).unwrap();
        Credential::new(pk.clone(), attributes, signature)
    }

    #[test]
    fn standalone_disclosure() {
        let credential = credential();
        assert!(credential.verify());
        let (context, nonce) = (random_bits(256).unwrap(), random_bits(80).unwrap());
        let proof = credential
            .create_disclosure_proof(&[1, 2], &context, &nonce, ChallengeDomain::Disclosure)
            .unwrap();
        let pk = &credential.pk;
        let verify = |p: &DisclosureProof, context: &Integer, nonce: &Integer| {
            crate::cl::proofs::Proof::from(p.clone()).verify(pk, context, nonce, ChallengeDomain::Disclosure)
        };

        assert!(verify(&proof, &context, &nonce));
        assert!(!verify(&proof, &context, &(nonce.clone() + 1u32)));
        assert!(!verify(&proof, &(context.clone() + 1u32), &nonce));

        let mut altered = proof.clone();
        altered.a_disclosed.insert(2, Integer::from(5));
        assert!(!verify(&altered, &context, &nonce));
    }
}
