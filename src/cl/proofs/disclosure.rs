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

use super::{response_in_range, Challenge, Commitments, ProofBuilder};
use crate::{
    cl::{keys::PublicKey, signature::CLSignature},
    errors::{Error, Result},
    utils::{
        random::{random_bits, random_signed_bits},
        util::{fold_exponent, mod_inverse, mod_pow},
    },
};
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Proof of knowledge of a CL signature over a credential, revealing the attributes
/// at the disclosed indices and hiding the others, the holder secret included.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DisclosureProof {
    pub c: Integer,
    /// Randomized `A` of the signature.
    pub A: Integer,
    pub e_response: Integer,
    pub v_response: Integer,
    pub a_responses: BTreeMap<usize, Integer>,
    pub a_disclosed: BTreeMap<usize, Integer>,
}

impl DisclosureProof {
    pub fn secret_key_response(&self) -> Option<&Integer> {
        self.a_responses.get(&0)
    }

    pub fn disclosed_attributes(&self) -> &BTreeMap<usize, Integer> {
        &self.a_disclosed
    }

    fn correct_response_sizes(&self, pk: &PublicKey) -> bool {
        let params = &pk.params;
        self.a_responses
            .values()
            .all(|r| response_in_range(r, params.l_m_commit))
            && response_in_range(&self.e_response, params.l_e_commit)
    }

    /// The holder secret must be hidden, and every index must be either hidden or
    /// disclosed, under a base of `pk`.
    fn check_indices(&self, pk: &PublicKey) -> Result<()> {
        if !self.a_responses.contains_key(&0) || self.a_disclosed.contains_key(&0) {
            return Err(Error::ProtocolViolation(
                "disclosure proof does not hide the holder secret".to_owned(),
            ));
        }
        if let Some(i) = self.a_disclosed.keys().find(|i| self.a_responses.contains_key(i)) {
            return Err(Error::ProtocolViolation(format!(
                "attribute {} is both disclosed and hidden",
                i
            )));
        }
        if let Some(i) = self
            .a_responses
            .keys()
            .chain(self.a_disclosed.keys())
            .find(|&&i| i >= pk.R.len())
        {
            return Err(Error::MissingKeyMaterial(format!(
                "no base R[{}] in {}",
                i, pk.identifier
            )));
        }
        Ok(())
    }

    fn base(pk: &PublicKey, index: usize) -> Result<&Integer> {
        pk.R.get(index).ok_or_else(|| {
            Error::MissingKeyMaterial(format!("no base R[{}] in {}", index, pk.identifier))
        })
    }

    /// `known = Z / (A^(2^(l_e - 1)) * prod_disclosed R_i^a_i)`
    /// `Z_commit = known^-c * A^e_resp * S^v_resp * prod_hidden R_i^a_resp_i`
    fn reconstruct_Z(&self, pk: &PublicKey) -> Result<Integer> {
        let N = &pk.N;
        let params = &pk.params;

        let mut denominator = mod_pow(&self.A, &(Integer::from(1) << (params.l_e - 1)), N)?;
        for (&i, attribute) in &self.a_disclosed {
            let exp = fold_exponent(attribute, params.l_m);
            denominator = denominator * mod_pow(Self::base(pk, i)?, &exp, N)? % N;
        }
        let known = Integer::from(&pk.Z * mod_inverse(&denominator, N)?) % N;

        let mut Z = mod_pow(&known, &Integer::from(-&self.c), N)?;
        Z = Z * mod_pow(&self.A, &self.e_response, N)? % N;
        Z = Z * mod_pow(&pk.S, &self.v_response, N)? % N;
        for (&i, response) in &self.a_responses {
            Z = Z * mod_pow(Self::base(pk, i)?, response, N)? % N;
        }
        Ok(Z)
    }

    pub fn challenge_contribution(&self, pk: &PublicKey) -> Result<Vec<Integer>> {
        self.check_indices(pk)?;
        Ok(vec![self.A.clone(), self.reconstruct_Z(pk)?])
    }

    pub fn verify_with_challenge(&self, pk: &PublicKey, challenge: &Challenge) -> bool {
        if let Err(e) = self.check_indices(pk) {
            log::debug!("malformed disclosure proof: {}", e);
            return false;
        }
        if !self.correct_response_sizes(pk) {
            log::debug!("disclosure proof response out of range");
            return false;
        }
        if self.c != *challenge.value() {
            log::debug!("disclosure proof challenge mismatch for {}", pk.identifier);
            return false;
        }
        true
    }
}

pub struct DisclosureRandomizers {
    /// Signature randomized for this presentation only.
    signature: CLSignature,
    e: Integer,
    v: Integer,
    attributes: BTreeMap<usize, Integer>,
}

/// Builds disclosure proofs for one credential. The signature is randomized anew
/// with every set of randomizers, so two presentations never share an `A`.
#[derive(Clone, Debug)]
pub struct DisclosureProofBuilder {
    pk: PublicKey,
    signature: CLSignature,
    attributes: Vec<Integer>,
    disclosed: Vec<usize>,
    undisclosed: Vec<usize>,
}

impl DisclosureProofBuilder {
    /// `attributes[0]` is the holder secret and can never be disclosed.
    pub fn new(
        pk: &PublicKey,
        signature: &CLSignature,
        attributes: &[Integer],
        disclosed: &[usize],
    ) -> Result<Self> {
        let mut disclosed = disclosed.to_vec();
        disclosed.sort_unstable();
        disclosed.dedup();
        if let Some(&i) = disclosed.iter().find(|&&i| i == 0 || i >= attributes.len()) {
            return Err(Error::ProtocolViolation(format!(
                "attribute {} cannot be disclosed from a credential with {} attributes",
                i,
                attributes.len()
            )));
        }
        let undisclosed = (0..attributes.len())
            .filter(|i| disclosed.binary_search(i).is_err())
            .collect();

        Ok(Self {
            pk: pk.clone(),
            signature: signature.clone(),
            attributes: attributes.to_vec(),
            disclosed,
            undisclosed,
        })
    }

    pub fn disclosed(&self) -> &[usize] {
        &self.disclosed
    }
}

impl ProofBuilder for DisclosureProofBuilder {
    type Randomizers = DisclosureRandomizers;
    type Proof = DisclosureProof;

    fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    fn generate_randomizers(&self, secret_randomizer: Option<&Integer>) -> Result<Self::Randomizers> {
        let params = &self.pk.params;
        let mut attributes = BTreeMap::new();
        for &i in &self.undisclosed {
            let r = match (i, secret_randomizer) {
                (0, Some(fixed)) => fixed.clone(),
                (0, None) => random_bits(params.l_m_commit)?,
                _ => random_signed_bits(params.l_m_commit)?,
            };
            attributes.insert(i, r);
        }
        Ok(DisclosureRandomizers {
            signature: self.signature.randomize(&self.pk)?,
            e: random_bits(params.l_e_commit)?,
            v: random_bits(params.l_v_commit)?,
            attributes,
        })
    }

    fn calculate_commitments(&self, randomizers: &Self::Randomizers) -> Result<Commitments> {
        let N = &self.pk.N;
        let A = &randomizers.signature.A;

        // Z_commit = A^e_commit * S^v_commit * prod_hidden R_i^r_i
        let mut Z = mod_pow(A, &randomizers.e, N)?;
        Z = Z * mod_pow(&self.pk.S, &randomizers.v, N)? % N;
        for (&i, r) in &randomizers.attributes {
            Z = Z * mod_pow(DisclosureProof::base(&self.pk, i)?, r, N)? % N;
        }

        Ok(Commitments {
            public: A.clone(),
            commit: Z,
        })
    }

    fn create_proof(&self, randomizers: Self::Randomizers, challenge: &Challenge) -> Result<Self::Proof> {
        let c = challenge.value();
        let params = &self.pk.params;

        let DisclosureRandomizers { signature, e, v, attributes } = randomizers;

        let e_prime = Integer::from(&signature.e - (Integer::from(1) << (params.l_e - 1)));
        let e_response = e + c * e_prime;
        let v_response = v + Integer::from(c * &signature.v);

        let mut a_responses = BTreeMap::new();
        for (i, r) in attributes {
            let exp = fold_exponent(&self.attributes[i], params.l_m);
            a_responses.insert(i, r + c * exp);
        }
        let a_disclosed = self
            .disclosed
            .iter()
            .map(|&i| (i, self.attributes[i].clone()))
            .collect();

        Ok(DisclosureProof {
            c: c.clone(),
            A: signature.A,
            e_response,
            v_response,
            a_responses,
            a_disclosed,
        })
    }
}
