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

//! Schnorr proofs of knowledge over the CL public key bases.
//!
//! Every proof kind is produced in three phases by a [`ProofBuilder`]: random
//! commitments to the hidden secrets, a Fiat-Shamir challenge hashed over those
//! commitments, and the responses `randomizer + challenge * secret`. Splitting the
//! phases lets [`list::ProofListBuilder`] answer one joint challenge with several
//! proofs, and lets a keyshare server contribute to a proof it only partly knows.

pub mod commitment;
pub mod disclosure;
pub mod issuer;
pub mod keyshare;
pub mod list;

use self::{
    commitment::CommitmentProof, disclosure::DisclosureProof, issuer::IssuerProof,
    keyshare::{KeyshareCommitments, KeyshareProof},
};
use super::keys::PublicKey;
use crate::{
    errors::{Error, Result},
    utils::util::hash_commit,
};
use rug::Integer;
use serde::{Deserialize, Serialize};

/// Hash domain of a challenge. Proofs over signed messages are hashed with a
/// leading marker so that they can never be replayed as disclosures, and vice versa.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ChallengeDomain {
    Signature,
    Disclosure,
}

impl ChallengeDomain {
    pub fn is_signature(self) -> bool {
        matches!(self, Self::Signature)
    }
}

/// `hash(context, contributions..., nonce)` in the given domain.
pub fn create_challenge(
    context: &Integer,
    nonce: &Integer,
    contributions: &[Integer],
    domain: ChallengeDomain,
) -> Integer {
    let mut values = Vec::with_capacity(contributions.len() + 2);
    values.push(context.clone());
    values.extend_from_slice(contributions);
    values.push(nonce.clone());
    hash_commit(&values, domain.is_signature())
}

/// A challenge tagged with where it came from: hashed here over commitments the
/// caller holds, or handed over by another party (a bound list, a holder asking a
/// keyshare server to respond).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Challenge {
    Recomputed(Integer),
    Supplied(Integer),
}

impl Challenge {
    pub fn recomputed(
        context: &Integer,
        nonce: &Integer,
        contributions: &[Integer],
        domain: ChallengeDomain,
    ) -> Self {
        Self::Recomputed(create_challenge(context, nonce, contributions, domain))
    }

    pub fn supplied(value: Integer) -> Self {
        Self::Supplied(value)
    }

    pub fn value(&self) -> &Integer {
        match self {
            Self::Recomputed(c) | Self::Supplied(c) => c,
        }
    }

    pub fn is_supplied(&self) -> bool {
        matches!(self, Self::Supplied(_))
    }
}

/// Public value and commitment a proof contributes to its challenge, in hash order.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Commitments {
    pub public: Integer,
    pub commit: Integer,
}

impl Commitments {
    pub fn to_vec(&self) -> Vec<Integer> {
        vec![self.public.clone(), self.commit.clone()]
    }
}

pub trait ProofBuilder {
    /// Randomizers of one proof run. They are moved into [`ProofBuilder::create_proof`]
    /// and are not `Clone`, so one set can answer at most one challenge.
    type Randomizers;
    type Proof;

    fn public_key(&self) -> &PublicKey;

    /// Draws one randomizer per hidden secret, using `secret_randomizer` for the
    /// holder secret when given.
    fn generate_randomizers(&self, secret_randomizer: Option<&Integer>) -> Result<Self::Randomizers>;

    fn calculate_commitments(&self, randomizers: &Self::Randomizers) -> Result<Commitments>;

    /// Folds the keyshare server commitment for this key, if any, into `commitments`.
    fn merge_keyshare(&self, commitments: Commitments, keyshare: &KeyshareCommitments) -> Commitments {
        let pk = self.public_key();
        match keyshare.get(&pk.identifier) {
            Some(ks) => Commitments {
                public: commitments.public,
                commit: commitments.commit * &ks.commit % &pk.N,
            },
            None => commitments,
        }
    }

    fn create_proof(&self, randomizers: Self::Randomizers, challenge: &Challenge) -> Result<Self::Proof>;
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Proof {
    Commitment(CommitmentProof),
    Issuer(IssuerProof),
    Disclosure(DisclosureProof),
    Keyshare(KeyshareProof),
}

impl Proof {
    pub fn challenge(&self) -> &Integer {
        match self {
            Self::Commitment(p) => &p.c,
            Self::Issuer(p) => &p.c,
            Self::Disclosure(p) => &p.c,
            Self::Keyshare(p) => &p.c,
        }
    }

    /// Response for the holder secret, the value bound proofs must agree on.
    pub fn secret_key_response(&self) -> Option<&Integer> {
        match self {
            Self::Commitment(p) => Some(&p.s_response),
            Self::Disclosure(p) => p.secret_key_response(),
            Self::Keyshare(p) => Some(&p.s_response),
            Self::Issuer(_) => None,
        }
    }

    pub fn challenge_contribution(&self, pk: &PublicKey) -> Result<Vec<Integer>> {
        match self {
            Self::Commitment(p) => p.challenge_contribution(pk),
            Self::Disclosure(p) => p.challenge_contribution(pk),
            Self::Keyshare(p) => p.challenge_contribution(pk),
            Self::Issuer(_) => Err(Error::ProtocolViolation(
                "issuer proofs do not contribute to a joint challenge".to_owned(),
            )),
        }
    }

    pub fn verify_with_challenge(&self, pk: &PublicKey, challenge: &Challenge) -> bool {
        match self {
            Self::Commitment(p) => p.verify_with_challenge(pk, challenge),
            Self::Disclosure(p) => p.verify_with_challenge(pk, challenge),
            Self::Keyshare(p) => p.verify_with_challenge(pk, challenge),
            Self::Issuer(_) => false,
        }
    }

    /// Verifies the proof on its own. Issuer proofs need the signature they are
    /// about and are checked with [`IssuerProof::verify`] instead.
    pub fn verify(&self, pk: &PublicKey, context: &Integer, nonce: &Integer, domain: ChallengeDomain) -> bool {
        match self.challenge_contribution(pk) {
            Ok(contributions) => {
                let challenge = Challenge::recomputed(context, nonce, &contributions, domain);
                self.verify_with_challenge(pk, &challenge)
            }
            Err(e) => {
                log::debug!("cannot reconstruct the challenge contribution: {}", e);
                false
            }
        }
    }
}

impl From<CommitmentProof> for Proof {
    fn from(p: CommitmentProof) -> Self {
        Self::Commitment(p)
    }
}

impl From<IssuerProof> for Proof {
    fn from(p: IssuerProof) -> Self {
        Self::Issuer(p)
    }
}

impl From<DisclosureProof> for Proof {
    fn from(p: DisclosureProof) -> Self {
        Self::Disclosure(p)
    }
}

impl From<KeyshareProof> for Proof {
    fn from(p: KeyshareProof) -> Self {
        Self::Keyshare(p)
    }
}

/// `|response| <= 2^(bits + 1) - 1`
pub(crate) fn response_in_range(response: &Integer, bits: u32) -> bool {
    let maximum = (Integer::from(1) << (bits + 1)) - 1u32;
    Integer::from(response.abs_ref()) <= maximum
}
