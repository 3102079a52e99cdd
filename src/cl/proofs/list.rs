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
    commitment::CommitmentRandomizers,
    create_challenge,
    disclosure::{DisclosureProofBuilder, DisclosureRandomizers},
    keyshare::{KeyshareCommitments, KeyshareProof},
    Challenge, ChallengeDomain, Commitments, Proof, ProofBuilder,
};
use crate::{
    cl::{
        issuance::CredentialBuilder,
        keys::{KeyIdentifier, PublicKey},
    },
    errors::{Error, Result},
    utils::random::random_bits,
};
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::collections::{hash_map::Entry, HashMap};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ProofListEntry {
    pub proof: Proof,
    pub pk: PublicKey,
}

/// Proofs presented together, each with the public key it verifies under.
///
/// A list is *bound* when all its proofs answer one joint challenge hashed over
/// every proof's commitments and, within each group of keys sharing a keyshare
/// server (or none), prove the same holder secret. Bound proofs cannot be split
/// off and replayed alongside proofs from another session.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ProofList {
    domain: ChallengeDomain,
    entries: Vec<ProofListEntry>,
}

impl ProofList {
    pub fn new(domain: ChallengeDomain) -> Self {
        Self {
            domain,
            entries: Vec::new(),
        }
    }

    pub fn domain(&self) -> ChallengeDomain {
        self.domain
    }

    pub fn entries(&self) -> &[ProofListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends `proof`. Issuer and keyshare proofs cannot be part of a list: the
    /// former is checked against a signature, the latter is merged into the holder
    /// proofs with [`ProofList::merge_keyshare_proofs`].
    pub fn push(&mut self, proof: Proof, pk: PublicKey) -> Result<()> {
        match proof {
            Proof::Issuer(_) => Err(Error::ProtocolViolation(
                "an issuer proof cannot be part of a proof list".to_owned(),
            )),
            Proof::Keyshare(_) => Err(Error::ProtocolViolation(
                "keyshare proofs are merged into a proof list, not added to it".to_owned(),
            )),
            proof => {
                self.entries.push(ProofListEntry { proof, pk });
                Ok(())
            }
        }
    }

    fn joint_challenge(&self, context: &Integer, nonce: &Integer, domain: ChallengeDomain) -> Result<Integer> {
        let mut contributions = Vec::with_capacity(2 * self.entries.len());
        for entry in &self.entries {
            contributions.extend(entry.proof.challenge_contribution(&entry.pk)?);
        }
        Ok(create_challenge(context, nonce, &contributions, domain))
    }

    fn is_bound_to(&self, joint: &Integer) -> bool {
        if self.entries.iter().any(|entry| entry.proof.challenge() != joint) {
            log::debug!("proofs do not share the joint challenge");
            return false;
        }

        let mut responses: HashMap<Option<&str>, &Integer> = HashMap::new();
        for entry in &self.entries {
            let Some(response) = entry.proof.secret_key_response() else {
                log::debug!("proof under {} has no secret key response", entry.pk.identifier);
                return false;
            };
            match responses.entry(entry.pk.keyshare_server.as_deref()) {
                Entry::Occupied(e) if *e.get() != response => {
                    log::debug!("secret key responses differ under {}", entry.pk.identifier);
                    return false;
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(e) => {
                    e.insert(response);
                }
            }
        }
        true
    }

    pub fn is_bound(&self, context: &Integer, nonce: &Integer) -> bool {
        match self.joint_challenge(context, nonce, self.domain) {
            Ok(joint) => self.is_bound_to(&joint),
            Err(e) => {
                log::debug!("cannot reconstruct the joint challenge: {}", e);
                false
            }
        }
    }

    pub fn verify(&self, context: &Integer, nonce: &Integer, domain: ChallengeDomain, should_be_bound: bool) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        if domain != self.domain {
            log::debug!("proof list built for {:?}, verified as {:?}", self.domain, domain);
            return false;
        }

        let joint = match self.joint_challenge(context, nonce, domain) {
            Ok(joint) => joint,
            Err(e) => {
                log::debug!("cannot reconstruct the joint challenge: {}", e);
                return false;
            }
        };
        let bound = self.is_bound_to(&joint);
        if should_be_bound && !bound {
            log::debug!("proof list is not bound");
            return false;
        }

        let joint = Challenge::Recomputed(joint);
        self.entries.iter().all(|entry| {
            if bound {
                entry.proof.verify_with_challenge(&entry.pk, &joint)
            } else {
                entry.proof.verify(&entry.pk, context, nonce, domain)
            }
        })
    }

    /// Returns a copy of this list where the keyshare server responses, found by
    /// issuer key, are added to the holder secret responses. A commitment proof
    /// also takes the server public share into its `U`.
    pub fn merge_keyshare_proofs(&self, proofs: &HashMap<KeyIdentifier, KeyshareProof>) -> Result<Self> {
        let mut merged = self.clone();
        for entry in &mut merged.entries {
            let Some(ks) = proofs.get(&entry.pk.identifier) else {
                continue;
            };
            if ks.encrypted {
                return Err(Error::ProtocolViolation(format!(
                    "keyshare response for {} is still encrypted",
                    entry.pk.identifier
                )));
            }
            match &mut entry.proof {
                Proof::Commitment(p) => {
                    p.U = Integer::from(&p.U * &ks.P) % &entry.pk.N;
                    p.s_response += &ks.s_response;
                }
                Proof::Disclosure(p) => match p.a_responses.get_mut(&0) {
                    Some(response) => *response += &ks.s_response,
                    None => {
                        return Err(Error::ProtocolViolation(
                            "disclosure proof has no secret key response".to_owned(),
                        ))
                    }
                },
                Proof::Issuer(_) | Proof::Keyshare(_) => {}
            }
        }
        Ok(merged)
    }
}

enum ListedBuilder<'a> {
    Disclosure(&'a DisclosureProofBuilder),
    Issuance(&'a CredentialBuilder),
}

enum ListedRandomizers {
    Disclosure(DisclosureRandomizers),
    Issuance(CommitmentRandomizers),
}

impl ListedBuilder<'_> {
    fn public_key(&self) -> &PublicKey {
        match self {
            Self::Disclosure(b) => b.public_key(),
            Self::Issuance(b) => b.public_key(),
        }
    }

    fn commit(
        &self,
        secret_randomizer: &Integer,
        keyshare: &KeyshareCommitments,
    ) -> Result<(ListedRandomizers, Commitments)> {
        match self {
            Self::Disclosure(b) => {
                let r = b.generate_randomizers(Some(secret_randomizer))?;
                let commitments = b.merge_keyshare(b.calculate_commitments(&r)?, keyshare);
                Ok((ListedRandomizers::Disclosure(r), commitments))
            }
            Self::Issuance(b) => {
                let r = b.generate_randomizers(Some(secret_randomizer))?;
                let commitments = b.merge_keyshare(b.calculate_commitments(&r)?, keyshare);
                Ok((ListedRandomizers::Issuance(r), commitments))
            }
        }
    }

    fn respond(&self, randomizers: ListedRandomizers, challenge: &Challenge) -> Result<Proof> {
        match (self, randomizers) {
            (Self::Disclosure(b), ListedRandomizers::Disclosure(r)) => Ok(b.create_proof(r, challenge)?.into()),
            (Self::Issuance(b), ListedRandomizers::Issuance(r)) => Ok(b.create_proof(r, challenge)?.into()),
            _ => Err(Error::ProtocolViolation(
                "randomizers do not belong to this builder".to_owned(),
            )),
        }
    }
}

/// Collects the builders of proofs to be bound under one challenge: any number of
/// disclosures and at most one issuance commitment.
pub struct ProofListBuilder<'a> {
    context: Integer,
    nonce: Integer,
    domain: ChallengeDomain,
    builders: Vec<ListedBuilder<'a>>,
}

impl<'a> ProofListBuilder<'a> {
    pub fn new(context: &Integer, nonce: &Integer, domain: ChallengeDomain) -> Self {
        Self {
            context: context.clone(),
            nonce: nonce.clone(),
            domain,
            builders: Vec::new(),
        }
    }

    pub fn add_disclosure(&mut self, builder: &'a DisclosureProofBuilder) -> &mut Self {
        self.builders.push(ListedBuilder::Disclosure(builder));
        self
    }

    pub fn add_issuance(&mut self, builder: &'a CredentialBuilder) -> Result<&mut Self> {
        if self.builders.iter().any(|b| matches!(b, ListedBuilder::Issuance(_))) {
            return Err(Error::ProtocolViolation(
                "a proof list can bind at most one issuance".to_owned(),
            ));
        }
        self.builders.push(ListedBuilder::Issuance(builder));
        Ok(self)
    }

    /// Commits every builder with one shared secret randomizer and hashes the joint
    /// challenge, after folding in the keyshare server commitments.
    pub fn commit(self, keyshare: &KeyshareCommitments) -> Result<CommittedProofList<'a>> {
        let Some(bits) = self
            .builders
            .iter()
            .map(|b| b.public_key().params.l_m_commit)
            .max()
        else {
            return Err(Error::ProtocolViolation("no proofs to commit to".to_owned()));
        };
        let secret_randomizer = random_bits(bits)?;

        let mut randomizers = Vec::with_capacity(self.builders.len());
        let mut contributions = Vec::with_capacity(2 * self.builders.len());
        for builder in &self.builders {
            let (r, commitments) = builder.commit(&secret_randomizer, keyshare)?;
            randomizers.push(r);
            contributions.extend(commitments.to_vec());
        }
        let challenge = Challenge::recomputed(&self.context, &self.nonce, &contributions, self.domain);
        log::trace!("joint challenge over {} proofs", self.builders.len());

        Ok(CommittedProofList {
            domain: self.domain,
            builders: self.builders,
            randomizers,
            challenge,
        })
    }

    pub fn build(self) -> Result<ProofList> {
        if self.builders.is_empty() {
            return Ok(ProofList::new(self.domain));
        }
        self.commit(&KeyshareCommitments::new())?.respond()
    }
}

/// A list whose commitments are fixed and whose joint challenge is known, waiting
/// for the responses.
pub struct CommittedProofList<'a> {
    domain: ChallengeDomain,
    builders: Vec<ListedBuilder<'a>>,
    randomizers: Vec<ListedRandomizers>,
    challenge: Challenge,
}

impl CommittedProofList<'_> {
    pub fn challenge(&self) -> &Integer {
        self.challenge.value()
    }

    pub fn respond(self) -> Result<ProofList> {
        let mut list = ProofList::new(self.domain);
        for (builder, randomizers) in self.builders.iter().zip(self.randomizers) {
            let proof = builder.respond(randomizers, &self.challenge)?;
            list.push(proof, builder.public_key().clone())?;
        }
        Ok(list)
    }
}
