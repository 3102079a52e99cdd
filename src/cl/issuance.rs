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

//! Issuance protocol.
//!
//! 1. The issuer sends a nonce `n1`.
//! 2. The holder commits to its secret in `U = S^v' * R_0^s` and proves knowledge
//!    of `(s, v')` answering `n1`, together with a nonce `n2` of its own.
//! 3. The issuer signs `U` and the attributes blindly and proves, answering
//!    `n2`, that the signature was computed correctly.
//! 4. The holder checks that proof, completes `v = v'' + v'` and verifies the
//!    resulting signature before accepting the credential.

use super::{
    credential::{Credential, DistributedCredential},
    keys::{KeyIdentifier, PublicKey, SecretKey},
    keystore::KeyStore,
    proofs::{
        commitment::{CommitmentProof, CommitmentRandomizers},
        issuer::IssuerProof,
        keyshare::KeyshareCommitments,
        list::{ProofList, ProofListBuilder},
        Challenge, ChallengeDomain, Commitments, Proof, ProofBuilder,
    },
    signature::CLSignature,
};
use crate::{
    errors::{Error, Result},
    utils::{random::random_bits, util::mod_pow},
};
use rug::Integer;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IssueCommitmentMessage {
    pub proofs: ProofList,
    pub nonce2: Integer,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IssueSignatureMessage {
    pub signature: CLSignature,
    pub proof: IssuerProof,
}

pub struct Issuer {
    sk: SecretKey,
    pk: PublicKey,
    context: Integer,
}

impl Issuer {
    pub fn new(sk: SecretKey, pk: PublicKey, context: &Integer) -> Self {
        Self {
            sk,
            pk,
            context: context.clone(),
        }
    }

    /// Issuer for the key `identifier` of `store`.
    pub fn from_store(
        store: &impl KeyStore,
        identifier: &KeyIdentifier,
        sk: SecretKey,
        context: &Integer,
    ) -> Result<Self> {
        let pk = store.public_key(identifier)?.clone();
        if pk.N != Integer::from(&sk.p * &sk.q) {
            return Err(Error::MissingKeyMaterial(format!(
                "secret key does not match the modulus of {}",
                identifier
            )));
        }
        Ok(Self::new(sk, pk, context))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    /// Fresh nonce `n1` for the holder to answer.
    pub fn new_nonce(&self) -> Result<Integer> {
        random_bits(self.pk.params.l_statzk)
    }

    /// Checks the holder commitment proofs against `nonce1` and signs the committed
    /// secret together with `attributes`.
    pub fn issue_signature(
        &self,
        msg: &IssueCommitmentMessage,
        attributes: &[Integer],
        nonce1: &Integer,
    ) -> Result<IssueSignatureMessage> {
        let identifier = &self.pk.identifier;
        let entry = msg
            .proofs
            .entries()
            .iter()
            .find(|e| e.pk.identifier == *identifier && matches!(e.proof, Proof::Commitment(_)))
            .ok_or_else(|| {
                Error::ProtocolViolation(format!("no commitment proof for {}", identifier))
            })?;
        let U = match &entry.proof {
            Proof::Commitment(p) if entry.pk == self.pk => &p.U,
            _ => return Err(Error::IncorrectProofOfCommitment),
        };

        if !msg
            .proofs
            .verify(&self.context, nonce1, ChallengeDomain::Disclosure, true)
        {
            return Err(Error::IncorrectProofOfCommitment);
        }

        let signature = CLSignature::sign_with_commitment(&self.sk, &self.pk, U, attributes)?;
        let proof = IssuerProof::create(&self.sk, &self.pk, &signature, &self.context, &msg.nonce2)?;
        log::info!("issued a signature over {} attributes under {}", attributes.len(), identifier);

        Ok(IssueSignatureMessage { signature, proof })
    }
}

/// Holder side of one issuance.
#[derive(Clone, Debug)]
pub struct CredentialBuilder {
    pk: PublicKey,
    context: Integer,
    secret: Integer,
    v_prime: Integer,
    U: Integer,
    nonce2: Integer,
}

impl CredentialBuilder {
    pub fn new(pk: &PublicKey, context: &Integer, secret: &Integer) -> Result<Self> {
        let params = &pk.params;
        let v_prime = random_bits(params.l_v_prime)?;
        let U = mod_pow(&pk.S, &v_prime, &pk.N)? * mod_pow(&pk.R[0], secret, &pk.N)? % &pk.N;
        Ok(Self {
            pk: pk.clone(),
            context: context.clone(),
            secret: secret.clone(),
            v_prime,
            U,
            nonce2: random_bits(params.l_statzk)?,
        })
    }

    /// Random holder secret of `l_m` bits.
    pub fn new_secret(pk: &PublicKey) -> Result<Integer> {
        random_bits(pk.params.l_m)
    }

    /// The commitment `U = S^v' * R_0^s`.
    pub fn commitment(&self) -> &Integer {
        &self.U
    }

    pub fn nonce2(&self) -> &Integer {
        &self.nonce2
    }

    /// Wraps proofs that include this builder's commitment proof into the message
    /// sent to the issuer.
    pub fn issue_commitment_message(&self, proofs: ProofList) -> IssueCommitmentMessage {
        IssueCommitmentMessage {
            proofs,
            nonce2: self.nonce2.clone(),
        }
    }

    pub fn commit_to_secret_and_prove(&self, nonce1: &Integer) -> Result<IssueCommitmentMessage> {
        let mut builder = ProofListBuilder::new(&self.context, nonce1, ChallengeDomain::Disclosure);
        builder.add_issuance(self)?;
        Ok(self.issue_commitment_message(builder.build()?))
    }

    fn complete_signature(&self, msg: &IssueSignatureMessage) -> Result<CLSignature> {
        if !msg.proof.verify(&self.pk, &msg.signature, &self.context, &self.nonce2) {
            return Err(Error::IncorrectProofOfSignatureCorrectness);
        }
        Ok(CLSignature {
            A: msg.signature.A.clone(),
            e: msg.signature.e.clone(),
            v: Integer::from(&msg.signature.v + &self.v_prime),
        })
    }

    fn exponents(&self, attributes: &[Integer]) -> Vec<Integer> {
        std::iter::once(self.secret.clone())
            .chain(attributes.iter().cloned())
            .collect()
    }

    pub fn construct_credential(&self, msg: &IssueSignatureMessage, attributes: &[Integer]) -> Result<Credential> {
        let signature = self.complete_signature(msg)?;
        let exponents = self.exponents(attributes);
        if !signature.verify(&self.pk, &exponents) {
            return Err(Error::IncorrectAttributeSignature);
        }
        log::info!("constructed credential under {}", self.pk.identifier);
        Ok(Credential::new(self.pk.clone(), exponents, signature))
    }

    /// As [`CredentialBuilder::construct_credential`], for a secret split with the
    /// owners of `public_shares`.
    pub fn construct_distributed_credential(
        &self,
        msg: &IssueSignatureMessage,
        attributes: &[Integer],
        public_shares: &[Integer],
    ) -> Result<DistributedCredential> {
        let signature = self.complete_signature(msg)?;
        let exponents = self.exponents(attributes);
        if !signature.verify_distributed(&self.pk, &exponents, public_shares) {
            return Err(Error::IncorrectAttributeSignature);
        }
        log::info!("constructed distributed credential under {}", self.pk.identifier);
        Ok(DistributedCredential::new(
            Credential::new(self.pk.clone(), exponents, signature),
            public_shares.to_vec(),
        ))
    }
}

impl ProofBuilder for CredentialBuilder {
    type Randomizers = CommitmentRandomizers;
    type Proof = CommitmentProof;

    fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    fn generate_randomizers(&self, secret_randomizer: Option<&Integer>) -> Result<Self::Randomizers> {
        let params = &self.pk.params;
        let secret = match secret_randomizer {
            Some(fixed) => fixed.clone(),
            None => random_bits(params.l_m_commit)?,
        };
        Ok(CommitmentRandomizers {
            secret,
            v_prime: random_bits(params.l_v_prime_commit)?,
        })
    }

    fn calculate_commitments(&self, randomizers: &Self::Randomizers) -> Result<Commitments> {
        let N = &self.pk.N;
        // U_commit = S^v'_commit * R_0^s_commit
        let U_commit = mod_pow(&self.pk.S, &randomizers.v_prime, N)?
            * mod_pow(&self.pk.R[0], &randomizers.secret, N)?
            % N;
        Ok(Commitments {
            public: self.U.clone(),
            commit: U_commit,
        })
    }

    /// The keyshare server public share is part of the committed secret, so both
    /// `U` and its commitment take the server contribution.
    fn merge_keyshare(&self, commitments: Commitments, keyshare: &KeyshareCommitments) -> Commitments {
        let N = &self.pk.N;
        match keyshare.get(&self.pk.identifier) {
            Some(ks) => Commitments {
                public: commitments.public * &ks.public % N,
                commit: commitments.commit * &ks.commit % N,
            },
            None => commitments,
        }
    }

    fn create_proof(&self, randomizers: Self::Randomizers, challenge: &Challenge) -> Result<Self::Proof> {
        let c = challenge.value();
        Ok(CommitmentProof {
            U: self.U.clone(),
            c: c.clone(),
            v_prime_response: randomizers.v_prime + Integer::from(c * &self.v_prime),
            s_response: randomizers.secret + Integer::from(c * &self.secret),
        })
    }
}
