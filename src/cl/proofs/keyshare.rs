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

use super::{Challenge, Commitments, ProofBuilder};
use crate::{
    cl::{
        keys::{KeyIdentifier, PublicKey},
        paillier::{DecryptionKey, EncryptionKey},
    },
    errors::{Error, Result},
    utils::{random::random_bits, util::mod_pow},
};
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Challenges longer than this are taken to be Paillier ciphertexts instead of
/// hash outputs.
///
/// NOTE: the encrypted mode is recognised by length alone. A ciphertext shorter
/// than the threshold (probability about 2^-47 under a 1024-bit Paillier modulus)
/// is answered in the clear, so callers should check `KeyshareProof::encrypted`.
pub const ENCRYPTED_CHALLENGE_MIN_BITS: u32 = 2000;

/// Commitments `(P, P_commit)` of a keyshare server, per issuer key.
#[derive(Clone, Debug, Default)]
pub struct KeyshareCommitments(HashMap<KeyIdentifier, Commitments>);

impl KeyshareCommitments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: KeyIdentifier, commitments: Commitments) {
        self.0.insert(identifier, commitments);
    }

    pub fn get(&self, identifier: &KeyIdentifier) -> Option<&Commitments> {
        self.0.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Proof of knowledge of the server share `x` of a split holder secret, `P = R_0^x`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct KeyshareProof {
    pub P: Integer,
    pub c: Integer,
    pub s_response: Integer,
    /// `s_response` is a Paillier ciphertext of the response.
    pub encrypted: bool,
}

impl KeyshareProof {
    /// `P_commit = R_0^s * P^-c`
    fn reconstruct_P_commit(&self, pk: &PublicKey) -> Result<Integer> {
        let N = &pk.N;
        let R0s = mod_pow(&pk.R[0], &self.s_response, N)?;
        Ok(R0s * mod_pow(&self.P, &Integer::from(-&self.c), N)? % N)
    }

    pub fn challenge_contribution(&self, pk: &PublicKey) -> Result<Vec<Integer>> {
        if self.encrypted {
            return Err(Error::ProtocolViolation(
                "encrypted keyshare response must be decrypted first".to_owned(),
            ));
        }
        Ok(vec![self.P.clone(), self.reconstruct_P_commit(pk)?])
    }

    pub fn verify_with_challenge(&self, pk: &PublicKey, challenge: &Challenge) -> bool {
        if self.encrypted {
            log::debug!("cannot verify an encrypted keyshare response for {}", pk.identifier);
            return false;
        }
        if self.c != *challenge.value() {
            log::debug!("keyshare proof challenge mismatch for {}", pk.identifier);
            return false;
        }
        true
    }

    /// Decrypts an encrypted response into the plain proof for `challenge`, the
    /// plaintext of the encrypted challenge the server answered.
    pub fn decrypt_response(&self, dk: &DecryptionKey, challenge: &Integer) -> Result<Self> {
        if !self.encrypted {
            return Err(Error::ProtocolViolation("keyshare response is not encrypted".to_owned()));
        }
        Ok(Self {
            P: self.P.clone(),
            c: challenge.clone(),
            s_response: dk.decrypt(&self.s_response)?,
            encrypted: false,
        })
    }
}

pub struct KeyshareRandomizers {
    r: Integer,
}

/// Prover side of a keyshare server holding `secret` for credentials under `pk`.
#[derive(Clone, Debug)]
pub struct KeyshareProofBuilder {
    pk: PublicKey,
    secret: Integer,
    encryption_key: Option<EncryptionKey>,
}

impl KeyshareProofBuilder {
    pub fn new(pk: &PublicKey, secret: &Integer) -> Self {
        Self {
            pk: pk.clone(),
            secret: secret.clone(),
            encryption_key: None,
        }
    }

    /// Key used to answer encrypted challenges.
    pub fn with_encryption_key(mut self, ek: EncryptionKey) -> Self {
        self.encryption_key = Some(ek);
        self
    }

    /// `P = R_0^secret`
    pub fn public_share(&self) -> Result<Integer> {
        mod_pow(&self.pk.R[0], &self.secret, &self.pk.N)
    }
}

impl ProofBuilder for KeyshareProofBuilder {
    type Randomizers = KeyshareRandomizers;
    type Proof = KeyshareProof;

    fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    /// The randomizer is non-negative so that it can be encrypted as a Paillier plaintext.
    fn generate_randomizers(&self, secret_randomizer: Option<&Integer>) -> Result<Self::Randomizers> {
        let r = match secret_randomizer {
            Some(fixed) if *fixed < 0 => {
                return Err(Error::ProtocolViolation(
                    "keyshare randomizer must be non-negative".to_owned(),
                ))
            }
            Some(fixed) => fixed.clone(),
            None => random_bits(self.pk.params.l_m_commit)?,
        };
        Ok(KeyshareRandomizers { r })
    }

    fn calculate_commitments(&self, randomizers: &Self::Randomizers) -> Result<Commitments> {
        Ok(Commitments {
            public: self.public_share()?,
            commit: mod_pow(&self.pk.R[0], &randomizers.r, &self.pk.N)?,
        })
    }

    fn create_proof(&self, randomizers: Self::Randomizers, challenge: &Challenge) -> Result<Self::Proof> {
        let c = challenge.value();
        let P = self.public_share()?;

        if c.significant_bits() > ENCRYPTED_CHALLENGE_MIN_BITS {
            let ek = self.encryption_key.as_ref().ok_or_else(|| {
                Error::ProtocolViolation("encrypted challenge but no encryption key".to_owned())
            })?;
            // E(c)^x * E(r) = E(r + c*x)
            let s_response = ek.add(&ek.scale(c, &self.secret)?, &ek.encrypt(&randomizers.r)?);
            return Ok(KeyshareProof {
                P,
                c: c.clone(),
                s_response,
                encrypted: true,
            });
        }

        Ok(KeyshareProof {
            P,
            c: c.clone(),
            s_response: randomizers.r + Integer::from(c * &self.secret),
            encrypted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cl::{
        keys::test_keypair,
        proofs::{ChallengeDomain, Proof},
    };

    fn builder() -> KeyshareProofBuilder {
        let secret = random_bits(256).unwrap();
        KeyshareProofBuilder::new(test_keypair().public_key(), &secret)
    }

    #[test]
    fn plain_keyshare_proof_verifies() {
        let pk = test_keypair().public_key();
        let builder = builder();
        let (context, nonce) = (random_bits(256).unwrap(), random_bits(80).unwrap());
        let randomizers = builder.generate_randomizers(None).unwrap();
        let commitments = builder.calculate_commitments(&randomizers).unwrap();
        let challenge = Challenge::recomputed(&context, &nonce, &commitments.to_vec(), ChallengeDomain::Disclosure);
        let proof = builder.create_proof(randomizers, &challenge).unwrap();

        assert!(!proof.encrypted);
        assert_eq!(proof.challenge_contribution(pk).unwrap(), commitments.to_vec());
        assert!(Proof::from(proof).verify(pk, &context, &nonce, ChallengeDomain::Disclosure));
    }

    #[test]
    fn encrypted_challenge_needs_key() {
        let builder = builder();
        let randomizers = builder.generate_randomizers(None).unwrap();
        let long = Challenge::supplied(Integer::from(1) << 2047u32);
        assert!(matches!(
            builder.create_proof(randomizers, &long),
            Err(Error::ProtocolViolation(_))
        ));
    }

    #[test]
    fn negative_fixed_randomizer() {
        assert!(builder().generate_randomizers(Some(&Integer::from(-5))).is_err());
    }

    #[test]
    fn encrypted_response_decrypts_to_plain_response() {
        let pk = test_keypair().public_key();
        let dk = DecryptionKey::generate(1024).unwrap();
        let builder = builder().with_encryption_key(dk.encryption_key().clone());
        let randomizers = builder.generate_randomizers(None).unwrap();
        let commitments = builder.calculate_commitments(&randomizers).unwrap();

        let c = random_bits(256).unwrap();
        let encrypted_challenge = dk.encryption_key().encrypt(&c).unwrap();
        assert!(encrypted_challenge.significant_bits() > ENCRYPTED_CHALLENGE_MIN_BITS);

        let proof = builder
            .create_proof(randomizers, &Challenge::supplied(encrypted_challenge))
            .unwrap();
        assert!(proof.encrypted);
        assert!(!proof.verify_with_challenge(pk, &Challenge::supplied(c.clone())));

        let plain = proof.decrypt_response(&dk, &c).unwrap();
        assert!(plain.verify_with_challenge(pk, &Challenge::supplied(c.clone())));
        assert_eq!(plain.challenge_contribution(pk).unwrap(), commitments.to_vec());
    }
}
