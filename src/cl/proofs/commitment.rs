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

use super::{response_in_range, Challenge};
use crate::{cl::keys::PublicKey, errors::Result, utils::util::mod_pow};
use rug::Integer;
use serde::{Deserialize, Serialize};

/// Randomizers of the holder secret and of `v'`.
pub struct CommitmentRandomizers {
    pub(crate) secret: Integer,
    pub(crate) v_prime: Integer,
}

/// Proof of knowledge of `(s, v')` with `U = S^v' * R_0^s`, sent by the holder
/// when asking for a credential.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CommitmentProof {
    pub U: Integer,
    pub c: Integer,
    pub v_prime_response: Integer,
    pub s_response: Integer,
}

impl CommitmentProof {
    fn correct_response_sizes(&self, pk: &PublicKey) -> bool {
        response_in_range(&self.v_prime_response, pk.params.l_v_prime_commit)
    }

    /// `U_commit = U^-c * S^v'_resp * R_0^s_resp`
    fn reconstruct_U_commit(&self, pk: &PublicKey) -> Result<Integer> {
        let N = &pk.N;
        let Uc = mod_pow(&self.U, &Integer::from(-&self.c), N)?;
        let Sv = mod_pow(&pk.S, &self.v_prime_response, N)?;
        let R0s = mod_pow(&pk.R[0], &self.s_response, N)?;
        Ok(Uc * Sv % N * R0s % N)
    }

    pub fn challenge_contribution(&self, pk: &PublicKey) -> Result<Vec<Integer>> {
        Ok(vec![self.U.clone(), self.reconstruct_U_commit(pk)?])
    }

    pub fn verify_with_challenge(&self, pk: &PublicKey, challenge: &Challenge) -> bool {
        if !self.correct_response_sizes(pk) {
            log::debug!("commitment proof response v' out of range");
            return false;
        }
        if self.c != *challenge.value() {
            log::debug!("commitment proof challenge mismatch for {}", pk.identifier);
            return false;
        }
        true
    }
}
