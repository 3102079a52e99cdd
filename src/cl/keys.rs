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

use super::params::SystemParameters;
use crate::{
    errors::{Error, Result},
    utils::{
        random::{random_below, random_qr, random_safe_prime},
        util::mod_pow,
    },
};
use core::fmt;
use rug::Integer;
use serde::{Deserialize, Serialize};

/// Identifies an issuer key: the scheme it belongs to, the issuer and the key counter.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct KeyIdentifier {
    pub scheme_manager: String,
    pub issuer: String,
    pub counter: u32,
}

impl KeyIdentifier {
    pub fn new(scheme_manager: &str, issuer: &str, counter: u32) -> Self {
        Self {
            scheme_manager: scheme_manager.to_owned(),
            issuer: issuer.to_owned(),
            counter,
        }
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}-{}", self.scheme_manager, self.issuer, self.counter)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PublicKey {
    pub identifier: KeyIdentifier,
    pub N: Integer,
    pub Z: Integer,
    pub S: Integer,
    /// `R[0]` is the base of the holder secret, `R[1..]` those of the attributes.
    pub R: Vec<Integer>,
    pub params: SystemParameters,
    /// Keyshare server holding part of the holder secret for credentials under this key.
    pub keyshare_server: Option<String>,
}

impl PublicKey {
    pub fn new(
        identifier: KeyIdentifier,
        N: Integer,
        Z: Integer,
        S: Integer,
        R: Vec<Integer>,
        params: SystemParameters,
    ) -> Result<Self> {
        if R.is_empty() {
            return Err(Error::MissingKeyMaterial(format!(
                "public key {} has no R bases",
                identifier
            )));
        }
        if N.significant_bits() != params.l_n {
            return Err(Error::MissingKeyMaterial(format!(
                "modulus of {} has {} bits, parameters expect {}",
                identifier,
                N.significant_bits(),
                params.l_n
            )));
        }
        Ok(Self {
            identifier,
            N,
            Z,
            S,
            R,
            params,
            keyshare_server: None,
        })
    }

    pub fn with_keyshare_server(mut self, server: &str) -> Self {
        self.keyshare_server = Some(server.to_owned());
        self
    }

    /// Number of attributes (secret excluded) a credential under this key can hold.
    pub fn max_attributes(&self) -> usize {
        self.R.len() - 1
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SecretKey {
    pub p: Integer,
    pub q: Integer,
    pub pprime: Integer,
    pub qprime: Integer,
}

impl SecretKey {
    pub fn new(p: Integer, q: Integer) -> Result<Self> {
        if p.is_even() || q.is_even() {
            return Err(Error::MissingKeyMaterial("secret primes must be odd".to_owned()));
        }
        let pprime = Integer::from(&p - 1u32) >> 1u32;
        let qprime = Integer::from(&q - 1u32) >> 1u32;
        Ok(Self { p, q, pprime, qprime })
    }

    /// Order `p'q'` of the group of quadratic residues modulo `n`.
    pub fn order(&self) -> Integer {
        Integer::from(&self.pprime * &self.qprime)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct KeyPair {
    pub(crate) public: PublicKey,
    pub(crate) private: SecretKey,
}

impl KeyPair {
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &SecretKey {
        &self.private
    }

    /// Returns the couple `(sk, pk)`.
    pub fn into_parts(self) -> (SecretKey, PublicKey) {
        (self.private, self.public)
    }

    /// Generates a fresh issuer key able to sign `n_attributes` attributes plus the
    /// holder secret.
    pub fn generate(
        identifier: KeyIdentifier,
        params: SystemParameters,
        n_attributes: usize,
    ) -> Result<Self> {
        let half = params.l_n / 2;
        let (mut p, mut pprime);
        let (mut q, mut qprime);
        let mut N;
        loop {
            (p, pprime) = random_safe_prime(half)?;
            (q, qprime) = random_safe_prime(half)?;
            N = Integer::from(&p * &q);
            if p != q && N.significant_bits() == params.l_n {
                break;
            }
        }
        log::debug!("generated {}-bit modulus for {}", params.l_n, identifier);

        // S must generate the whole group of quadratic residues, i.e. have order p'q'
        let S = loop {
            let candidate = random_qr(&N)?;
            if mod_pow(&candidate, &pprime, &N)? != 1 && mod_pow(&candidate, &qprime, &N)? != 1 {
                break candidate;
            }
        };

        let order = Integer::from(&pprime * &qprime);
        let exponent_bound = Integer::from(&order - 2u32);
        let power_of_S = || -> Result<Integer> {
            let x = random_below(&exponent_bound)? + 2u32;
            mod_pow(&S, &x, &N)
        };

        let Z = power_of_S()?;
        let R = (0..=n_attributes)
            .map(|_| power_of_S())
            .collect::<Result<Vec<Integer>>>()?;

        let public = PublicKey::new(identifier, N, Z, S.clone(), R, params)?;
        let private = SecretKey::new(p, q)
            .map_err(|e| Error::KeyGenError(e.to_string()))?;

        Ok(Self { public, private })
    }
}

/// Issuer key shared by the unit tests of the whole crate, generated once.
#[cfg(test)]
pub(crate) fn test_keypair() -> &'static KeyPair {
    use std::sync::OnceLock;
    static KEYPAIR: OnceLock<KeyPair> = OnceLock::new();
    KEYPAIR.get_or_init(|| {
        let params = SystemParameters::for_modulus_size(1024).unwrap();
        KeyPair::generate(KeyIdentifier::new("test", "issuer", 0), params, 6).unwrap()
    })
}
