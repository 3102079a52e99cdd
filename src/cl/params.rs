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

use super::ciphersuites::{CL1024Sha256, CL2048Sha256, CL4096Sha256, CLCiphersuite};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Bit lengths of every quantity the signature and the proofs manipulate.
///
/// Only `l_n`, `l_m`, `l_e_prime` and `l_statzk` are free; everything else is
/// derived from them, so two parties agreeing on the modulus size agree on the
/// whole table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SystemParameters {
    pub l_n: u32,
    pub l_m: u32,
    pub l_e_prime: u32,
    pub l_statzk: u32,
    pub l_h: u32,

    pub l_e: u32,
    pub l_r: u32,
    pub l_v: u32,
    pub l_e_commit: u32,
    pub l_m_commit: u32,
    pub l_s_commit: u32,
    pub l_v_prime: u32,
    pub l_v_prime_commit: u32,
    pub l_v_commit: u32,
    pub l_r_a: u32,
}

impl SystemParameters {
    pub const SUPPORTED_MODULUS_SIZES: [u32; 3] = [1024, 2048, 4096];

    pub fn new(l_n: u32, l_m: u32, l_e_prime: u32, l_statzk: u32) -> Result<Self> {
        let l_h = 256;
        let l_r = l_statzk;
        let l_e = l_statzk + l_h + (l_m + 4).max(l_e_prime + 2) + 1;
        let l_v = l_n + l_statzk + l_h + (l_m + l_r + 3).max(l_statzk + 2) + 1;

        let params = Self {
            l_n,
            l_m,
            l_e_prime,
            l_statzk,
            l_h,
            l_e,
            l_r,
            l_v,
            l_e_commit: l_e_prime + l_statzk + l_h,
            l_m_commit: l_m + l_statzk + l_h,
            l_s_commit: l_m + l_statzk + l_h + 1,
            l_v_prime: l_n + l_statzk,
            l_v_prime_commit: l_n + 2 * l_statzk + l_h,
            l_v_commit: l_v + l_statzk + l_h,
            l_r_a: l_n + l_statzk,
        };

        if !params.is_valid() {
            return Err(Error::InvalidParameters(format!(
                "bit lengths (l_n={}, l_m={}, l_e_prime={}, l_statzk={}) violate the parameter constraints",
                l_n, l_m, l_e_prime, l_statzk
            )));
        }
        Ok(params)
    }

    pub fn from_ciphersuite<CS: CLCiphersuite>() -> Result<Self> {
        Self::new(CS::ln, CS::lm, CS::le_prime, CS::lstatzk)
    }

    /// Preset for a modulus of `bits` bits.
    pub fn for_modulus_size(bits: u32) -> Result<Self> {
        match bits {
            1024 => Self::from_ciphersuite::<CL1024Sha256>(),
            2048 => Self::from_ciphersuite::<CL2048Sha256>(),
            4096 => Self::from_ciphersuite::<CL4096Sha256>(),
            _ => Err(Error::UnsupportedModulusSize(bits)),
        }
    }

    pub fn is_valid(&self) -> bool {
        let (l_n, l_m, l_e_prime, l_statzk, l_h, l_r) = (
            self.l_n as i64,
            self.l_m as i64,
            self.l_e_prime as i64,
            self.l_statzk as i64,
            self.l_h as i64,
            self.l_r as i64,
        );
        let l_e = self.l_e as i64;
        let l_v = self.l_v as i64;

        l_e > l_statzk + l_h + (l_m + 4).max(l_e_prime + 2)
            && l_v > l_n + l_statzk + l_h + (l_m + l_r + 3).max(l_statzk + 2)
            && l_h < l_e
            && l_e_prime < l_e - l_statzk - l_h - 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_lengths_1024() {
        let p = SystemParameters::for_modulus_size(1024).unwrap();
        assert_eq!(p.l_e, 80 + 256 + 260 + 1);
        assert_eq!(p.l_v, 1024 + 80 + 256 + (256 + 80 + 3) + 1);
        assert_eq!(p.l_e_commit, 120 + 80 + 256);
        assert_eq!(p.l_m_commit, 256 + 80 + 256);
        assert_eq!(p.l_s_commit, p.l_m_commit + 1);
        assert_eq!(p.l_v_prime, 1104);
        assert_eq!(p.l_v_prime_commit, 1024 + 160 + 256);
        assert_eq!(p.l_v_commit, p.l_v + 80 + 256);
        assert!(p.is_valid());
    }

    #[test]
    fn every_preset_is_valid() {
        for bits in SystemParameters::SUPPORTED_MODULUS_SIZES {
            let p = SystemParameters::for_modulus_size(bits).unwrap();
            assert_eq!(p.l_n, bits);
            assert!(p.is_valid());
        }
        assert_eq!(
            SystemParameters::for_modulus_size(4096).unwrap(),
            SystemParameters::from_ciphersuite::<CL4096Sha256>().unwrap()
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(
            SystemParameters::new(2048, 256, 120, 128).unwrap(),
            SystemParameters::for_modulus_size(2048).unwrap()
        );
    }

    #[test]
    fn unknown_modulus_size() {
        assert_eq!(
            SystemParameters::for_modulus_size(3072),
            Err(Error::UnsupportedModulusSize(3072))
        );
    }

    #[test]
    fn oversized_prime_interval_is_rejected() {
        // l_e_prime + 2 dominates l_m + 4, pushing l_e_prime past its bound
        assert!(matches!(
            SystemParameters::new(1024, 16, 400, 80),
            Err(Error::InvalidParameters(_))
        ));
    }
}
