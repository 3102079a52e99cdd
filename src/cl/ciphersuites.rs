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

use serde::{Deserialize, Serialize};

/// Compile-time parameter presets; the challenge hash is always SHA-256.
pub trait CLCiphersuite: Eq + 'static {
    const ln: u32; // NOTE: length of n (i.e. special RSA modulus)
    const lm: u32; // NOTE: length of each attribute in the credential, i.e. (m0, m1, ... m(L-1))
    const le_prime: u32; // NOTE: length of the interval the prime e is drawn from
    const lstatzk: u32; // NOTE: statistical zero-knowledge security parameter
    const lh: u32 = 256; // NOTE: length of the challenge, i.e. of a SHA256 output
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CL1024Sha256 {}

impl CLCiphersuite for CL1024Sha256 {
    const ln: u32 = 1024;
    const lm: u32 = 256;
    const le_prime: u32 = 120;
    const lstatzk: u32 = 80;
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CL2048Sha256 {}

impl CLCiphersuite for CL2048Sha256 {
    const ln: u32 = 2048;
    const lm: u32 = 256;
    const le_prime: u32 = 120;
    const lstatzk: u32 = 128;
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CL4096Sha256 {}

impl CLCiphersuite for CL4096Sha256 {
    const ln: u32 = 4096;
    const lm: u32 = 512; // NOTE: larger attributes, matching the larger modulus
    const le_prime: u32 = 120;
    const lstatzk: u32 = 128;
}
