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

use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Unsupported modulus size: {0} bits")]
    UnsupportedModulusSize(u32),
    #[error("Invalid system parameters: {0}")]
    InvalidParameters(String),
    #[error("No public key found for {0}")]
    KeyNotFound(String),
    #[error("Missing key material: {0}")]
    MissingKeyMaterial(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Proof of correctness of the commitment is invalid")]
    IncorrectProofOfCommitment,
    #[error("Proof of correctness of the issuer signature is invalid")]
    IncorrectProofOfSignatureCorrectness,
    #[error("Signature over the attributes is invalid")]
    IncorrectAttributeSignature,

    #[error("Error during keypair generation: {0}")]
    KeyGenError(String),
    #[error("Secure random source failure: {0}")]
    RandomSourceFailure(String),
    #[error("Arithmetic error: {0}")]
    ArithmeticError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
