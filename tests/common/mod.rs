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

#![allow(dead_code)]

use rug::Integer;
use std::sync::OnceLock;
use zkidemix::{
    cl::{
        keys::{KeyIdentifier, KeyPair, PublicKey, SecretKey},
        params::SystemParameters,
        signature::CLSignature,
        credential::Credential,
    },
    utils::random::random_bits,
};

pub const KEYSHARE_SERVER: &str = "test-keyshare";

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Modulus size of the test keys, from `ZKIDEMIX_TEST_MODULUS` (default 1024).
pub fn modulus_size() -> u32 {
    dotenvy::dotenv().ok();
    std::env::var("ZKIDEMIX_TEST_MODULUS")
        .ok()
        .and_then(|bits| bits.parse().ok())
        .unwrap_or(1024)
}

/// Issuer keys 0 and 1 are plain, key 2 is bound to a keyshare server.
pub fn issuer_keys(index: usize) -> &'static (SecretKey, PublicKey) {
    static KEYS: OnceLock<Vec<(SecretKey, PublicKey)>> = OnceLock::new();
    let keys = KEYS.get_or_init(|| {
        let params = SystemParameters::for_modulus_size(modulus_size()).unwrap();
        (0..3u32)
            .map(|counter| {
                let id = KeyIdentifier::new("irma-demo", "MijnOverheid", counter);
                let (sk, pk) = KeyPair::generate(id, params, 6).unwrap().into_parts();
                if counter == 2 {
                    (sk, pk.with_keyshare_server(KEYSHARE_SERVER))
                } else {
                    (sk, pk)
                }
            })
            .collect()
    });
    &keys[index]
}

pub fn context_and_nonce() -> (Integer, Integer) {
    (random_bits(256).unwrap(), random_bits(80).unwrap())
}

pub fn integers(values: &[u64]) -> Vec<Integer> {
    values.iter().map(|v| Integer::from(*v)).collect()
}

/// Credential signed directly by the issuer over `secret` and `attributes`.
pub fn credential(index: usize, secret: &Integer, attributes: &[u64]) -> Credential {
    let (sk, pk) = issuer_keys(index);
    let mut all = vec![secret.clone()];
    all.extend(integers(attributes));
    let signature = CLSignature::sign(sk, pk, &all).unwrap();
    Credential::new(pk.clone(), all, signature)
}
