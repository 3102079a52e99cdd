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

use super::keys::{KeyIdentifier, PublicKey};
use crate::errors::{Error, Result};
use std::collections::HashMap;

/// Read-only lookup of issuer public keys by identifier.
pub trait KeyStore {
    fn public_key(&self, identifier: &KeyIdentifier) -> Result<&PublicKey>;
}

/// Key store backed by a map, filled by the caller with already-loaded keys.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeyStore {
    keys: HashMap<KeyIdentifier, PublicKey>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `pk`, returning the key it replaces, if any.
    pub fn insert(&mut self, pk: PublicKey) -> Option<PublicKey> {
        self.keys.insert(pk.identifier.clone(), pk)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn public_key(&self, identifier: &KeyIdentifier) -> Result<&PublicKey> {
        self.keys
            .get(identifier)
            .ok_or_else(|| Error::KeyNotFound(identifier.to_string()))
    }
}

impl FromIterator<PublicKey> for MemoryKeyStore {
    fn from_iter<I: IntoIterator<Item = PublicKey>>(iter: I) -> Self {
        let mut store = Self::new();
        for pk in iter {
            store.insert(pk);
        }
        store
    }
}
