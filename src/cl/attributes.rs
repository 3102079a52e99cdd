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

use crate::utils::util::{hash_to_integer, IntegerExt};
use rug::Integer;
use serde::{Deserialize, Serialize};

/// Position of the metadata attribute in the full credential vector, right after
/// the holder secret at index 0.
pub const METADATA_INDEX: usize = 1;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Attribute {
    pub value: Integer,
}

impl Attribute {
    pub fn new(value: Integer) -> Self {
        Self { value }
    }

    /// Reads `data` as a big-endian unsigned integer. Values longer than `l_m`
    /// bits are still accepted; they are hashed when used as exponents.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::new(Integer::from_bytes_be(data))
    }

    pub fn from_str_value(value: &str) -> Self {
        Self::from_bytes(value.as_bytes())
    }

    pub fn map_to_integer_as_hash(data: &[u8]) -> Self {
        Self::new(hash_to_integer(data))
    }
}

impl From<u64> for Attribute {
    fn from(value: u64) -> Self {
        Self::new(Integer::from(value))
    }
}

/// Ordered attributes of a credential, holder secret excluded. The first entry is
/// the metadata attribute.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new(metadata: Attribute, values: Vec<Attribute>) -> Self {
        let mut all = Vec::with_capacity(values.len() + 1);
        all.push(metadata);
        all.extend(values);
        Self(all)
    }

    pub fn metadata(&self) -> Option<&Attribute> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> Vec<Integer> {
        self.0.iter().map(|a| a.value.clone()).collect()
    }

    /// Full exponent vector signed by the issuer: `secret` followed by every attribute.
    pub fn with_secret(&self, secret: &Integer) -> Vec<Integer> {
        std::iter::once(secret.clone()).chain(self.values()).collect()
    }
}

impl From<Vec<Integer>> for Attributes {
    fn from(values: Vec<Integer>) -> Self {
        Self(values.into_iter().map(Attribute::new).collect())
    }
}
