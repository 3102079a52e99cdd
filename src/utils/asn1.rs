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

//! DER encoding of the challenge preimage.
//!
//! The output must match, byte for byte, what Go's `encoding/asn1` produces for
//! a `[]interface{}` holding an optional `true`, the element count and the
//! integers themselves, because two implementations only agree on a challenge
//! if they agree on every preimage byte.

use core::cmp::Ordering;
use rug::{integer::Order, Integer};

const TAG_BOOLEAN: u8 = 0x01;
const TAG_INTEGER: u8 = 0x02;
const TAG_SEQUENCE: u8 = 0x30;

fn push_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Minimal two's complement big-endian content octets of `value`.
fn integer_content(value: &Integer) -> Vec<u8> {
    match value.cmp0() {
        Ordering::Equal => vec![0u8],
        Ordering::Greater => {
            let mut bytes = value.to_digits::<u8>(Order::MsfBe);
            if bytes[0] & 0x80 != 0 {
                bytes.insert(0, 0x00);
            }
            bytes
        }
        Ordering::Less => {
            let magnitude_minus_one = Integer::from(-value) - 1u32;
            let mut bytes = magnitude_minus_one.to_digits::<u8>(Order::MsfBe);
            bytes.iter_mut().for_each(|b| *b ^= 0xff);
            if bytes.first().map_or(true, |b| b & 0x80 == 0) {
                bytes.insert(0, 0xff);
            }
            bytes
        }
    }
}

fn push_integer(out: &mut Vec<u8>, value: &Integer) {
    let content = integer_content(value);
    out.push(TAG_INTEGER);
    push_length(out, content.len());
    out.extend_from_slice(&content);
}

/// Encodes `values` as `SEQUENCE { [BOOLEAN TRUE,] INTEGER count, INTEGER... }`.
pub fn encode_sequence(values: &[Integer], signature_marker: bool) -> Vec<u8> {
    let mut body: Vec<u8> = Vec::new();
    if signature_marker {
        body.extend_from_slice(&[TAG_BOOLEAN, 0x01, 0xff]);
    }
    push_integer(&mut body, &Integer::from(values.len()));
    values.iter().for_each(|v| push_integer(&mut body, v));

    let mut out: Vec<u8> = Vec::with_capacity(body.len() + 6);
    out.push(TAG_SEQUENCE);
    push_length(&mut out, body.len());
    out.extend_from_slice(&body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Integer> {
        values.iter().map(|&v| Integer::from(v)).collect()
    }

    #[test]
    fn count_prefixed_sequence() {
        let encoded = encode_sequence(&ints(&[1, 65, 1025]), false);
        assert_eq!(hex::encode(encoded), "300d02010302010102014102020401");
    }

    #[test]
    fn signature_marker_precedes_count() {
        let encoded = encode_sequence(&ints(&[1]), true);
        assert_eq!(hex::encode(encoded), "30090101ff020101020101");
        assert_ne!(encode_sequence(&ints(&[1]), true), encode_sequence(&ints(&[1]), false));
    }

    #[test]
    fn integer_edge_cases() {
        assert_eq!(integer_content(&Integer::from(0)), vec![0x00]);
        assert_eq!(integer_content(&Integer::from(127)), vec![0x7f]);
        assert_eq!(integer_content(&Integer::from(128)), vec![0x00, 0x80]);
        assert_eq!(integer_content(&Integer::from(256)), vec![0x01, 0x00]);
        assert_eq!(integer_content(&Integer::from(-1)), vec![0xff]);
        assert_eq!(integer_content(&Integer::from(-128)), vec![0x80]);
        assert_eq!(integer_content(&Integer::from(-129)), vec![0xff, 0x7f]);
        assert_eq!(integer_content(&Integer::from(-256)), vec![0xff, 0x00]);
    }

    #[test]
    fn long_form_length() {
        let big = Integer::from(1) << 2048u32;
        let encoded = encode_sequence(&[big], false);
        // 257 content octets for the integer, so both lengths use the long form
        assert_eq!(&encoded[..4], &[0x30, 0x82, 0x01, 0x08]);
        assert_eq!(&encoded[7..11], &[0x02, 0x82, 0x01, 0x01]);
    }
}
