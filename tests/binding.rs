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

#![allow(non_snake_case)]

mod common;

#[cfg(test)]
mod binding_tests {
    use crate::common::{self, context_and_nonce, credential, integers, issuer_keys};
    use rug::Integer;
    use zkidemix::{
        cl::{
            credential::Credential,
            proofs::{
                list::{ProofList, ProofListBuilder},
                ChallengeDomain, Proof,
            },
            signature::CLSignature,
        },
        utils::random::random_bits,
    };

    #[test]
    fn disclosure_of_two_attributes() {
        common::init();
        let (sk, pk) = issuer_keys(0);
        let attributes = integers(&[1, 2, 3, 4]);
        let signature = CLSignature::sign(sk, pk, &attributes).unwrap();
        let credential = Credential::new(pk.clone(), attributes, signature);
        let (context, nonce) = context_and_nonce();

        let proof = Proof::from(
            credential
                .create_disclosure_proof(&[1, 2], &context, &nonce, ChallengeDomain::Disclosure)
                .unwrap(),
        );
        assert!(proof.verify(pk, &context, &nonce, ChallengeDomain::Disclosure));
        assert!(!proof.verify(pk, &context, &(nonce.clone() + 1u32), ChallengeDomain::Disclosure));
        assert!(!proof.verify(pk, &(context.clone() + 1u32), &nonce, ChallengeDomain::Disclosure));
        assert!(!proof.verify(&issuer_keys(1).1, &context, &nonce, ChallengeDomain::Disclosure));
        assert!(!proof.verify(pk, &context, &nonce, ChallengeDomain::Signature));

        let Proof::Disclosure(mut altered) = proof else {
            panic!("Error! Expected a disclosure proof");
        };
        assert_eq!(altered.disclosed_attributes().get(&1), Some(&Integer::from(2)));
        assert_eq!(altered.disclosed_attributes().get(&2), Some(&Integer::from(3)));
        altered.a_disclosed.insert(1, Integer::from(20));
        assert!(!Proof::from(altered).verify(pk, &context, &nonce, ChallengeDomain::Disclosure));
    }

    #[test]
    fn proofs_built_together_are_bound() {
        common::init();
        let secret = random_bits(256).unwrap();
        let first = credential(0, &secret, &[10, 11, 12]);
        let second = credential(1, &secret, &[20, 21]);
        let (context, nonce) = context_and_nonce();

        let (b1, b2) = (
            first.create_disclosure_proof_builder(&[1]).unwrap(),
            second.create_disclosure_proof_builder(&[2]).unwrap(),
        );
        let mut builder = ProofListBuilder::new(&context, &nonce, ChallengeDomain::Disclosure);
        builder.add_disclosure(&b1).add_disclosure(&b2);
        let list = builder.build().unwrap();

        assert!(list.is_bound(&context, &nonce));
        assert!(list.verify(&context, &nonce, ChallengeDomain::Disclosure, true));
        assert!(!list.verify(&context, &(nonce + 1u32), ChallengeDomain::Disclosure, true));
        assert_eq!(
            list.entries()[0].proof.secret_key_response(),
            list.entries()[1].proof.secret_key_response()
        );
    }

    #[test]
    fn independent_proofs_are_not_bound() {
        common::init();
        let secret = random_bits(256).unwrap();
        let first = credential(0, &secret, &[10, 11, 12]);
        let second = credential(1, &secret, &[20, 21]);
        let (context, nonce) = context_and_nonce();

        let mut concatenated = ProofList::new(ChallengeDomain::Disclosure);
        for c in [&first, &second] {
            let proof = c
                .create_disclosure_proof(&[1], &context, &nonce, ChallengeDomain::Disclosure)
                .unwrap();
            concatenated.push(proof.into(), c.pk.clone()).unwrap();
        }

        assert!(!concatenated.is_bound(&context, &nonce));
        assert!(!concatenated.verify(&context, &nonce, ChallengeDomain::Disclosure, true));
        assert!(concatenated.verify(&context, &nonce, ChallengeDomain::Disclosure, false));
    }

    #[test]
    fn signature_domain_is_separated() {
        common::init();
        let secret = random_bits(256).unwrap();
        let cred = credential(0, &secret, &[1, 2]);
        let (context, nonce) = context_and_nonce();

        let b = cred.create_disclosure_proof_builder(&[2]).unwrap();
        let mut builder = ProofListBuilder::new(&context, &nonce, ChallengeDomain::Signature);
        builder.add_disclosure(&b);
        let list = builder.build().unwrap();

        assert_eq!(list.domain(), ChallengeDomain::Signature);
        assert!(list.verify(&context, &nonce, ChallengeDomain::Signature, true));
        assert!(!list.verify(&context, &nonce, ChallengeDomain::Disclosure, false));
    }

    #[test]
    fn bound_list_json_round_trip() {
        common::init();
        let secret = random_bits(256).unwrap();
        let first = credential(0, &secret, &[3, 4]);
        let second = credential(1, &secret, &[5]);
        let (context, nonce) = context_and_nonce();

        let (b1, b2) = (
            first.create_disclosure_proof_builder(&[1, 2]).unwrap(),
            second.create_disclosure_proof_builder(&[]).unwrap(),
        );
        let mut builder = ProofListBuilder::new(&context, &nonce, ChallengeDomain::Disclosure);
        builder.add_disclosure(&b1).add_disclosure(&b2);
        let list = builder.build().unwrap();

        let json = serde_json::to_string(&list).unwrap();
        let decoded: ProofList = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, list);
        assert!(decoded.verify(&context, &nonce, ChallengeDomain::Disclosure, true));
    }
}
