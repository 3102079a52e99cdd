// SPDX-FileCopyrightText: 2025 Fondazione LINKS
//
// SPDX-License-Identifier: APACHE-2.0

pub mod attributes;
pub mod ciphersuites;
pub mod credential;
pub mod issuance;
pub mod keys;
pub mod keystore;
pub mod paillier;
pub mod params;
pub mod proofs;
pub mod signature;
