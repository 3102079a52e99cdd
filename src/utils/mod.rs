// SPDX-FileCopyrightText: 2025 Fondazione LINKS
//
// SPDX-License-Identifier: APACHE-2.0

pub mod asn1;
pub mod random;
pub mod util;
