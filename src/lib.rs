#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

//! Camenisch-Lysyanskaya anonymous credentials.
//!
//! The [`cl`] module holds the signature scheme, the Schnorr proofs built on top
//! of it and the issuance protocol. [`utils`] holds the arithmetic and encoding
//! primitives everything else is hashed and exponentiated with.

pub mod errors;
pub mod utils;
pub mod cl;

pub use errors::{Error, Result};
