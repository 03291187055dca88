//! Tidemark Crypto - Cryptographic primitives for the Tidemark governance core.
//!
//! This crate provides:
//! - Ed25519 keypairs and signature verification (signed delegations)
//! - Blake3 hashing with domain separation (typed signing digests)

pub mod ed25519;
pub mod hash;
pub mod error;

pub use ed25519::{Keypair, verify as ed25519_verify};
pub use hash::{hash, hash_multi, hash_with_domain};
pub use error::CryptoError;
