//! Tidemark Types - Core type definitions for the Tidemark governance core.
//!
//! This crate provides the fundamental types used throughout the system:
//! - Addresses (20-byte, Bech32m encoded)
//! - Hashes (32-byte, blake3 digests)
//! - Ed25519 key and signature newtypes
//!
//! Token amounts are plain `u128` base units with 18 decimals; the
//! crates above this one do all balance arithmetic with checked ops.

pub mod address;
pub mod hash;
pub mod signature;
pub mod error;

pub use address::Address;
pub use hash::Hash;
pub use signature::{Ed25519PublicKey, Ed25519Signature};
pub use error::TypesError;

/// Number of decimal places in one whole token.
pub const DECIMALS: u32 = 18;

/// Base units per whole token (10^18).
pub const UNIT: u128 = 1_000_000_000_000_000_000;
