//! Tidemark Ledger - checkpointed voting-power ledger.
//!
//! This crate provides:
//! - Fungible balances with a transfer-lock set and owner-gated minting
//! - One-hop delegation (no transitive power flow)
//! - Append-only per-delegate voting-power checkpoints with O(log n)
//!   historical queries
//! - Signature-authorized delegation with per-signer replay nonces

pub mod checkpoint;
pub mod ledger;
pub mod signed;
pub mod event;
pub mod error;

pub use checkpoint::{Checkpoint, Checkpoints};
pub use ledger::{VotingLedger, FULL_SUPPLY, NAME, SYMBOL};
pub use signed::{SignedDelegation, SigningDomain};
pub use event::LedgerEvent;
pub use error::LedgerError;
