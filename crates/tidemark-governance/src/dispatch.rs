//! Execution seam between the governance core and its targets.
//!
//! The core never interprets calldata; it hands batches of calls to a
//! host-provided dispatcher and trusts its all-or-nothing contract.

use tidemark_types::Address;
use thiserror::Error;

/// One target invocation, stripped of queue bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub target: Address,
    pub value: u128,
    pub signature: String,
    pub calldata: Vec<u8>,
}

/// A target call failed.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Applies a batch of target calls.
///
/// Implementations must apply the whole batch or none of it: on `Err`
/// the governance core assumes no effects happened. Single timelock
/// executions arrive as one-element batches.
pub trait ActionDispatcher {
    fn dispatch(&mut self, calls: &[ActionCall]) -> Result<(), DispatchError>;
}
