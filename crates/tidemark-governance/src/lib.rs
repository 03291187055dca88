//! Tidemark Governance - proposal governor and execution timelock.
//!
//! This crate provides:
//! - Proposal lifecycle management with snapshot voting
//! - A delay-and-execute gate with a two-step owner handover
//! - The dispatch seam the host uses to apply target calls

pub mod governor;
pub mod proposal;
pub mod timelock;
pub mod dispatch;
pub mod event;
pub mod error;

pub use governor::{GovernorConfig, ProposalGovernor};
pub use proposal::{Proposal, ProposalAction, ProposalState, VoteReceipt, VoteSupport};
pub use timelock::{Action, ExecutionTimelock, GRACE_PERIOD, MAXIMUM_DELAY, MINIMUM_DELAY};
pub use dispatch::{ActionCall, ActionDispatcher, DispatchError};
pub use event::{GovernorEvent, TimelockEvent};
pub use error::GovernanceError;
