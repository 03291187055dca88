use crate::proposal::VoteSupport;
use tidemark_types::{Address, Hash};

/// Notifications emitted by the timelock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelockEvent {
    ActionQueued {
        hash: Hash,
        target: Address,
        eta: u64,
    },
    ActionCanceled {
        hash: Hash,
    },
    ActionExecuted {
        hash: Hash,
    },
    /// A candidate was recorded; authority has not moved yet
    OwnerProposed {
        candidate: Address,
        proposer: Address,
    },
    OwnershipTransferred {
        previous: Address,
        current: Address,
    },
}

/// Notifications emitted by the governor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernorEvent {
    GovernanceActivated {
        version: u64,
    },
    ProposalCreated {
        id: u64,
        proposer: Address,
        vote_start: u64,
        vote_end: u64,
        description: String,
    },
    VoteCast {
        voter: Address,
        id: u64,
        support: VoteSupport,
        votes: u128,
    },
    ProposalQueued {
        id: u64,
        eta: u64,
    },
    ProposalExecuted {
        id: u64,
    },
    ProposalCanceled {
        id: u64,
    },
}
