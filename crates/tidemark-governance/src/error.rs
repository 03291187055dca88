use crate::proposal::ProposalState;
use tidemark_ledger::LedgerError;
use tidemark_types::Hash;
use thiserror::Error;

/// Errors that can occur in governor and timelock operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GovernanceError {
    #[error("Caller not permitted")]
    CallerNotPermitted,

    #[error("Direct ownership transfer terminated; use the two-step handover")]
    Terminated,

    #[error("Delay {delay} outside bounds [{min}, {max}]")]
    DelayOutOfBounds { delay: u64, min: u64, max: u64 },

    #[error("Eta {eta} earlier than {earliest}")]
    DelayNotMet { eta: u64, earliest: u64 },

    #[error("Action already queued: {0}")]
    ActionAlreadyQueued(Hash),

    #[error("Action not queued: {0}")]
    ActionNotQueued(Hash),

    #[error("Too early: executable at {eta}, now {now}")]
    TooEarly { eta: u64, now: u64 },

    #[error("Action expired at {deadline}, now {now}")]
    Expired { deadline: u64, now: u64 },

    #[error("Action reverted: {0}")]
    ActionReverted(String),

    #[error("Governance not active")]
    GovernanceNotActive,

    #[error("Governance already active")]
    GovernanceAlreadyActive,

    #[error("Voting power {votes} below proposal threshold {threshold}")]
    BelowProposalThreshold { votes: u128, threshold: u128 },

    #[error("Action arrays have mismatched lengths")]
    ArityMismatch,

    #[error("Proposal has no actions")]
    EmptyProposal,

    #[error("Too many actions: {count} > {max}")]
    TooManyActions { count: usize, max: usize },

    #[error("Proposer already has a live proposal: {0}")]
    ProposerHasLiveProposal(u64),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(u64),

    #[error("Voting is not open")]
    VotingClosed,

    #[error("Already voted")]
    AlreadyVoted,

    #[error("Invalid proposal state: {0:?}")]
    InvalidProposalState(ProposalState),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
