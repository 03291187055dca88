//! Proposal records and lifecycle resolution.
//!
//! A proposal's state is never stored directly: it is computed on demand
//! from the record's heights, flags and tallies against the caller-visible
//! height and time. There is no scheduler anywhere in the lifecycle.

use std::collections::HashMap;

use tidemark_types::Address;

use crate::dispatch::ActionCall;
use crate::timelock::{Action, GRACE_PERIOD};

/// Vote options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteSupport {
    /// Vote against
    Against,
    /// Vote in favor
    For,
    /// Abstain (counts toward neither quorum nor margin)
    Abstain,
}

/// Lifecycle states, resolved lazily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalState {
    /// Before the voting window opens
    Pending,
    /// Voting window is open
    Active,
    /// Canceled by the guardian or the proposer
    Canceled,
    /// Window closed without meeting margin and quorum
    Defeated,
    /// Window closed with margin and quorum met, not yet queued
    Succeeded,
    /// Actions queued in the timelock, awaiting eta
    Queued,
    /// Queued but the grace window elapsed unexecuted
    Expired,
    /// Actions applied
    Executed,
}

/// One action of a proposal, before an eta is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalAction {
    pub target: Address,
    pub value: u128,
    pub signature: String,
    pub calldata: Vec<u8>,
}

impl ProposalAction {
    /// Bind this action to an execution eta.
    pub fn at_eta(&self, eta: u64) -> Action {
        Action {
            target: self.target,
            value: self.value,
            signature: self.signature.clone(),
            calldata: self.calldata.clone(),
            eta,
        }
    }

    pub fn call(&self) -> ActionCall {
        ActionCall {
            target: self.target,
            value: self.value,
            signature: self.signature.clone(),
            calldata: self.calldata.clone(),
        }
    }
}

/// A voter's recorded ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteReceipt {
    pub support: VoteSupport,
    pub votes: u128,
}

/// Identity-scoped proposal record.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub id: u64,
    pub proposer: Address,
    pub actions: Vec<ProposalAction>,
    pub description: String,
    /// Last height before the voting window; snapshots are taken here
    pub vote_start: u64,
    /// Last height of the voting window
    pub vote_end: u64,
    pub for_votes: u128,
    pub against_votes: u128,
    pub abstain_votes: u128,
    /// Set when queued into the timelock
    pub eta: Option<u64>,
    pub canceled: bool,
    pub executed: bool,
    receipts: HashMap<Address, VoteReceipt>,
}

impl Proposal {
    pub(crate) fn new(
        id: u64,
        proposer: Address,
        actions: Vec<ProposalAction>,
        description: String,
        vote_start: u64,
        vote_end: u64,
    ) -> Self {
        Self {
            id,
            proposer,
            actions,
            description,
            vote_start,
            vote_end,
            for_votes: 0,
            against_votes: 0,
            abstain_votes: 0,
            eta: None,
            canceled: false,
            executed: false,
            receipts: HashMap::new(),
        }
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.receipts.contains_key(voter)
    }

    pub fn receipt(&self, voter: &Address) -> Option<&VoteReceipt> {
        self.receipts.get(voter)
    }

    pub(crate) fn record_vote(&mut self, voter: Address, support: VoteSupport, votes: u128) {
        match support {
            VoteSupport::For => self.for_votes += votes,
            VoteSupport::Against => self.against_votes += votes,
            VoteSupport::Abstain => self.abstain_votes += votes,
        }
        self.receipts.insert(voter, VoteReceipt { support, votes });
    }

    /// Whether the proposal still occupies its proposer's "one live
    /// proposal" slot. Equivalent to `Pending` or `Active`.
    pub(crate) fn is_live(&self, height: u64) -> bool {
        !self.canceled && height <= self.vote_end
    }

    /// Voting is open strictly after `vote_start` (the snapshot height
    /// must be final) and through `vote_end`.
    pub(crate) fn voting_open(&self, height: u64) -> bool {
        !self.canceled && height > self.vote_start && height <= self.vote_end
    }

    /// Resolve the lifecycle state at the given height and time.
    ///
    /// A tie defeats, and quorum is evaluated on for-votes independently
    /// of the margin: a unanimous but under-quorum vote still fails.
    pub fn state(&self, height: u64, now: u64, quorum: u128) -> ProposalState {
        if self.canceled {
            ProposalState::Canceled
        } else if height <= self.vote_start {
            ProposalState::Pending
        } else if height <= self.vote_end {
            ProposalState::Active
        } else if self.executed {
            ProposalState::Executed
        } else if let Some(eta) = self.eta {
            if now > eta + GRACE_PERIOD {
                ProposalState::Expired
            } else {
                ProposalState::Queued
            }
        } else if self.for_votes > self.against_votes && self.for_votes >= quorum {
            ProposalState::Succeeded
        } else {
            ProposalState::Defeated
        }
    }
}
