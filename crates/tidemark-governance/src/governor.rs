//! Proposal governor.
//!
//! Orchestrates proposal creation, snapshot voting against the ledger's
//! checkpoint history, and queuing/execution through the timelock. The
//! ledger is a read-only dependency; the timelock is the sole execution
//! backend, addressed with the governor's own identity as caller.

use std::collections::{HashMap, HashSet};

use tidemark_ledger::VotingLedger;
use tidemark_types::{Address, UNIT};
use tracing::{debug, info};

use crate::dispatch::{ActionCall, ActionDispatcher};
use crate::error::GovernanceError;
use crate::event::GovernorEvent;
use crate::proposal::{Proposal, ProposalAction, ProposalState, VoteSupport};
use crate::timelock::{Action, ExecutionTimelock};

/// Governor tuning parameters.
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    /// Blocks between proposal creation and the voting window opening
    pub voting_delay: u64,
    /// Length of the voting window in blocks
    pub voting_period: u64,
    /// Delegated votes required to create a proposal
    pub proposal_threshold: u128,
    /// For-votes required for a proposal to succeed
    pub quorum_votes: u128,
    /// Maximum actions per proposal
    pub max_actions: usize,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            voting_delay: 1,
            voting_period: 86_400,
            proposal_threshold: 1_000_000 * UNIT,
            quorum_votes: 2_000_000 * UNIT,
            max_actions: 10,
        }
    }
}

/// Proposal lifecycle state machine.
#[derive(Debug)]
pub struct ProposalGovernor {
    config: GovernorConfig,
    /// Privileged bootstrap/emergency identity
    guardian: Address,
    /// Identity this governor presents to the timelock
    self_address: Address,
    /// Governance version once activated; proposals are rejected before
    governed: Option<u64>,
    proposals: HashMap<u64, Proposal>,
    proposal_count: u64,
    latest_proposal_ids: HashMap<Address, u64>,
    events: Vec<GovernorEvent>,
}

impl ProposalGovernor {
    pub fn new(config: GovernorConfig, guardian: Address, self_address: Address) -> Self {
        Self {
            config,
            guardian,
            self_address,
            governed: None,
            proposals: HashMap::new(),
            proposal_count: 0,
            latest_proposal_ids: HashMap::new(),
            events: Vec::new(),
        }
    }

    // ---- reads ----

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    pub fn guardian(&self) -> Address {
        self.guardian
    }

    pub fn self_address(&self) -> Address {
        self.self_address
    }

    /// Governance version, once activated.
    pub fn governed(&self) -> Option<u64> {
        self.governed
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    pub fn get_proposal(&self, id: u64) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn get_actions(&self, id: u64) -> Option<&[ProposalAction]> {
        self.proposals.get(&id).map(|p| p.actions.as_slice())
    }

    pub fn get_receipt(&self, id: u64, voter: &Address) -> Option<crate::proposal::VoteReceipt> {
        self.proposals.get(&id).and_then(|p| p.receipt(voter).copied())
    }

    /// Most recent proposal id created by `proposer`.
    pub fn latest_proposal_id(&self, proposer: &Address) -> Option<u64> {
        self.latest_proposal_ids.get(proposer).copied()
    }

    /// Resolve a proposal's lifecycle state at the given height and time.
    pub fn state(&self, id: u64, height: u64, now: u64) -> Result<ProposalState, GovernanceError> {
        let p = self
            .proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        Ok(p.state(height, now, self.config.quorum_votes))
    }

    /// Drain buffered notifications.
    pub fn drain_events(&mut self) -> Vec<GovernorEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- bootstrap ----

    /// Guardian-only, one-time: activate proposal creation.
    ///
    /// Governance starts disabled so ownership handoffs, vesting setup
    /// and distributions can finish before anyone may propose.
    pub fn govern(&mut self, caller: Address, version: u64) -> Result<(), GovernanceError> {
        if caller != self.guardian {
            return Err(GovernanceError::CallerNotPermitted);
        }
        if self.governed.is_some() {
            return Err(GovernanceError::GovernanceAlreadyActive);
        }
        self.governed = Some(version);
        info!(version, "governance activated");
        self.events.push(GovernorEvent::GovernanceActivated { version });
        Ok(())
    }

    // ---- lifecycle ----

    /// Create a proposal from parallel action arrays.
    #[allow(clippy::too_many_arguments)]
    pub fn propose(
        &mut self,
        ledger: &VotingLedger,
        proposer: Address,
        targets: Vec<Address>,
        values: Vec<u128>,
        signatures: Vec<String>,
        calldatas: Vec<Vec<u8>>,
        description: &str,
        height: u64,
    ) -> Result<u64, GovernanceError> {
        if self.governed.is_none() {
            return Err(GovernanceError::GovernanceNotActive);
        }

        let votes = ledger.current_votes(&proposer);
        if votes < self.config.proposal_threshold && proposer != self.guardian {
            return Err(GovernanceError::BelowProposalThreshold {
                votes,
                threshold: self.config.proposal_threshold,
            });
        }

        if targets.len() != values.len()
            || targets.len() != signatures.len()
            || targets.len() != calldatas.len()
        {
            return Err(GovernanceError::ArityMismatch);
        }
        if targets.is_empty() {
            return Err(GovernanceError::EmptyProposal);
        }
        if targets.len() > self.config.max_actions {
            return Err(GovernanceError::TooManyActions {
                count: targets.len(),
                max: self.config.max_actions,
            });
        }

        if let Some(&prev) = self.latest_proposal_ids.get(&proposer) {
            if let Some(prev_proposal) = self.proposals.get(&prev) {
                if prev_proposal.is_live(height) {
                    return Err(GovernanceError::ProposerHasLiveProposal(prev));
                }
            }
        }

        let vote_start = height + self.config.voting_delay;
        let vote_end = vote_start + self.config.voting_period;

        self.proposal_count += 1;
        let id = self.proposal_count;

        let actions = targets
            .into_iter()
            .zip(values)
            .zip(signatures)
            .zip(calldatas)
            .map(|(((target, value), signature), calldata)| ProposalAction {
                target,
                value,
                signature,
                calldata,
            })
            .collect();

        info!(id, %proposer, vote_start, vote_end, "proposal created");
        self.events.push(GovernorEvent::ProposalCreated {
            id,
            proposer,
            vote_start,
            vote_end,
            description: description.to_string(),
        });
        self.proposals.insert(
            id,
            Proposal::new(id, proposer, actions, description.to_string(), vote_start, vote_end),
        );
        self.latest_proposal_ids.insert(proposer, id);
        Ok(id)
    }

    /// Cast a vote with the voter's power snapshotted at the window
    /// start — transfers after the window opens cannot buy weight.
    pub fn cast_vote(
        &mut self,
        ledger: &VotingLedger,
        voter: Address,
        id: u64,
        support: VoteSupport,
        height: u64,
    ) -> Result<u128, GovernanceError> {
        let p = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if !p.voting_open(height) {
            return Err(GovernanceError::VotingClosed);
        }
        if p.has_voted(&voter) {
            return Err(GovernanceError::AlreadyVoted);
        }

        let votes = ledger.prior_votes(&voter, p.vote_start, height)?;
        p.record_vote(voter, support, votes);

        debug!(%voter, id, ?support, votes, "vote cast");
        self.events.push(GovernorEvent::VoteCast {
            voter,
            id,
            support,
            votes,
        });
        Ok(votes)
    }

    /// Queue a succeeded proposal's actions into the timelock, all of
    /// them at `eta = now + delay`. All-or-nothing: collisions are
    /// detected before anything is queued (retry at a different time).
    pub fn queue(
        &mut self,
        timelock: &mut ExecutionTimelock,
        id: u64,
        height: u64,
        now: u64,
    ) -> Result<u64, GovernanceError> {
        let p = self
            .proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        let state = p.state(height, now, self.config.quorum_votes);
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::InvalidProposalState(state));
        }

        let eta = now + timelock.delay();
        let actions: Vec<Action> = p.actions.iter().map(|a| a.at_eta(eta)).collect();

        let mut seen = HashSet::new();
        for action in &actions {
            let hash = action.hash();
            if timelock.is_queued(action) || !seen.insert(hash) {
                return Err(GovernanceError::ActionAlreadyQueued(hash));
            }
        }
        for action in actions {
            timelock.queue_action(self.self_address, action, now)?;
        }

        let p = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        p.eta = Some(eta);
        info!(id, eta, "proposal queued");
        self.events.push(GovernorEvent::ProposalQueued { id, eta });
        Ok(eta)
    }

    /// Execute a queued proposal.
    ///
    /// Every action's window is validated before anything is consumed,
    /// then the whole batch is dispatched atomically; only on success are
    /// the queue entries consumed and the proposal marked executed. A
    /// reverting batch leaves the proposal `Queued` and re-executable.
    pub fn execute(
        &mut self,
        timelock: &mut ExecutionTimelock,
        dispatcher: &mut dyn ActionDispatcher,
        id: u64,
        height: u64,
        now: u64,
    ) -> Result<(), GovernanceError> {
        if timelock.owner() != self.self_address {
            return Err(GovernanceError::CallerNotPermitted);
        }

        let p = self
            .proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        let state = p.state(height, now, self.config.quorum_votes);
        if state != ProposalState::Queued {
            return Err(GovernanceError::InvalidProposalState(state));
        }
        let Some(eta) = p.eta else {
            return Err(GovernanceError::InvalidProposalState(state));
        };

        let actions: Vec<Action> = p.actions.iter().map(|a| a.at_eta(eta)).collect();
        for action in &actions {
            timelock.ready(action, now)?;
        }

        let calls: Vec<ActionCall> = actions.iter().map(|a| a.call()).collect();
        dispatcher
            .dispatch(&calls)
            .map_err(|e| GovernanceError::ActionReverted(e.0))?;

        for action in &actions {
            timelock.consume(action);
        }

        let p = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        p.executed = true;
        info!(id, "proposal executed");
        self.events.push(GovernorEvent::ProposalExecuted { id });
        Ok(())
    }

    /// Cancel a proposal and any of its queued timelock actions.
    ///
    /// The guardian may cancel anything not yet executed; the proposer
    /// may cancel their own proposal only once their delegated power has
    /// fallen back below the proposal threshold.
    pub fn cancel(
        &mut self,
        ledger: &VotingLedger,
        timelock: &mut ExecutionTimelock,
        caller: Address,
        id: u64,
        height: u64,
        now: u64,
    ) -> Result<(), GovernanceError> {
        let p = self
            .proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        let state = p.state(height, now, self.config.quorum_votes);
        if matches!(state, ProposalState::Executed | ProposalState::Canceled) {
            return Err(GovernanceError::InvalidProposalState(state));
        }

        let permitted = caller == self.guardian
            || (caller == p.proposer
                && ledger.current_votes(&p.proposer) < self.config.proposal_threshold);
        if !permitted {
            return Err(GovernanceError::CallerNotPermitted);
        }

        if let Some(eta) = p.eta {
            let actions: Vec<Action> = p.actions.iter().map(|a| a.at_eta(eta)).collect();
            for action in &actions {
                timelock.cancel_action(self.self_address, action)?;
            }
        }

        let p = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        p.canceled = true;
        info!(id, %caller, "proposal canceled");
        self.events.push(GovernorEvent::ProposalCanceled { id });
        Ok(())
    }
}
