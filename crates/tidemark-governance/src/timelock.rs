//! Time-delayed execution gate.
//!
//! Decouples "a decision was made" from "a decision takes effect": queued
//! actions become executable only after their eta, stay executable for a
//! grace window, and ownership of the gate itself can only move through
//! an explicit two-step handover.

use std::collections::HashMap;

use tidemark_types::{Address, Hash};
use tracing::{debug, info};

use crate::dispatch::{ActionCall, ActionDispatcher};
use crate::error::GovernanceError;
use crate::event::TimelockEvent;

/// Shortest configurable queue delay (2 days).
pub const MINIMUM_DELAY: u64 = 2 * 24 * 60 * 60;
/// Longest configurable queue delay (30 days).
pub const MAXIMUM_DELAY: u64 = 30 * 24 * 60 * 60;
/// Window after eta during which a queued action stays executable (14 days).
pub const GRACE_PERIOD: u64 = 14 * 24 * 60 * 60;

/// A queued target invocation with its earliest execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub target: Address,
    pub value: u128,
    pub signature: String,
    pub calldata: Vec<u8>,
    pub eta: u64,
}

impl Action {
    /// Queue key: blake3 over all five fields, length-prefixed so
    /// adjacent variable-size fields cannot alias.
    pub fn hash(&self) -> Hash {
        Hash::compute_multi(&[
            self.target.as_bytes(),
            &self.value.to_be_bytes(),
            &(self.signature.len() as u64).to_be_bytes(),
            self.signature.as_bytes(),
            &(self.calldata.len() as u64).to_be_bytes(),
            &self.calldata,
            &self.eta.to_be_bytes(),
        ])
    }

    /// The call this action performs, stripped of queue bookkeeping.
    pub fn call(&self) -> ActionCall {
        ActionCall {
            target: self.target,
            value: self.value,
            signature: self.signature.clone(),
            calldata: self.calldata.clone(),
        }
    }
}

/// Delay-and-execute gate with two-step owner handover.
#[derive(Debug)]
pub struct ExecutionTimelock {
    owner: Address,
    proposed_owner: Option<Address>,
    delay: u64,
    queued: HashMap<Hash, Action>,
    events: Vec<TimelockEvent>,
}

impl ExecutionTimelock {
    /// Create a timelock owned by `owner` with the given delay (seconds).
    pub fn new(owner: Address, delay: u64) -> Result<Self, GovernanceError> {
        if !(MINIMUM_DELAY..=MAXIMUM_DELAY).contains(&delay) {
            return Err(GovernanceError::DelayOutOfBounds {
                delay,
                min: MINIMUM_DELAY,
                max: MAXIMUM_DELAY,
            });
        }
        Ok(Self {
            owner,
            proposed_owner: None,
            delay,
            queued: HashMap::new(),
            events: Vec::new(),
        })
    }

    // ---- reads ----

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn proposed_owner(&self) -> Option<Address> {
        self.proposed_owner
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn is_queued(&self, action: &Action) -> bool {
        self.queued.contains_key(&action.hash())
    }

    /// Validate that `action` is queued and inside its execution window,
    /// without consuming it. Used to pre-check atomic batches.
    pub fn ready(&self, action: &Action, now: u64) -> Result<(), GovernanceError> {
        let hash = action.hash();
        if !self.queued.contains_key(&hash) {
            return Err(GovernanceError::ActionNotQueued(hash));
        }
        if now < action.eta {
            return Err(GovernanceError::TooEarly {
                eta: action.eta,
                now,
            });
        }
        let deadline = action.eta + GRACE_PERIOD;
        if now > deadline {
            return Err(GovernanceError::Expired { deadline, now });
        }
        Ok(())
    }

    /// Drain buffered notifications.
    pub fn drain_events(&mut self) -> Vec<TimelockEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- action queue ----

    /// Owner-only: queue `action` for execution at its eta.
    pub fn queue_action(
        &mut self,
        caller: Address,
        action: Action,
        now: u64,
    ) -> Result<Hash, GovernanceError> {
        self.ensure_owner(caller)?;
        let earliest = now + self.delay;
        if action.eta < earliest {
            return Err(GovernanceError::DelayNotMet {
                eta: action.eta,
                earliest,
            });
        }
        let hash = action.hash();
        if self.queued.contains_key(&hash) {
            return Err(GovernanceError::ActionAlreadyQueued(hash));
        }

        debug!(%hash, target = %action.target, eta = action.eta, "action queued");
        self.events.push(TimelockEvent::ActionQueued {
            hash,
            target: action.target,
            eta: action.eta,
        });
        self.queued.insert(hash, action);
        Ok(hash)
    }

    /// Owner-only: remove `action` from the queue. Removing an action
    /// that is not queued is a no-op.
    pub fn cancel_action(
        &mut self,
        caller: Address,
        action: &Action,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        let hash = action.hash();
        if self.queued.remove(&hash).is_some() {
            debug!(%hash, "action canceled");
            self.events.push(TimelockEvent::ActionCanceled { hash });
        }
        Ok(())
    }

    /// Owner-only: execute a queued action inside its window.
    ///
    /// The queue entry is consumed before the target call, so a reverting
    /// target surfaces `ActionReverted` with the entry already gone;
    /// re-queuing a fixed action is the recovery path.
    pub fn execute_action(
        &mut self,
        caller: Address,
        action: &Action,
        now: u64,
        dispatcher: &mut dyn ActionDispatcher,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.ready(action, now)?;
        self.consume(action);

        dispatcher
            .dispatch(&[action.call()])
            .map_err(|e| GovernanceError::ActionReverted(e.0))
    }

    /// Remove a validated entry and record its execution.
    pub(crate) fn consume(&mut self, action: &Action) {
        let hash = action.hash();
        if self.queued.remove(&hash).is_some() {
            debug!(%hash, "action executed");
            self.events.push(TimelockEvent::ActionExecuted { hash });
        }
    }

    // ---- two-step owner handover ----

    /// Owner-only: record `candidate` as the proposed next owner.
    /// Authority does not move until the candidate accepts.
    pub fn propose_owner(
        &mut self,
        caller: Address,
        candidate: Address,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.proposed_owner = Some(candidate);
        info!(%candidate, proposer = %caller, "timelock owner proposed");
        self.events.push(TimelockEvent::OwnerProposed {
            candidate,
            proposer: caller,
        });
        Ok(())
    }

    /// Candidate-only: complete the handover and clear the pending slot.
    pub fn proposed_owner_accept(&mut self, caller: Address) -> Result<(), GovernanceError> {
        if self.proposed_owner != Some(caller) {
            return Err(GovernanceError::CallerNotPermitted);
        }
        let previous = self.owner;
        self.owner = caller;
        self.proposed_owner = None;
        info!(%previous, current = %caller, "timelock ownership transferred");
        self.events.push(TimelockEvent::OwnershipTransferred {
            previous,
            current: caller,
        });
        Ok(())
    }

    /// Permanently disabled: ownership only moves via the two-step path.
    pub fn transfer_ownership(
        &mut self,
        _caller: Address,
        _new_owner: Address,
    ) -> Result<(), GovernanceError> {
        Err(GovernanceError::Terminated)
    }

    /// Owner-only: give up ownership for good (owner becomes the zero
    /// address, which can never call or accept).
    pub fn renounce_ownership(&mut self, caller: Address) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        let previous = self.owner;
        self.owner = Address::ZERO;
        self.proposed_owner = None;
        info!(%previous, "timelock ownership renounced");
        self.events.push(TimelockEvent::OwnershipTransferred {
            previous,
            current: Address::ZERO,
        });
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), GovernanceError> {
        if caller.is_zero() || caller != self.owner {
            return Err(GovernanceError::CallerNotPermitted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchError;

    const WEEK: u64 = 7 * 24 * 60 * 60;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::from_bytes(bytes)
    }

    fn action(n: u8, eta: u64) -> Action {
        Action {
            target: addr(n),
            value: 0,
            signature: "setValue(uint256)".to_string(),
            calldata: vec![n],
            eta,
        }
    }

    /// Dispatcher recording calls, optionally failing.
    struct Recorder {
        calls: Vec<ActionCall>,
        fail: bool,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                fail: false,
            }
        }
    }

    impl ActionDispatcher for Recorder {
        fn dispatch(&mut self, calls: &[ActionCall]) -> Result<(), DispatchError> {
            if self.fail {
                return Err(DispatchError("target reverted".to_string()));
            }
            self.calls.extend_from_slice(calls);
            Ok(())
        }
    }

    #[test]
    fn test_delay_bounds() {
        assert!(ExecutionTimelock::new(addr(1), MINIMUM_DELAY - 1).is_err());
        assert!(ExecutionTimelock::new(addr(1), MAXIMUM_DELAY + 1).is_err());
        assert!(ExecutionTimelock::new(addr(1), WEEK).is_ok());
    }

    #[test]
    fn test_queue_requires_owner_and_delay() {
        let owner = addr(1);
        let mut tl = ExecutionTimelock::new(owner, WEEK).unwrap();

        assert_eq!(
            tl.queue_action(addr(9), action(1, 1_000 + WEEK), 1_000),
            Err(GovernanceError::CallerNotPermitted)
        );
        assert_eq!(
            tl.queue_action(owner, action(1, 1_000 + WEEK - 1), 1_000),
            Err(GovernanceError::DelayNotMet {
                eta: 1_000 + WEEK - 1,
                earliest: 1_000 + WEEK
            })
        );
        tl.queue_action(owner, action(1, 1_000 + WEEK), 1_000).unwrap();
    }

    #[test]
    fn test_duplicate_queue_fails() {
        let owner = addr(1);
        let mut tl = ExecutionTimelock::new(owner, WEEK).unwrap();
        let a = action(1, 1_000 + WEEK);

        let hash = tl.queue_action(owner, a.clone(), 1_000).unwrap();
        assert_eq!(
            tl.queue_action(owner, a.clone(), 1_000),
            Err(GovernanceError::ActionAlreadyQueued(hash))
        );

        // Same tuple at a different eta is a different action
        tl.queue_action(owner, action(1, 1_001 + WEEK), 1_000).unwrap();
    }

    #[test]
    fn test_execute_window() {
        let owner = addr(1);
        let mut tl = ExecutionTimelock::new(owner, WEEK).unwrap();
        let eta = 1_000 + WEEK;
        let a = action(1, eta);
        tl.queue_action(owner, a.clone(), 1_000).unwrap();

        let mut d = Recorder::new();
        assert_eq!(
            tl.execute_action(owner, &a, eta - 1, &mut d),
            Err(GovernanceError::TooEarly { eta, now: eta - 1 })
        );
        assert_eq!(
            tl.execute_action(owner, &a, eta + GRACE_PERIOD + 1, &mut d),
            Err(GovernanceError::Expired {
                deadline: eta + GRACE_PERIOD,
                now: eta + GRACE_PERIOD + 1
            })
        );
        // Window errors never consume the entry
        assert!(tl.is_queued(&a));

        tl.execute_action(owner, &a, eta, &mut d).unwrap();
        assert!(!tl.is_queued(&a));
        assert_eq!(d.calls, vec![a.call()]);

        // Entry is gone
        assert_eq!(
            tl.execute_action(owner, &a, eta, &mut d),
            Err(GovernanceError::ActionNotQueued(a.hash()))
        );
    }

    #[test]
    fn test_execute_reverting_target_consumes_entry() {
        let owner = addr(1);
        let mut tl = ExecutionTimelock::new(owner, WEEK).unwrap();
        let eta = 1_000 + WEEK;
        let a = action(1, eta);
        tl.queue_action(owner, a.clone(), 1_000).unwrap();

        let mut d = Recorder::new();
        d.fail = true;
        assert_eq!(
            tl.execute_action(owner, &a, eta, &mut d),
            Err(GovernanceError::ActionReverted("target reverted".to_string()))
        );
        // Consumed: re-queue is the recovery path
        assert!(!tl.is_queued(&a));
    }

    #[test]
    fn test_cancel_action() {
        let owner = addr(1);
        let mut tl = ExecutionTimelock::new(owner, WEEK).unwrap();
        let a = action(1, 1_000 + WEEK);
        tl.queue_action(owner, a.clone(), 1_000).unwrap();

        assert_eq!(
            tl.cancel_action(addr(9), &a),
            Err(GovernanceError::CallerNotPermitted)
        );
        tl.cancel_action(owner, &a).unwrap();
        assert!(!tl.is_queued(&a));

        // Absent entry: no-op
        tl.cancel_action(owner, &a).unwrap();
    }

    #[test]
    fn test_two_step_handover() {
        let deployer = addr(1);
        let candidate = addr(2);
        let mut tl = ExecutionTimelock::new(deployer, WEEK).unwrap();

        // Only the owner may propose
        assert_eq!(
            tl.propose_owner(candidate, candidate),
            Err(GovernanceError::CallerNotPermitted)
        );
        tl.propose_owner(deployer, candidate).unwrap();
        assert_eq!(tl.proposed_owner(), Some(candidate));
        assert_eq!(tl.owner(), deployer);

        // Only the candidate may accept
        assert_eq!(
            tl.proposed_owner_accept(addr(9)),
            Err(GovernanceError::CallerNotPermitted)
        );
        tl.proposed_owner_accept(candidate).unwrap();
        assert_eq!(tl.owner(), candidate);
        assert_eq!(tl.proposed_owner(), None);

        let events = tl.drain_events();
        assert!(events.contains(&TimelockEvent::OwnerProposed {
            candidate,
            proposer: deployer
        }));
        assert!(events.contains(&TimelockEvent::OwnershipTransferred {
            previous: deployer,
            current: candidate
        }));
    }

    #[test]
    fn test_direct_transfer_terminated() {
        let mut tl = ExecutionTimelock::new(addr(1), WEEK).unwrap();
        assert_eq!(
            tl.transfer_ownership(addr(1), addr(2)),
            Err(GovernanceError::Terminated)
        );
        // Even the owner cannot bypass the two-step path
        assert_eq!(tl.owner(), addr(1));
    }

    #[test]
    fn test_renounce_ownership() {
        let owner = addr(1);
        let mut tl = ExecutionTimelock::new(owner, WEEK).unwrap();
        tl.propose_owner(owner, addr(2)).unwrap();

        tl.renounce_ownership(owner).unwrap();
        assert_eq!(tl.owner(), Address::ZERO);
        assert_eq!(tl.proposed_owner(), None);

        // Nobody is permitted any more, the zero address included
        assert_eq!(
            tl.propose_owner(owner, addr(2)),
            Err(GovernanceError::CallerNotPermitted)
        );
        assert_eq!(
            tl.propose_owner(Address::ZERO, addr(2)),
            Err(GovernanceError::CallerNotPermitted)
        );
    }

    #[test]
    fn test_action_hash_distinguishes_fields() {
        let base = action(1, 1_000);
        let mut other = base.clone();
        other.value = 1;
        assert_ne!(base.hash(), other.hash());

        // Length prefixes: ("ab", "c") vs ("a", "bc") across fields
        let a = Action {
            target: addr(1),
            value: 0,
            signature: "ab".to_string(),
            calldata: b"c".to_vec(),
            eta: 0,
        };
        let b = Action {
            target: addr(1),
            value: 0,
            signature: "a".to_string(),
            calldata: b"bc".to_vec(),
            eta: 0,
        };
        assert_ne!(a.hash(), b.hash());
    }
}
