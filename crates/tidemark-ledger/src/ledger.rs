//! The checkpointed voting-power ledger.
//!
//! Balances, one-hop delegation, per-delegate historical checkpoints and
//! the transfer-lock set live behind one component instance; every
//! mutation arrives through its methods with an explicit block height
//! supplied by the ordered external call stream.

use std::collections::{HashMap, HashSet};

use tidemark_types::{Address, UNIT};
use tracing::{debug, info};

use crate::checkpoint::{Checkpoint, Checkpoints};
use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::signed::{SignedDelegation, SigningDomain};

/// Token name, also the signing-domain name.
pub const NAME: &str = "Tidemark";
/// Token symbol.
pub const SYMBOL: &str = "TIDE";
/// Signing-domain version.
pub const VERSION: &str = "1";
/// Amount minted by the one-time full mint: 50,000,000 whole tokens.
pub const FULL_SUPPLY: u128 = 50_000_000 * UNIT;

/// Fungible balance ledger with delegation and voting-power history.
#[derive(Debug)]
pub struct VotingLedger {
    owner: Address,
    domain: SigningDomain,
    balances: HashMap<Address, u128>,
    total_supply: u128,
    /// holder -> delegate; absent means undelegated (zero power contribution)
    delegates: HashMap<Address, Address>,
    checkpoints: HashMap<Address, Checkpoints>,
    /// addresses forbidden from being the sender of a transfer
    locked: HashSet<Address>,
    /// per-signer replay counters for signed delegations
    nonces: HashMap<Address, u64>,
    events: Vec<LedgerEvent>,
}

impl VotingLedger {
    /// Create a ledger owned by `owner`, deployed as `instance` on `chain_id`.
    pub fn new(owner: Address, chain_id: u64, instance: Address) -> Self {
        Self {
            owner,
            domain: SigningDomain::new(NAME, VERSION, chain_id, instance),
            balances: HashMap::new(),
            total_supply: 0,
            delegates: HashMap::new(),
            checkpoints: HashMap::new(),
            locked: HashSet::new(),
            nonces: HashMap::new(),
            events: Vec::new(),
        }
    }

    // ---- reads ----

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    pub fn balance_of(&self, addr: &Address) -> u128 {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn delegate_of(&self, holder: &Address) -> Option<Address> {
        self.delegates.get(holder).copied()
    }

    pub fn is_locked(&self, addr: &Address) -> bool {
        self.locked.contains(addr)
    }

    pub fn nonce_of(&self, signer: &Address) -> u64 {
        self.nonces.get(signer).copied().unwrap_or(0)
    }

    /// Power at the delegate's latest checkpoint, or zero if none.
    pub fn current_votes(&self, addr: &Address) -> u128 {
        self.checkpoints.get(addr).map(|c| c.latest()).unwrap_or(0)
    }

    /// Power at the last checkpoint at or before `height`.
    ///
    /// Snapshot finality requires a past height: querying the present or
    /// the future fails with `NotYetDetermined`.
    pub fn prior_votes(
        &self,
        addr: &Address,
        height: u64,
        current_height: u64,
    ) -> Result<u128, LedgerError> {
        if height >= current_height {
            return Err(LedgerError::NotYetDetermined {
                height,
                current: current_height,
            });
        }
        Ok(self
            .checkpoints
            .get(addr)
            .map(|c| c.prior(height))
            .unwrap_or(0))
    }

    /// Number of checkpoints recorded for `addr`.
    pub fn num_checkpoints(&self, addr: &Address) -> usize {
        self.checkpoints.get(addr).map(|c| c.len()).unwrap_or(0)
    }

    /// Checkpoint at `index` for `addr`, if recorded.
    pub fn checkpoint_at(&self, addr: &Address, index: usize) -> Option<Checkpoint> {
        self.checkpoints.get(addr).and_then(|c| c.get(index))
    }

    /// Drain buffered notifications.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- mutations ----

    /// Move `amount` from `from` (the caller) to `to` at `height`.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
        height: u64,
    ) -> Result<(), LedgerError> {
        if self.locked.contains(&from) {
            return Err(LedgerError::HolderLocked(from));
        }
        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                balance: from_balance,
                amount,
            });
        }

        self.balances.insert(from, from_balance - amount);
        // Re-read after the debit so a self-transfer nets to zero.
        // Cannot overflow: the sum of balances is bounded by total_supply,
        // which mint guards with checked arithmetic.
        let to_balance = self.balance_of(&to);
        self.balances.insert(to, to_balance + amount);

        self.move_delegates(
            self.delegate_of(&from),
            self.delegate_of(&to),
            amount,
            height,
        );

        debug!(%from, %to, amount, height, "transfer");
        self.events.push(LedgerEvent::Transfer { from, to, amount });
        Ok(())
    }

    /// Set or clear the holder's delegate, moving the holder's full
    /// current balance's worth of power at `height`.
    pub fn delegate(&mut self, holder: Address, delegatee: Option<Address>, height: u64) {
        // The zero address means "clear", same as the signed wire form.
        let delegatee = delegatee.filter(|a| !a.is_zero());

        let previous = match delegatee {
            Some(d) => self.delegates.insert(holder, d),
            None => self.delegates.remove(&holder),
        };

        self.move_delegates(previous, delegatee, self.balance_of(&holder), height);

        debug!(%holder, ?previous, ?delegatee, height, "delegate");
        self.events.push(LedgerEvent::DelegateChanged {
            holder,
            previous,
            current: delegatee,
        });
    }

    /// Apply a signature-authorized delegation.
    ///
    /// Verification order is fixed: signature, nonce, expiry — all before
    /// any state mutation, so a failed check never advances the nonce.
    /// Returns the recovered signer address.
    pub fn delegate_by_sig(
        &mut self,
        signed: &SignedDelegation,
        now: u64,
        height: u64,
    ) -> Result<Address, LedgerError> {
        let digest = signed.digest(&self.domain);
        tidemark_crypto::ed25519_verify(&signed.public_key, digest.as_bytes(), &signed.signature)
            .map_err(|_| LedgerError::InvalidSignature)?;
        let signer = signed.public_key.to_address();

        let expected = self.nonce_of(&signer);
        if signed.nonce != expected {
            return Err(LedgerError::NonceMismatch {
                expected,
                actual: signed.nonce,
            });
        }
        if now > signed.expiry {
            return Err(LedgerError::SignatureExpired {
                expiry: signed.expiry,
                now,
            });
        }

        let delegatee = if signed.delegatee.is_zero() {
            None
        } else {
            Some(signed.delegatee)
        };
        self.delegate(signer, delegatee, height);
        self.nonces.insert(signer, expected + 1);
        Ok(signer)
    }

    /// Owner-only: forbid `addr` from sending transfers.
    pub fn lock_holder(&mut self, caller: Address, addr: Address) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        if self.locked.insert(addr) {
            info!(%addr, "holder locked");
            self.events.push(LedgerEvent::HolderLocked(addr));
        }
        Ok(())
    }

    /// Owner-only: allow `addr` to send transfers again.
    pub fn unlock_holder(&mut self, caller: Address, addr: Address) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        if self.locked.remove(&addr) {
            info!(%addr, "holder unlocked");
            self.events.push(LedgerEvent::HolderUnlocked(addr));
        }
        Ok(())
    }

    /// Owner-only: mint `amount` new units to `to`.
    pub fn mint_amount(
        &mut self,
        caller: Address,
        to: Address,
        amount: u128,
        height: u64,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        self.total_supply = new_supply;

        let to_balance = self.balance_of(&to);
        self.balances.insert(to, to_balance + amount);
        self.move_delegates(None, self.delegate_of(&to), amount, height);

        info!(%to, amount, supply = self.total_supply, "mint");
        self.events.push(LedgerEvent::Transfer {
            from: Address::ZERO,
            to,
            amount,
        });
        Ok(())
    }

    /// Owner-only, one-time: mint the full supply to `to`.
    pub fn mint_full(
        &mut self,
        caller: Address,
        to: Address,
        height: u64,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        if self.total_supply != 0 {
            return Err(LedgerError::MintExecuted);
        }
        self.mint_amount(caller, to, FULL_SUPPLY, height)
    }

    /// Owner-only, single-step ownership transfer.
    ///
    /// Post-handoff freezing is a deployment convention; the ledger does
    /// not enforce it.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        let previous = self.owner;
        self.owner = new_owner;
        info!(%previous, %new_owner, "ledger ownership transferred");
        self.events.push(LedgerEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    // ---- internals ----

    fn ensure_owner(&self, caller: Address) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::CallerNotPermitted);
        }
        Ok(())
    }

    /// The single funnel every power-changing path goes through: shift
    /// `amount` of power from `src` to `dst` at `height`. `None` on either
    /// side means undelegated balance, which carries no power.
    fn move_delegates(
        &mut self,
        src: Option<Address>,
        dst: Option<Address>,
        amount: u128,
        height: u64,
    ) {
        if src == dst || amount == 0 {
            return;
        }
        if let Some(delegate) = src {
            let previous = self.current_votes(&delegate);
            // Conservation: a delegate's power is the sum of delegated
            // balances, so the debit never exceeds it.
            debug_assert!(previous >= amount);
            self.write_checkpoint(delegate, height, previous.saturating_sub(amount));
        }
        if let Some(delegate) = dst {
            let previous = self.current_votes(&delegate);
            self.write_checkpoint(delegate, height, previous + amount);
        }
    }

    fn write_checkpoint(&mut self, delegate: Address, height: u64, votes: u128) {
        let previous = self.current_votes(&delegate);
        self.checkpoints
            .entry(delegate)
            .or_default()
            .write(height, votes);
        debug!(%delegate, height, previous, votes, "checkpoint");
        self.events.push(LedgerEvent::DelegateVotesChanged {
            delegate,
            previous,
            current: votes,
        });
    }
}


#[cfg(test)]
mod conservation {
    use super::*;
    use proptest::prelude::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::from_bytes(bytes)
    }

    #[derive(Debug, Clone)]
    enum Op {
        Transfer { from: u8, to: u8, amount: u128 },
        Delegate { holder: u8, delegatee: Option<u8> },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u8..5, 1u8..5, 0u128..200).prop_map(|(from, to, amount)| Op::Transfer {
                from,
                to,
                amount
            }),
            (1u8..5, proptest::option::of(1u8..5))
                .prop_map(|(holder, delegatee)| Op::Delegate { holder, delegatee }),
        ]
    }

    proptest! {
        /// After any op sequence, each delegate's current power equals the
        /// sum of balances of the holders currently delegating to it.
        #[test]
        fn prop_votes_equal_delegated_balances(ops in proptest::collection::vec(op_strategy(), 0..60)) {
            let owner = addr(0x10);
            let mut l = VotingLedger::new(owner, 1, addr(0xff));
            for h in 1u8..5 {
                l.mint_amount(owner, addr(h), 1_000, 0).unwrap();
            }

            let mut height = 1u64;
            for op in &ops {
                match op {
                    Op::Transfer { from, to, amount } => {
                        // Insufficient-balance failures are fine; they must not mutate
                        let _ = l.transfer(addr(*from), addr(*to), *amount, height);
                    }
                    Op::Delegate { holder, delegatee } => {
                        l.delegate(addr(*holder), delegatee.map(addr), height);
                    }
                }
                height += 1;
            }

            for candidate in 1u8..6 {
                let delegate = addr(candidate);
                let expected: u128 = (1u8..5)
                    .filter(|h| l.delegate_of(&addr(*h)) == Some(delegate))
                    .map(|h| l.balance_of(&addr(h)))
                    .sum();
                prop_assert_eq!(l.current_votes(&delegate), expected);
            }
        }
    }
}
