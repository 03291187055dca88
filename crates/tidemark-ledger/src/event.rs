use tidemark_types::Address;

/// Notifications emitted by the ledger as state changes.
///
/// Buffered per-instance and drained by whatever drives the call stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Balance moved (mints use the zero address as `from`)
    Transfer {
        from: Address,
        to: Address,
        amount: u128,
    },
    /// A holder's outgoing delegation edge changed
    DelegateChanged {
        holder: Address,
        previous: Option<Address>,
        current: Option<Address>,
    },
    /// A delegate's checkpointed power changed
    DelegateVotesChanged {
        delegate: Address,
        previous: u128,
        current: u128,
    },
    /// Holder added to the transfer-lock set
    HolderLocked(Address),
    /// Holder removed from the transfer-lock set
    HolderUnlocked(Address),
    /// Ledger ownership moved
    OwnershipTransferred {
        previous: Address,
        current: Address,
    },
}
