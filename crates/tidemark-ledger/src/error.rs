use tidemark_types::Address;
use thiserror::Error;

/// Errors that can occur in ledger operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Caller not permitted")]
    CallerNotPermitted,

    #[error("Holder {0} is locked from sending")]
    HolderLocked(Address),

    #[error("Insufficient balance: have {balance}, need {amount}")]
    InsufficientBalance { balance: u128, amount: u128 },

    #[error("Balance overflow")]
    BalanceOverflow,

    #[error("Full mint already executed")]
    MintExecuted,

    #[error("Height {height} not yet determined (current height {current})")]
    NotYetDetermined { height: u64, current: u64 },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Nonce mismatch: expected {expected}, got {actual}")]
    NonceMismatch { expected: u64, actual: u64 },

    #[error("Signature expired at {expiry} (now {now})")]
    SignatureExpired { expiry: u64, now: u64 },
}
