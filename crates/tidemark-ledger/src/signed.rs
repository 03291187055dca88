//! Signature-authorized delegation.
//!
//! A holder can authorize a delegation offline by signing a typed message
//! bound to one deployed ledger instance. Ed25519 carries no key recovery,
//! so the signed payload embeds the signer's public key; the ledger
//! verifies the signature and derives the signer address from that key.

use tidemark_crypto::{hash_with_domain, Keypair};
use tidemark_types::{Address, Ed25519PublicKey, Ed25519Signature, Hash};

/// Domain tag for the instance-binding digest.
const DOMAIN_TAG: &str = "tidemark/signing-domain/v1";
/// Domain tag for the delegation payload digest.
const DELEGATION_TAG: &str = "tidemark/delegation/v1";

/// Identifies one deployed ledger instance for signing purposes.
///
/// Signatures produced for one domain never verify under another: the
/// domain digest is mixed into every payload digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub instance: Address,
}

impl SigningDomain {
    pub fn new(name: &str, version: &str, chain_id: u64, instance: Address) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            chain_id,
            instance,
        }
    }

    /// Digest binding {name, version, chain id, instance address}.
    pub fn digest(&self) -> Hash {
        hash_with_domain(
            DOMAIN_TAG,
            &[
                &(self.name.len() as u64).to_be_bytes(),
                self.name.as_bytes(),
                &(self.version.len() as u64).to_be_bytes(),
                self.version.as_bytes(),
                &self.chain_id.to_be_bytes(),
                self.instance.as_bytes(),
            ],
        )
    }
}

/// A delegation authorized by signature instead of a direct call.
///
/// `delegatee` uses the zero address to mean "clear my delegation",
/// matching the wire form of the direct `delegate` operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedDelegation {
    pub delegatee: Address,
    pub nonce: u64,
    pub expiry: u64,
    pub public_key: Ed25519PublicKey,
    pub signature: Ed25519Signature,
}

impl SignedDelegation {
    /// Build and sign a delegation message for `domain`.
    pub fn sign(
        keypair: &Keypair,
        domain: &SigningDomain,
        delegatee: Address,
        nonce: u64,
        expiry: u64,
    ) -> Self {
        let digest = delegation_digest(domain, delegatee, nonce, expiry);
        Self {
            delegatee,
            nonce,
            expiry,
            public_key: keypair.public_key(),
            signature: keypair.sign(digest.as_bytes()),
        }
    }

    /// The digest this delegation's signature must cover.
    pub fn digest(&self, domain: &SigningDomain) -> Hash {
        delegation_digest(domain, self.delegatee, self.nonce, self.expiry)
    }
}

fn delegation_digest(domain: &SigningDomain, delegatee: Address, nonce: u64, expiry: u64) -> Hash {
    hash_with_domain(
        DELEGATION_TAG,
        &[
            domain.digest().as_bytes(),
            delegatee.as_bytes(),
            &nonce.to_be_bytes(),
            &expiry.to_be_bytes(),
        ],
    )
}
