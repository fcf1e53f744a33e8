//! Core data structures for the replicated state machine: transactions,
//! the hash-chained ledger, and the gas-metered stack VM that replicas
//! execute identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod block;
pub mod canon;
pub mod error;
pub mod ledger;
pub mod vm;

pub use block::Block;
pub use canon::{sha256_hex_of, to_canonical_json};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use vm::Vm;

/// A request to transfer value, optionally carrying contract bytecode for
/// the VM to execute once the transaction commits.
///
/// Field order here is irrelevant to hashing: `sha256_hex_of` serialises
/// through a sorted-key JSON object (see [`canon`]), so `Transaction`'s
/// canonical digest is stable regardless of how its fields are declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Free-form fields a sender attached beyond the four above. Kept so the
    /// canonical digest is sensitive to them too, matching the "open record"
    /// shape the spec describes for transactions.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Transaction {
    /// Convenience constructor for the common case of no contract call.
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            contract_code: None,
            gas_limit: None,
            extra: BTreeMap::new(),
        }
    }

    /// The SHA-256-hex digest of this transaction's canonical JSON — the
    /// `digest` field carried on every PBFT message and the value each
    /// ledger entry is rehashed against.
    pub fn digest(&self) -> String {
        sha256_hex_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_hex64() {
        let tx = Transaction::new("alice", "bob", 10);
        let d = tx.digest();
        assert_eq!(d.len(), 64);
        assert_eq!(d, tx.digest());
    }

    #[test]
    fn digest_depends_on_contract_fields() {
        let mut tx = Transaction::new("alice", "bob", 10);
        let base = tx.digest();
        tx.contract_code = Some("PUSH 1".into());
        tx.gas_limit = Some(10);
        assert_ne!(base, tx.digest());
    }
}
