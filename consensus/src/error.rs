//! Error types for the **rsm-consensus** crate.
//!
//! Normal-case protocol precondition misses (wrong view, stale sequence
//! number, missing pre-prepare) are not errors — they are silently dropped
//! and logged at debug (see [`crate::replica::Replica`]). This type exists
//! only for the operator-facing construction path, where a malformed
//! replica set is a configuration mistake rather than a protocol event.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConsensusError {
    /// A replica was constructed with no peers to agree with.
    #[error("replica set must contain at least one node")]
    EmptyReplicaSet,
}

pub type Result<T> = core::result::Result<T, ConsensusError>;
