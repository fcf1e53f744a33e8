//! Wire messages exchanged between PBFT replicas (spec §4.D).
//!
//! Every message that references a proposal carries the proposal's
//! `digest` rather than re-deriving it from the attached transaction —
//! agreement is reached on the digest, the transaction just rides along
//! on PRE-PREPARE so that a replica which accepts the proposal has
//! something to execute later.

use rsm_core::Transaction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// A client (or, in this workspace, the demo binary) asking the
    /// current primary to order `transaction`.
    #[serde(rename = "REQUEST")]
    Request { transaction: Transaction },

    /// The primary's proposal assigning `transaction` sequence number
    /// `seq_num` in view `view`.
    #[serde(rename = "PRE-PREPARE")]
    PrePrepare {
        view: u64,
        seq_num: u64,
        digest: String,
        transaction: Transaction,
        timestamp: f64,
    },

    /// A backup's vote that it has accepted the PRE-PREPARE for
    /// `(view, seq_num, digest)`.
    #[serde(rename = "PREPARE")]
    Prepare {
        view: u64,
        seq_num: u64,
        digest: String,
        sender: String,
    },

    /// A replica's vote that it has observed `2f` matching PREPAREs for
    /// `(view, seq_num, digest)`.
    #[serde(rename = "COMMIT")]
    Commit {
        view: u64,
        seq_num: u64,
        digest: String,
        sender: String,
    },

    /// Notification that `sender` has abandoned `view` after a mailbox
    /// timeout. There is no NEW-VIEW reconstruction in this platform
    /// (spec §9) — a view change only ever advances `self.view`.
    #[serde(rename = "VIEW-CHANGE")]
    ViewChange { view: u64, sender: String },
}
