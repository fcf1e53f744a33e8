//! PBFT replica: the state machine that ties the ledger and VM in
//! `rsm-core` together over the abstract transport in `rsm-network`
//! (spec §4.D).
//!
//! Agreement here is a three-phase pipeline — PRE-PREPARE, PREPARE,
//! COMMIT — run once per sequence number, with a rudimentary,
//! notification-only view change on mailbox timeout. There is
//! deliberately no NEW-VIEW reconstruction: a replica that adopts a
//! later view simply stops acting on the old one, it does not replay or
//! re-propose in-flight work (spec §9).

pub mod config;
pub mod error;
pub mod message;
pub mod replica;

pub use config::{ReplicaConfig, ReplicaConfigBuilder};
pub use error::{ConsensusError, Result};
pub use message::Message;
pub use replica::Replica;
