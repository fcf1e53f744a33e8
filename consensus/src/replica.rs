//! The PBFT replica state machine (spec §4.D).
//!
//! A replica owns exactly three things nobody else touches: its
//! [`rsm_core::Ledger`], its four message logs, and the receiving half of
//! its mailbox. It reaches all of those exclusively from the single
//! thread that calls [`Replica::run`] / [`Replica::run_for`], so there is
//! no internal locking — the "replica-wide mutual exclusion" the spec
//! describes falls out of there being exactly one worker per replica
//! rather than from a guard object.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rsm_core::{Block, Ledger, Transaction, Vm};
use rsm_network::{Mailbox, Transport};

use crate::config::ReplicaConfig;
use crate::error::{ConsensusError, Result};
use crate::message::Message;

/// What a replica remembers about the PRE-PREPARE it accepted for a given
/// sequence number, until that sequence number either executes or is
/// superseded.
#[derive(Debug, Clone)]
struct Proposal {
    view: u64,
    digest: String,
    transaction: Transaction,
    timestamp: f64,
}

/// One participant in the PBFT group.
pub struct Replica {
    id: String,
    /// All replica ids, sorted — the primary of view `v` is
    /// `ids[v % ids.len()]` (spec §4.D).
    ids: Vec<String>,
    f: usize,
    view: u64,
    sequence_number: u64,
    pre_prepare_log: HashMap<u64, Proposal>,
    /// seq -> digest -> senders who PREPAREd that digest at that seq.
    prepare_log: HashMap<u64, HashMap<String, HashSet<String>>>,
    /// seq -> digest -> senders who COMMITted that digest at that seq.
    commit_log: HashMap<u64, HashMap<String, HashSet<String>>>,
    ledger: Ledger,
    transport: Transport<Message>,
    mailbox: Mailbox<Message>,
    config: ReplicaConfig,
    /// Test-only fault injection: drop REQUESTs instead of proposing them,
    /// simulating a Byzantine primary that never makes progress so the
    /// view-change path can be exercised without a second, parallel
    /// implementation of the same replica.
    drop_requests: bool,
}

impl Replica {
    /// Builds a replica over `ids` (the full replica set, including this
    /// one). Fails with [`ConsensusError::EmptyReplicaSet`] if `ids` is
    /// empty — there is no view or primary to compute over zero replicas.
    pub fn new(
        id: impl Into<String>,
        mut ids: Vec<String>,
        transport: Transport<Message>,
        mailbox: Mailbox<Message>,
        config: ReplicaConfig,
    ) -> Result<Self> {
        if ids.is_empty() {
            return Err(ConsensusError::EmptyReplicaSet);
        }
        ids.sort();
        let f = (ids.len().saturating_sub(1)) / 3;
        Ok(Replica {
            id: id.into(),
            ids,
            f,
            view: 0,
            sequence_number: 0,
            pre_prepare_log: HashMap::new(),
            prepare_log: HashMap::new(),
            commit_log: HashMap::new(),
            ledger: Ledger::new(),
            transport,
            mailbox,
            config,
            drop_requests: false,
        })
    }

    /// Simulates a Byzantine primary that silently drops client requests
    /// rather than proposing them. Not part of the protocol; exists so
    /// the view-change path is reachable from a test without a second
    /// replica implementation.
    pub fn inject_fault_drop_requests(&mut self) {
        self.drop_requests = true;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn view(&self) -> u64 {
        self.view
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn primary_for(&self, view: u64) -> &str {
        &self.ids[(view as usize) % self.ids.len()]
    }

    pub fn is_primary(&self) -> bool {
        self.primary_for(self.view) == self.id
    }

    fn prepare_threshold(&self) -> usize {
        2 * self.f
    }

    fn commit_threshold(&self) -> usize {
        2 * self.f + 1
    }

    fn now() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }

    /// Runs forever, alternating between draining the mailbox and, on
    /// each timeout, driving a view change. Intended for a long-lived
    /// process; tests and the demo binary use [`Replica::run_for`]
    /// instead so the worker thread can be joined back.
    pub fn run(mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// Runs the same loop as [`Replica::run`] but returns `self` once
    /// `duration` has elapsed, so a caller can `thread::spawn` a replica
    /// and later join the handle to inspect its resulting ledger.
    pub fn run_for(mut self, duration: Duration) -> Self {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            self.step();
        }
        self
    }

    fn step(&mut self) {
        match self.mailbox.recv_timeout(self.config.timeout) {
            Some(message) => self.handle_message(message),
            None => self.handle_timeout(),
        }
    }

    fn handle_message(&mut self, message: Message) {
        match message {
            Message::Request { transaction } => self.handle_request(transaction),
            Message::PrePrepare {
                view,
                seq_num,
                digest,
                transaction,
                timestamp,
            } => self.handle_pre_prepare(view, seq_num, digest, transaction, timestamp),
            Message::Prepare {
                view,
                seq_num,
                digest,
                sender,
            } => self.handle_prepare(view, seq_num, digest, sender),
            Message::Commit {
                view,
                seq_num,
                digest,
                sender,
            } => self.handle_commit(view, seq_num, digest, sender),
            Message::ViewChange { view, sender } => self.handle_view_change(view, sender),
        }
    }

    fn handle_request(&mut self, transaction: Transaction) {
        if !self.is_primary() || self.drop_requests {
            return;
        }
        let seq_num = self.sequence_number + 1;
        self.sequence_number = seq_num;
        let digest = transaction.digest();
        let timestamp = Self::now();
        self.pre_prepare_log.insert(
            seq_num,
            Proposal {
                view: self.view,
                digest: digest.clone(),
                transaction: transaction.clone(),
                timestamp,
            },
        );
        tracing::debug!(replica = %self.id, seq_num, %digest, "proposing pre-prepare");
        self.transport.broadcast(
            &self.id,
            Message::PrePrepare {
                view: self.view,
                seq_num,
                digest,
                transaction,
                timestamp,
            },
        );
    }

    fn handle_pre_prepare(
        &mut self,
        view: u64,
        seq_num: u64,
        digest: String,
        transaction: Transaction,
        timestamp: f64,
    ) {
        if view != self.view || seq_num <= self.sequence_number {
            tracing::debug!(
                replica = %self.id,
                view,
                self_view = self.view,
                seq_num,
                self_seq = self.sequence_number,
                "dropping pre-prepare: wrong view or stale sequence number"
            );
            return;
        }
        self.sequence_number = seq_num;
        self.pre_prepare_log.insert(
            seq_num,
            Proposal {
                view,
                digest: digest.clone(),
                transaction,
                timestamp,
            },
        );
        tracing::debug!(replica = %self.id, seq_num, %digest, "accepted pre-prepare");
        self.transport.broadcast(
            &self.id,
            Message::Prepare {
                view,
                seq_num,
                digest,
                sender: self.id.clone(),
            },
        );
    }

    fn handle_prepare(&mut self, view: u64, seq_num: u64, digest: String, sender: String) {
        if view != self.view || !self.pre_prepare_log.contains_key(&seq_num) {
            tracing::debug!(
                replica = %self.id,
                view,
                self_view = self.view,
                seq_num,
                %digest,
                %sender,
                "dropping prepare: wrong view or no matching pre-prepare"
            );
            return;
        }
        let threshold = self.prepare_threshold();
        let votes = self
            .prepare_log
            .entry(seq_num)
            .or_default()
            .entry(digest.clone())
            .or_default();
        let was_below = votes.len() < threshold;
        votes.insert(sender);
        if was_below && votes.len() >= threshold {
            tracing::debug!(replica = %self.id, seq_num, %digest, "prepared, broadcasting commit");
            self.transport.broadcast(
                &self.id,
                Message::Commit {
                    view,
                    seq_num,
                    digest,
                    sender: self.id.clone(),
                },
            );
        }
    }

    fn handle_commit(&mut self, view: u64, seq_num: u64, digest: String, sender: String) {
        if view != self.view || !self.pre_prepare_log.contains_key(&seq_num) {
            tracing::debug!(
                replica = %self.id,
                view,
                self_view = self.view,
                seq_num,
                %digest,
                %sender,
                "dropping commit: wrong view or no matching pre-prepare"
            );
            return;
        }
        let threshold = self.commit_threshold();
        let votes = self
            .commit_log
            .entry(seq_num)
            .or_default()
            .entry(digest.clone())
            .or_default();
        let was_below = votes.len() < threshold;
        votes.insert(sender);
        if was_below && votes.len() >= threshold {
            self.execute(seq_num);
        }
    }

    /// Runs the committed transaction's bytecode (if any), seals a block
    /// containing it, and appends the block to the ledger. The proposal
    /// is consumed from `pre_prepare_log` either way — a sequence number
    /// executes at most once.
    fn execute(&mut self, seq_num: u64) {
        let proposal = match self.pre_prepare_log.remove(&seq_num) {
            Some(p) => p,
            None => return,
        };
        let transaction = proposal.transaction;

        if let Some(code) = &transaction.contract_code {
            let gas_limit = transaction.gas_limit.unwrap_or(0);
            let mut vm = Vm::new(gas_limit);
            if let Err(error) = vm.execute(code) {
                tracing::warn!(
                    replica = %self.id,
                    seq_num,
                    %error,
                    "contract execution failed; sequence consumed without a block"
                );
                return;
            }
        }

        let previous_hash = self.ledger.last().hash.clone();
        let index = self.ledger.len() as u64;
        let block = Block::new(index, vec![transaction], proposal.timestamp, previous_hash);
        if self.ledger.append(block) {
            tracing::info!(replica = %self.id, index, "block committed");
        }
    }

    fn handle_timeout(&mut self) {
        let view = self.view + 1;
        tracing::info!(replica = %self.id, from = self.view, to = view, "mailbox timed out, changing view");
        self.view = view;
        self.transport.broadcast(
            &self.id,
            Message::ViewChange {
                view,
                sender: self.id.clone(),
            },
        );
    }

    fn handle_view_change(&mut self, view: u64, sender: String) {
        if view > self.view {
            tracing::info!(replica = %self.id, %sender, from = self.view, to = view, "adopting later view");
            self.view = view;
        }
    }
}
