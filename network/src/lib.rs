//! Abstract message-passing layer shared by the replicas of the
//! replicated state machine.
//!
//! `Transport<M>` is deliberately generic over the message type `M`: it
//! carries no opinion about wire framing, transport security, or even
//! what a message *is* — those are out of scope (see spec §1). What it
//! guarantees is the shape the PBFT replica's main loop depends on: each
//! node has its own FIFO mailbox, messages are delivered in arrival
//! order, and waiting on an empty mailbox can time out rather than block
//! forever.
//!
//! A single-process deployment runs one OS thread per replica, each
//! holding a clone of the `Transport` (to `send`/`broadcast`) and sole
//! ownership of its own [`Mailbox`] (to receive). `crossbeam-channel`'s
//! multi-producer, multi-consumer queue is a natural fit for that
//! sender-shared / receiver-owned split.

use std::collections::HashMap;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// The sending half of the network, shared by every replica thread.
///
/// Cloning a `Transport` clones the underlying channel senders, not the
/// mailboxes themselves — every clone reaches the same set of inboxes.
pub struct Transport<M> {
    senders: HashMap<String, Sender<M>>,
}

impl<M> Transport<M> {
    /// Builds a fully-connected transport for `node_ids` and returns it
    /// alongside the matching per-node mailboxes. Each node id should be
    /// handed its own `Mailbox` and nobody else's — the type does not
    /// enforce that, as there is nothing in this abstract layer to
    /// enforce it with.
    pub fn new<I, S>(node_ids: I) -> (Self, HashMap<String, Mailbox<M>>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut senders = HashMap::new();
        let mut mailboxes = HashMap::new();
        for id in node_ids {
            let id = id.into();
            let (tx, rx) = unbounded();
            senders.insert(id.clone(), tx);
            mailboxes.insert(id, Mailbox { receiver: rx });
        }
        (Transport { senders }, mailboxes)
    }

    /// Sends `message` to `recipient`'s mailbox. Silently a no-op if
    /// `recipient` is not a known node id, matching the reference
    /// transport's behaviour of dropping sends to unknown nodes.
    pub fn send(&self, recipient: &str, message: M) {
        if let Some(tx) = self.senders.get(recipient) {
            let _ = tx.send(message);
        }
    }

    /// Sends a clone of `message` to every node's mailbox except
    /// `sender`'s own.
    pub fn broadcast(&self, sender: &str, message: M)
    where
        M: Clone,
    {
        for (id, tx) in &self.senders {
            if id != sender {
                let _ = tx.send(message.clone());
            }
        }
    }

    /// The node ids this transport knows how to reach.
    pub fn node_ids(&self) -> impl Iterator<Item = &String> {
        self.senders.keys()
    }
}

impl<M> Clone for Transport<M> {
    fn clone(&self) -> Self {
        Transport {
            senders: self.senders.clone(),
        }
    }
}

/// A single replica's inbound FIFO queue.
///
/// `recv_timeout` is the one blocking operation in the whole platform
/// (see spec §5): it waits up to `timeout` for a message and returns
/// `None` on deadline expiry, which is exactly the signal the PBFT
/// replica's main loop uses to drive a view change.
pub struct Mailbox<M> {
    receiver: Receiver<M>,
}

impl<M> Mailbox<M> {
    /// Waits up to `timeout` for the next message in arrival order.
    /// Returns `None` if the deadline passes with nothing delivered.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<M> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_delivers_only_to_recipient() {
        let (transport, mailboxes) = Transport::new(["a", "b"]);
        transport.send("b", "hello");
        assert_eq!(
            mailboxes["b"].recv_timeout(Duration::from_millis(50)),
            Some("hello")
        );
        assert_eq!(mailboxes["a"].recv_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn broadcast_skips_the_sender() {
        let (transport, mailboxes) = Transport::new(["a", "b", "c"]);
        transport.broadcast("a", "ping");
        assert_eq!(mailboxes["a"].recv_timeout(Duration::from_millis(10)), None);
        assert_eq!(
            mailboxes["b"].recv_timeout(Duration::from_millis(50)),
            Some("ping")
        );
        assert_eq!(
            mailboxes["c"].recv_timeout(Duration::from_millis(50)),
            Some("ping")
        );
    }

    #[test]
    fn send_to_unknown_node_is_a_silent_no_op() {
        let (transport, _mailboxes) = Transport::new(["a"]);
        transport.send("ghost", "nothing to see");
    }

    #[test]
    fn mailbox_times_out_when_empty() {
        let (_transport, mailboxes) = Transport::<&str>::new(["a"]);
        let start = std::time::Instant::now();
        assert_eq!(mailboxes["a"].recv_timeout(Duration::from_millis(20)), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn cloned_transport_shares_the_same_mailboxes() {
        let (transport, mailboxes) = Transport::new(["a"]);
        let clone = transport.clone();
        clone.send("a", "via-clone");
        assert_eq!(
            mailboxes["a"].recv_timeout(Duration::from_millis(50)),
            Some("via-clone")
        );
    }
}
