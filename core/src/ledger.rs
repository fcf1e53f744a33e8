//! Hash-chained, in-memory, append-only ledger for the replicated state
//! machine.
//!
//! The ledger tracks only the sequence of sealed [`Block`]s — it has no
//! UTXO or account-balance model; value transfer is the transaction's
//! business, not the ledger's. Blocks are appended one at a time, never
//! mutated or removed, and `append` either accepts or rejects a block with
//! no partial effects either way.

use crate::block::Block;
use crate::canon::sha256_hex_of;
use crate::Transaction;

/// An ordered, in-memory sequence of [`Block`]s, starting from genesis.
///
/// Not thread-safe by itself: a PBFT replica owns its ledger exclusively
/// and guards it with the replica's own mutual-exclusion region (see the
/// `consensus` crate) rather than the ledger locking internally.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Creates a ledger containing only the genesis block
    /// (`index = 0`, `previous_hash = "0"`, no transactions).
    pub fn new() -> Self {
        Ledger {
            chain: vec![Block::genesis()],
        }
    }

    /// Number of blocks in the chain, genesis included.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always `false`: genesis is present from construction onward.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The most recently appended block.
    pub fn last(&self) -> &Block {
        self.chain.last().expect("genesis is always present")
    }

    /// The full chain, oldest (genesis) first.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Appends `block` iff it is valid with respect to [`Ledger::last`]:
    ///
    /// 1. `block.index == last().index + 1`
    /// 2. `block.previous_hash == last().hash`
    /// 3. `block.recompute_hash() == block.hash`
    ///
    /// Returns `false` and leaves the chain unchanged if any check fails.
    pub fn append(&mut self, block: Block) -> bool {
        let tip = self.last();
        if block.index != tip.index + 1 {
            return false;
        }
        if block.previous_hash != tip.hash {
            return false;
        }
        if block.recompute_hash() != block.hash {
            return false;
        }
        self.chain.push(block);
        true
    }

    /// The Merkle root of `txs`: each transaction's canonical-JSON
    /// SHA-256-hex digest becomes a leaf, then adjacent leaves are
    /// pair-combined (`SHA256(left_hex || right_hex)`, hex-concatenated
    /// before hashing) left-to-right, duplicating the trailing leaf when a
    /// level has odd length, until a single hash remains. The empty list's
    /// root is `SHA256("")`.
    pub fn merkle_root(txs: &[Transaction]) -> String {
        if txs.is_empty() {
            return sha256_hex_of(&String::new());
        }

        let mut level: Vec<String> = txs.iter().map(sha256_hex_of).collect();
        while level.len() > 1 {
            if level.len() % 2 != 0 {
                let last = level.last().cloned().expect("non-empty level");
                level.push(last);
            }
            level = level
                .chunks(2)
                .map(|pair| {
                    let combined = format!("{}{}", pair[0], pair[1]);
                    sha256_hex_of(&combined)
                })
                .collect();
        }
        level.remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(sender: &str, amount: i64) -> Transaction {
        Transaction::new(sender, "recipient", amount)
    }

    #[test]
    fn new_ledger_has_only_genesis() {
        let ledger = Ledger::new();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.last().index, 0);
        assert_eq!(ledger.last().previous_hash, "0");
    }

    #[test]
    fn append_accepts_correctly_linked_block() {
        let mut ledger = Ledger::new();
        let genesis_hash = ledger.last().hash.clone();
        let b1 = Block::new(1, Vec::new(), 1.0, genesis_hash);
        assert!(ledger.append(b1));
        assert_eq!(ledger.last().index, 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn append_rejects_wrong_index_and_leaves_chain_unchanged() {
        let mut ledger = Ledger::new();
        let genesis_hash = ledger.last().hash.clone();
        let bad = Block::new(2, Vec::new(), 1.0, genesis_hash);
        assert!(!ledger.append(bad));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn append_rejects_wrong_previous_hash() {
        let mut ledger = Ledger::new();
        let bad = Block::new(1, Vec::new(), 1.0, "not-the-tip");
        assert!(!ledger.append(bad));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn append_rejects_tampered_hash() {
        let mut ledger = Ledger::new();
        let genesis_hash = ledger.last().hash.clone();
        let mut bad = Block::new(1, Vec::new(), 1.0, genesis_hash);
        bad.hash = "0".repeat(64);
        assert!(!ledger.append(bad));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn merkle_root_of_empty_list_is_sha256_of_empty_string() {
        assert_eq!(
            Ledger::merkle_root(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn merkle_root_of_single_transaction_is_its_own_digest() {
        let t = tx("alice", 1);
        assert_eq!(Ledger::merkle_root(&[t.clone()]), sha256_hex_of(&t));
    }

    #[test]
    fn merkle_root_is_hex64_for_any_nonempty_input() {
        let txs = vec![tx("a", 1), tx("b", 2), tx("c", 3)];
        let root = Ledger::merkle_root(&txs);
        assert_eq!(root.len(), 64);
        assert!(root.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn merkle_root_duplicates_trailing_leaf_on_odd_levels() {
        let a = tx("a", 1);
        let b = tx("b", 2);
        let pair_root = Ledger::merkle_root(&[a.clone(), b.clone()]);
        let triple_root = Ledger::merkle_root(&[a.clone(), b.clone(), b.clone()]);
        // [a, b, b] duplicates the trailing b at the leaf level into
        // [a, b, b, b], which combines identically to [a,b] + [b,b] at the
        // next level as [pair_root_of(a,b), pair_root_of(b,b)].
        let bb = sha256_hex_of(&b);
        let combined_bb = sha256_hex_of(&format!("{bb}{bb}"));
        let expected = sha256_hex_of(&format!("{pair_root}{combined_bb}"));
        assert_eq!(triple_root, expected);
    }
}
