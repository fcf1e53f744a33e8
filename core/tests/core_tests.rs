use rsm_core::{Block, Ledger, Transaction, Vm};

#[test]
fn ledger_append_follows_spec_scenario_one() {
    let mut ledger = Ledger::new();
    let genesis_hash = ledger.last().hash.clone();

    let b1 = Block::new(1, Vec::new(), 1.0, genesis_hash.clone());
    assert!(ledger.append(b1));
    assert_eq!(ledger.last().index, 1);

    // A second block built against the *same* genesis (wrong index for the
    // now-longer chain) must be rejected and the chain must stay at length 2.
    let stale = Block::new(2, Vec::new(), 2.0, genesis_hash);
    assert!(!ledger.append(stale));
    assert_eq!(ledger.len(), 2);
}

#[test]
fn chain_of_several_blocks_each_links_to_the_last() {
    let mut ledger = Ledger::new();
    for i in 1..=5u64 {
        let tip_hash = ledger.last().hash.clone();
        let tx = Transaction::new("client", "test", i as i64);
        let block = Block::new(i, vec![tx], i as f64, tip_hash);
        assert!(ledger.append(block));
    }
    assert_eq!(ledger.len(), 6);
    for pair in ledger.blocks().windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        assert_eq!(next.index, prev.index + 1);
        assert_eq!(next.previous_hash, prev.hash);
        assert_eq!(next.recompute_hash(), next.hash);
    }
}

#[test]
fn merkle_root_of_nonempty_list_is_lowercase_hex64() {
    let txs = vec![
        Transaction::new("a", "b", 1),
        Transaction::new("b", "c", 2),
        Transaction::new("c", "d", 3),
    ];
    let root = Ledger::merkle_root(&txs);
    assert_eq!(root.len(), 64);
    assert!(root.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
}

#[test]
fn block_commit_runs_contract_bytecode_before_sealing() {
    // Mirrors what the consensus crate's execute(s) does: run the VM on the
    // transaction's contract bytecode, then seal a block containing it.
    let tx = Transaction {
        contract_code: Some("PUSH 2 PUSH 3 ADD".to_string()),
        gas_limit: Some(100),
        ..Transaction::new("client", "contract", 0)
    };

    let mut vm = Vm::new(tx.gas_limit.unwrap());
    let result = vm.execute(tx.contract_code.as_ref().unwrap()).unwrap();
    assert_eq!(result, &[5]);

    let mut ledger = Ledger::new();
    let tip_hash = ledger.last().hash.clone();
    let block = Block::new(1, vec![tx], 10.0, tip_hash);
    assert!(ledger.append(block));
    assert_eq!(ledger.last().transactions[0].contract_code.as_deref(), Some("PUSH 2 PUSH 3 ADD"));
}
