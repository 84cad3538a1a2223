// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fil_actors_runtime::{Set, DEFAULT_HAMT_CONFIG};
use fvm_ipld_blockstore::MemoryBlockstore;
use fvm_shared::address::Address;

#[test]
fn put_reports_duplicates() {
    let store = MemoryBlockstore::new();
    let mut set = Set::empty(&store, DEFAULT_HAMT_CONFIG, "miners");

    let key = Address::new_actor(b"miner");
    assert!(!set.has(&key).unwrap());

    assert!(set.put(&key).unwrap());
    assert!(set.has(&key).unwrap());
    assert!(!set.put(&key).unwrap());
}

#[test]
fn collect_keys() {
    let store = MemoryBlockstore::new();
    let mut set = Set::<_, u64>::empty(&store, DEFAULT_HAMT_CONFIG, "t");

    set.put(&0u64).unwrap();

    assert_eq!(set.collect_keys().unwrap(), [0u64]);

    set.put(&1u64).unwrap();
    set.put(&2u64).unwrap();
    set.put(&3u64).unwrap();

    assert_eq!(set.collect_keys().unwrap().len(), 4);
}

#[test]
fn survives_flush_and_load() {
    let store = MemoryBlockstore::new();
    let mut set = Set::empty(&store, DEFAULT_HAMT_CONFIG, "miners");
    let a = Address::new_id(1000);
    set.put(&a).unwrap();
    let root = set.flush().unwrap();

    let loaded = Set::<_, Address>::load(&store, &root, DEFAULT_HAMT_CONFIG, "miners").unwrap();
    assert!(loaded.has(&a).unwrap());
    assert!(!loaded.has(&Address::new_id(1001)).unwrap());
}
