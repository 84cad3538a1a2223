use fil_actor_market::AddBidParams;
use fil_actor_miner::{AddAskParams, UpdatePeerIDParams};
use fil_actors_runtime::runtime::Policy;
use fil_actors_runtime::STORAGE_MARKET_ACTOR_ADDR;
use fil_builtin_vm::{BuiltinActors, VM};
use fvm_ipld_blockstore::MemoryBlockstore;
use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;
use num_traits::Zero;
use vm_api::util::{apply_code, apply_ok};

mod util;
use util::*;

/// Runs a fixed mix of successful and failing messages.
fn run_scenario(v: &dyn vm_api::VM) {
    let [owner, client]: [_; 2] =
        create_accounts(v, 2, &TokenAmount::from_whole(1_000)).try_into().unwrap();
    let miner =
        create_miner(v, &owner, miner_params(20_000, b"peer"), &TokenAmount::from_whole(50));
    apply_ok(
        v,
        &owner,
        &miner,
        &TokenAmount::zero(),
        "updatePeerID",
        Some(UpdatePeerIDParams { new_id: b"peer-2".to_vec() }),
    );
    apply_ok(
        v,
        &owner,
        &miner,
        &TokenAmount::zero(),
        "addAsk",
        Some(AddAskParams { price: TokenAmount::from_atto(7), size: BigInt::from(500) }),
    );
    apply_ok(
        v,
        &client,
        &STORAGE_MARKET_ACTOR_ADDR,
        &TokenAmount::from_atto(1_000),
        "addBid",
        Some(AddBidParams { price: TokenAmount::from_atto(10), size: BigInt::from(100) }),
    );
    apply_code(
        v,
        &client,
        &miner,
        &TokenAmount::zero(),
        "addAsk",
        Some(AddAskParams { price: TokenAmount::from_atto(7), size: BigInt::from(1) }),
        ExitCode::USR_FORBIDDEN,
    );
}

#[test]
fn same_messages_give_same_root() {
    init_logging();
    let (store1, store2) = (MemoryBlockstore::new(), MemoryBlockstore::new());
    let v1 = VM::new_with_singletons(&store1).unwrap();
    let v2 = VM::new_with_singletons(&store2).unwrap();
    assert_eq!(v1.state_root(), v2.state_root());

    run_scenario(&v1);
    run_scenario(&v2);
    assert_eq!(v1.state_root(), v2.state_root());
    assert_eq!(v1.actor_states().unwrap(), v2.actor_states().unwrap());
    assert_invariants(&v1);
}

#[test]
fn loaded_vm_continues_from_root() {
    init_logging();
    let store = MemoryBlockstore::new();
    let v = VM::new_with_singletons(&store).unwrap();
    run_scenario(&v);
    let root = v.state_root();

    let reloaded = VM::load(&store, &root, BuiltinActors::new(), Policy::default()).unwrap();
    assert_eq!(root, reloaded.state_root());
    assert_eq!(v.actor_states().unwrap(), reloaded.actor_states().unwrap());
    assert_invariants(&reloaded);

    // both continue identically
    post_bid(&v);
    post_bid(&reloaded);
    assert_eq!(v.state_root(), reloaded.state_root());
}

fn post_bid(v: &dyn vm_api::VM) {
    let client = create_accounts_seeded(v, 1, &TokenAmount::from_whole(3), 7)[0];
    apply_ok(
        v,
        &client,
        &STORAGE_MARKET_ACTOR_ADDR,
        &TokenAmount::from_atto(6),
        "addBid",
        Some(AddBidParams { price: TokenAmount::from_atto(2), size: BigInt::from(3) }),
    );
}
