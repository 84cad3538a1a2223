use fil_actors_runtime::runtime::builtins::Type;
use fil_actors_runtime::runtime::{Policy, EMPTY_ARR_CID};
use fil_actors_runtime::{ErrorKind, METHOD_SEND, NETWORK_ACTOR_ADDR, STORAGE_MARKET_ACTOR_ADDR};
use fil_builtin_vm::{BuiltinActors, GENESIS_FAUCET_FIL, VM};
use fvm_ipld_blockstore::MemoryBlockstore;
use fvm_ipld_encoding::RawBytes;
use fvm_shared::address::Address;
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;
use num_traits::Zero;
use vm_api::trace::ExpectInvocation;
use vm_api::util::{apply_code, apply_ok, message, pk_addrs_from};
use vm_api::{new_actor, Message, VM as _};

mod util;
use util::*;

#[test]
fn state_control() {
    let store = MemoryBlockstore::new();
    let v = VM::new(&store, BuiltinActors::new(), Policy::default()).unwrap();
    let addr1 = Address::new_id(1000);
    let addr2 = Address::new_id(2222);

    // set actor
    let a1 = new_actor(Type::Account.code_cid(), *EMPTY_ARR_CID, 42, TokenAmount::from_atto(10));
    v.set_actor(&addr1, a1.clone()).unwrap();
    assert_eq!(Some(a1.clone()), v.actor(&addr1).unwrap());
    let check = v.checkpoint().unwrap();

    let a2 = new_actor(Type::Miner.code_cid(), *EMPTY_ARR_CID, 88, TokenAmount::from_atto(1));
    v.set_actor(&addr2, a2.clone()).unwrap();
    assert_eq!(Some(a2), v.actor(&addr2).unwrap());
    // rollback removes a2 but not a1
    v.rollback(&check).unwrap();

    // a2 is gone
    assert_eq!(None, v.actor(&addr2).unwrap());
    assert_eq!(Some(a1), v.actor(&addr1).unwrap());
    assert_eq!(check, v.state_root());

    let states = v.actor_states().unwrap();
    assert_eq!(vec![addr1], states.keys().copied().collect::<Vec<_>>());
}

#[test]
fn genesis_singletons() {
    init_logging();
    let store = MemoryBlockstore::new();
    let v = VM::new_with_singletons(&store).unwrap();

    let market = v.actor(&STORAGE_MARKET_ACTOR_ADDR).unwrap().unwrap();
    assert_eq!(Type::StorageMarket.code_cid(), market.code);
    assert!(market.balance.is_zero());
    assert_eq!(
        TokenAmount::from_whole(GENESIS_FAUCET_FIL),
        v.balance(&NETWORK_ACTOR_ADDR).unwrap()
    );
    assert_invariants(&v);

    // reloading the genesis root sees the same tree
    let reloaded =
        VM::load(&store, &v.state_root(), BuiltinActors::new(), Policy::default()).unwrap();
    assert_eq!(v.actor_states().unwrap(), reloaded.actor_states().unwrap());
}

#[test]
fn test_sent() {
    init_logging();
    let store = MemoryBlockstore::new();
    let v = VM::new_with_singletons(&store).unwrap();
    let [addr1, addr2]: [Address; 2] = pk_addrs_from(1, 2).try_into().unwrap();

    // send to uninitialized account actor
    let value = TokenAmount::from_atto(42);
    apply_ok(&v, &NETWORK_ACTOR_ADDR, &addr1, &value, METHOD_SEND, None::<RawBytes>);
    let a1 = v.actor(&addr1).unwrap().unwrap();
    assert_eq!(Type::Account.code_cid(), a1.code);
    assert_eq!(*EMPTY_ARR_CID, a1.head);
    assert_eq!(0, a1.call_seq_num);
    assert_eq!(TokenAmount::from_atto(42), a1.balance);

    // send from this account actor to another uninit account actor
    apply_ok(&v, &addr1, &addr2, &TokenAmount::from_atto(41), METHOD_SEND, None::<RawBytes>);
    assert_eq!(TokenAmount::from_atto(1), v.balance(&addr1).unwrap());
    assert_eq!(TokenAmount::from_atto(41), v.balance(&addr2).unwrap());
    assert_eq!(1, v.actor(&addr1).unwrap().unwrap().call_seq_num);

    // self send is noop
    apply_ok(&v, &addr1, &addr1, &TokenAmount::from_atto(1), METHOD_SEND, None::<RawBytes>);
    assert_eq!(TokenAmount::from_atto(1), v.balance(&addr1).unwrap());
    assert_eq!(2, v.actor(&addr1).unwrap().unwrap().call_seq_num);

    // fail with insufficient funds, consuming the nonce
    apply_code(
        &v,
        &addr1,
        &addr2,
        &TokenAmount::from_atto(2),
        METHOD_SEND,
        None::<RawBytes>,
        ExitCode::SYS_INSUFFICIENT_FUNDS,
    );
    assert_eq!(TokenAmount::from_atto(1), v.balance(&addr1).unwrap());
    assert_eq!(TokenAmount::from_atto(41), v.balance(&addr2).unwrap());
    assert_eq!(3, v.actor(&addr1).unwrap().unwrap().call_seq_num);

    assert_invariants(&v);
}

#[test]
fn inadmissible_messages_change_nothing() {
    init_logging();
    let store = MemoryBlockstore::new();
    let v = VM::new_with_singletons(&store).unwrap();
    let owner = create_accounts(&v, 1, &TokenAmount::from_whole(10))[0];
    let root = v.state_root();

    // unknown sender
    let stranger = Address::new_id(9999);
    let receipt = v
        .apply_message(&Message {
            from: stranger,
            to: owner,
            nonce: 0,
            value: TokenAmount::zero(),
            method: METHOD_SEND.to_string(),
            params: RawBytes::default(),
        })
        .unwrap();
    assert_eq!(ExitCode::SYS_SENDER_INVALID, receipt.exit_code);
    assert_eq!(ErrorKind::ActorNotFound, receipt.execution_error.unwrap().kind);
    assert_eq!(root, v.state_root());

    // nonce from the future
    let one = TokenAmount::from_whole(1);
    let mut msg = message(&v, &owner, &stranger, &one, METHOD_SEND, None::<RawBytes>);
    msg.nonce += 1;
    let receipt = v.apply_message(&msg).unwrap();
    assert_eq!(ExitCode::SYS_SENDER_STATE_INVALID, receipt.exit_code);
    assert_eq!(ErrorKind::NonceMismatch, receipt.execution_error.unwrap().kind);
    assert!(receipt.return_values.is_empty());
    assert_eq!(root, v.state_root());
    assert_eq!(0, v.actor(&owner).unwrap().unwrap().call_seq_num);
    assert!(v.take_invocations().is_empty());

    // replaying an applied message is a nonce mismatch too
    let msg = message(&v, &owner, &stranger, &one, METHOD_SEND, None::<RawBytes>);
    assert!(v.apply_message(&msg).unwrap().is_success());
    let root = v.state_root();
    let receipt = v.apply_message(&msg).unwrap();
    assert_eq!(ExitCode::SYS_SENDER_STATE_INVALID, receipt.exit_code);
    assert_eq!(root, v.state_root());
}

#[test]
fn exhausted_nonce_is_rejected() {
    init_logging();
    let store = MemoryBlockstore::new();
    let v = VM::new_with_singletons(&store).unwrap();
    let worn = Address::new_id(3000);
    let account =
        new_actor(Type::Account.code_cid(), *EMPTY_ARR_CID, u64::MAX, TokenAmount::from_whole(5));
    v.set_actor(&worn, account.clone()).unwrap();
    let root = v.checkpoint().unwrap();

    let receipt = v
        .apply_message(&Message {
            from: worn,
            to: NETWORK_ACTOR_ADDR,
            nonce: u64::MAX,
            value: TokenAmount::from_whole(1),
            method: METHOD_SEND.to_string(),
            params: RawBytes::default(),
        })
        .unwrap();
    assert_eq!(ExitCode::SYS_SENDER_STATE_INVALID, receipt.exit_code);
    assert_eq!(root, v.state_root());
    assert_eq!(Some(account), v.actor(&worn).unwrap());
    assert_eq!(
        TokenAmount::from_whole(GENESIS_FAUCET_FIL),
        v.balance(&NETWORK_ACTOR_ADDR).unwrap()
    );
}

#[test]
fn only_the_latest_trace_is_kept() {
    init_logging();
    let store = MemoryBlockstore::new();
    let v = VM::new_with_singletons(&store).unwrap();
    let [from, to]: [Address; 2] =
        create_accounts(&v, 2, &TokenAmount::from_whole(1_000)).try_into().unwrap();

    for _ in 0..200 {
        apply_ok(&v, &from, &to, &TokenAmount::from_atto(1), METHOD_SEND, None::<RawBytes>);
    }
    let traces = v.take_invocations();
    assert_eq!(1, traces.len());
    ExpectInvocation {
        from,
        to,
        method: METHOD_SEND.to_string(),
        value: Some(TokenAmount::from_atto(1)),
        subinvocs: Some(vec![]),
        ..Default::default()
    }
    .matches(&traces[0]);
    assert!(v.take_invocations().is_empty());

    // a rejected message leaves no trace behind
    apply_ok(&v, &from, &to, &TokenAmount::from_atto(1), METHOD_SEND, None::<RawBytes>);
    let mut msg = message(&v, &from, &to, &TokenAmount::zero(), METHOD_SEND, None::<RawBytes>);
    msg.nonce += 1;
    assert!(!v.apply_message(&msg).unwrap().is_success());
    assert!(v.take_invocations().is_empty());
}

#[test]
fn unknown_method_consumes_nonce_only() {
    init_logging();
    let store = MemoryBlockstore::new();
    let v = VM::new_with_singletons(&store).unwrap();
    let owner = create_accounts(&v, 1, &TokenAmount::from_whole(10))[0];
    v.take_invocations();

    let msg = message(
        &v,
        &owner,
        &STORAGE_MARKET_ACTOR_ADDR,
        &TokenAmount::from_whole(1),
        "withdrawBalance",
        None::<RawBytes>,
    );
    let receipt = v.apply_message(&msg).unwrap();
    assert_eq!(ExitCode::USR_UNHANDLED_MESSAGE, receipt.exit_code);
    assert_eq!(ErrorKind::UnknownMethod, receipt.execution_error.unwrap().kind);

    let sender = v.actor(&owner).unwrap().unwrap();
    assert_eq!(1, sender.call_seq_num);
    assert_eq!(TokenAmount::from_whole(10), sender.balance);
    assert!(v.balance(&STORAGE_MARKET_ACTOR_ADDR).unwrap().is_zero());

    ExpectInvocation {
        from: owner,
        to: STORAGE_MARKET_ACTOR_ADDR,
        method: "withdrawBalance".to_string(),
        value: Some(TokenAmount::from_whole(1)),
        exit_code: ExitCode::USR_UNHANDLED_MESSAGE,
        subinvocs: Some(vec![]),
        ..Default::default()
    }
    .matches(v.take_invocations().last().unwrap());

    // calling a method on a plain account fails the same way and creates nothing
    let nobody = Address::new_id(5000);
    apply_code(
        &v,
        &owner,
        &nobody,
        &TokenAmount::zero(),
        "constructor",
        None::<RawBytes>,
        ExitCode::USR_UNHANDLED_MESSAGE,
    );
    assert_eq!(None, v.actor(&nobody).unwrap());
    assert_invariants(&v);
}
