#![allow(dead_code)]

use fil_actor_market::CreateMinerParams;
use fil_actors_runtime::{MethodTable, METHOD_SEND, NETWORK_ACTOR_ADDR, STORAGE_MARKET_ACTOR_ADDR};
use fil_builtin_actors_state::check_state_invariants;
use fil_builtin_vm::GENESIS_FAUCET_FIL;
use fvm_ipld_encoding::RawBytes;
use fvm_shared::address::Address;
use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use vm_api::util::{apply_ok, pk_addrs_from};
use vm_api::VM;

const ACCOUNT_SEED: u64 = 93837778;

pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

pub fn create_accounts(v: &dyn VM, count: u64, balance: &TokenAmount) -> Vec<Address> {
    create_accounts_seeded(v, count, balance, ACCOUNT_SEED)
}

pub fn create_accounts_seeded(
    v: &dyn VM,
    count: u64,
    balance: &TokenAmount,
    seed: u64,
) -> Vec<Address> {
    let pk_addrs = pk_addrs_from(seed, count);
    // Send funds from faucet to pk address, creating account actor
    for pk_addr in &pk_addrs {
        apply_ok(v, &NETWORK_ACTOR_ADDR, pk_addr, balance, METHOD_SEND, None::<RawBytes>);
    }
    pk_addrs
}

pub fn miner_params(pledge_bytes: u64, peer_id: &[u8]) -> CreateMinerParams {
    CreateMinerParams {
        pledge_bytes: BigInt::from(pledge_bytes),
        public_key: vec![7; 48],
        peer_id: peer_id.to_vec(),
    }
}

/// Creates a miner through the market and returns its address.
pub fn create_miner(
    v: &dyn VM,
    owner: &Address,
    params: CreateMinerParams,
    collateral: &TokenAmount,
) -> Address {
    let ret = apply_ok(
        v,
        owner,
        &STORAGE_MARKET_ACTOR_ADDR,
        collateral,
        fil_actor_market::Method::CreateMiner.name(),
        Some(params),
    );
    assert_eq!(1, ret.len());
    Address::from_bytes(ret[0].bytes()).unwrap()
}

pub fn assert_invariants(v: &dyn VM) {
    check_state_invariants(
        &vm_api::util::DynBlockstore::wrap(v.blockstore()),
        &v.actor_manifest(),
        &v.actor_states().unwrap(),
        Some(TokenAmount::from_whole(GENESIS_FAUCET_FIL)),
    )
    .unwrap()
    .assert_empty();
}
