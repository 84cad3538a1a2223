use fvm_ipld_encoding::{CborStore, RawBytes};
use fvm_shared::address::{Address, BLS_PUB_LEN};
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

mod blockstore;
pub use blockstore::*;

use crate::{Message, VM};

/// Generate count addresses by seeding an rng
pub fn pk_addrs_from(seed: u64, count: u64) -> Vec<Address> {
    let mut seed_arr = [0u8; 32];
    for (i, b) in seed.to_ne_bytes().iter().enumerate() {
        seed_arr[i] = *b;
    }
    let mut rng = ChaCha8Rng::from_seed(seed_arr);
    (0..count).map(|_| new_bls_from_rng(&mut rng)).collect()
}

/// Generate nice 48 byte keys sampled uniformly at random
fn new_bls_from_rng(rng: &mut ChaCha8Rng) -> Address {
    let mut bytes = [0u8; BLS_PUB_LEN];
    rng.fill_bytes(&mut bytes);
    Address::new_bls(&bytes).unwrap()
}

/// The nonce `from` must use for its next message.
pub fn next_nonce(v: &dyn VM, from: &Address) -> u64 {
    v.actor(from).unwrap().map_or(0, |a| a.call_seq_num)
}

/// Builds a message from `from` at its current nonce.
pub fn message<S: Serialize>(
    v: &dyn VM,
    from: &Address,
    to: &Address,
    value: &TokenAmount,
    method: &str,
    params: Option<S>,
) -> Message {
    Message {
        from: *from,
        to: *to,
        nonce: next_nonce(v, from),
        value: value.clone(),
        method: method.to_string(),
        params: params.map_or_else(RawBytes::default, |p| RawBytes::serialize(p).unwrap()),
    }
}

pub fn apply_ok<S: Serialize>(
    v: &dyn VM,
    from: &Address,
    to: &Address,
    value: &TokenAmount,
    method: &str,
    params: Option<S>,
) -> Vec<RawBytes> {
    apply_code(v, from, to, value, method, params, ExitCode::OK)
}

pub fn apply_code<S: Serialize>(
    v: &dyn VM,
    from: &Address,
    to: &Address,
    value: &TokenAmount,
    method: &str,
    params: Option<S>,
    code: ExitCode,
) -> Vec<RawBytes> {
    let msg = message(v, from, to, value, method, params);
    let res = v.execute_message(&msg).unwrap();
    let detail = res.execution_error.as_ref().map(|e| e.to_string()).unwrap_or_default();
    assert_eq!(code, res.exit_code, "expected code {}, got {} ({})", code, res.exit_code, detail);
    res.return_values
}

pub fn get_state<T: DeserializeOwned>(v: &dyn VM, a: &Address) -> Option<T> {
    let head = v.actor(a).unwrap()?.head;
    DynBlockstore::wrap(v.blockstore()).get_cbor(&head).unwrap()
}
