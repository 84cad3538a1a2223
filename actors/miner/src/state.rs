// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_ipld_encoding::serde_bytes;
use fvm_ipld_encoding::tuple::*;
use fvm_shared::address::Address;
use fvm_shared::bigint::{bigint_ser, BigInt};
use fvm_shared::econ::TokenAmount;
use num_traits::Zero;

use fil_actors_runtime::{actor_error, ActorError};

/// Storage miner actor state
#[derive(Clone, Serialize_tuple, Deserialize_tuple, Debug, PartialEq, Eq)]
pub struct State {
    /// Account that controls this miner.
    pub owner: Address,
    #[serde(with = "serde_bytes")]
    pub public_key: Vec<u8>,
    /// Libp2p identity of the miner's storage node.
    #[serde(with = "serde_bytes")]
    pub peer_id: Vec<u8>,
    /// Funds locked when the miner was created.
    pub collateral: TokenAmount,
    #[serde(with = "bigint_ser")]
    pub pledge_bytes: BigInt,
    /// Pledged storage already committed to open asks.
    #[serde(with = "bigint_ser")]
    pub locked_storage: BigInt,
    /// Market ids of the asks this miner has posted.
    pub asks: Vec<u64>,
}

impl State {
    pub fn new(
        owner: Address,
        public_key: Vec<u8>,
        peer_id: Vec<u8>,
        collateral: TokenAmount,
        pledge_bytes: BigInt,
    ) -> Self {
        Self {
            owner,
            public_key,
            peer_id,
            collateral,
            pledge_bytes,
            locked_storage: BigInt::zero(),
            asks: Vec::new(),
        }
    }

    /// Pledged storage not yet locked by an ask.
    pub fn available_storage(&self) -> BigInt {
        &self.pledge_bytes - &self.locked_storage
    }

    /// Locks `size` bytes of pledged storage against the market ask `ask_id`.
    pub fn lock_storage(&mut self, ask_id: u64, size: &BigInt) -> Result<(), ActorError> {
        if size > &self.available_storage() {
            return Err(actor_error!(
                insufficient_funds,
                "not enough pledged storage for ask: {} available, {} requested",
                self.available_storage(),
                size
            ));
        }
        self.locked_storage += size;
        self.asks.push(ask_id);
        Ok(())
    }
}
