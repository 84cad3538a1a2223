// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::tuple::*;
use fvm_shared::address::Address;
use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use num_traits::Zero;

use fil_actors_runtime::{actor_error, ActorError, Config, Set, DEFAULT_HAMT_CONFIG};

use super::types::*;

/// Storage market actor state
#[derive(Clone, Serialize_tuple, Deserialize_tuple, Debug, PartialEq, Eq)]
pub struct State {
    /// Addresses of every miner created through this market.
    /// Set<Address>
    pub miners: Cid,
    pub orderbook: Orderbook,
    /// Ids are assigned sequentially and never reused.
    pub next_ask_id: u64,
    pub next_bid_id: u64,
}

pub type MinerSet<BS> = Set<BS, Address>;
pub const MINERS_CONFIG: Config = DEFAULT_HAMT_CONFIG;

impl State {
    pub fn new<BS: Blockstore>(store: &BS) -> Result<Self, ActorError> {
        let empty_miners = MinerSet::empty(store, MINERS_CONFIG, "miners").flush()?;
        Ok(Self {
            miners: empty_miners,
            orderbook: Orderbook::default(),
            next_ask_id: 0,
            next_bid_id: 0,
        })
    }

    fn load_miners<BS: Blockstore>(&self, store: BS) -> Result<MinerSet<BS>, ActorError> {
        MinerSet::load(store, &self.miners, MINERS_CONFIG, "miners")
    }

    pub fn is_miner<BS: Blockstore>(
        &self,
        store: &BS,
        miner: &Address,
    ) -> Result<bool, ActorError> {
        self.load_miners(store)?.has(miner)
    }

    /// Registers a miner. Registering the same address twice is an error.
    pub fn add_miner<BS: Blockstore>(
        &mut self,
        store: &BS,
        miner: &Address,
    ) -> Result<(), ActorError> {
        let mut miners = self.load_miners(store)?;
        if !miners.put(miner)? {
            return Err(actor_error!(illegal_state; "miner {} already registered", miner));
        }
        self.miners = miners.flush()?;
        Ok(())
    }

    pub fn miners<BS: Blockstore>(&self, store: &BS) -> Result<Vec<Address>, ActorError> {
        self.load_miners(store)?.collect_keys()
    }

    pub fn add_ask(&mut self, owner: Address, price: TokenAmount, size: BigInt) -> u64 {
        let id = self.next_ask_id;
        self.orderbook.asks.push(Ask { id, owner, price, size });
        self.next_ask_id += 1;
        id
    }

    pub fn add_bid(&mut self, owner: Address, price: TokenAmount, size: BigInt) -> u64 {
        let id = self.next_bid_id;
        self.orderbook.bids.push(Bid { id, owner, price, size });
        self.next_bid_id += 1;
        id
    }

    pub fn get_ask(&self, id: u64) -> Option<&Ask> {
        self.orderbook.asks.iter().find(|ask| ask.id == id)
    }

    pub fn get_bid(&self, id: u64) -> Option<&Bid> {
        self.orderbook.bids.iter().find(|bid| bid.id == id)
    }

    /// Sum of the funds escrowed by open bids.
    pub fn total_bid_escrow(&self) -> TokenAmount {
        self.orderbook.bids.iter().fold(TokenAmount::zero(), |acc, bid| acc + bid.total_price())
    }
}
