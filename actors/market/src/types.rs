// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_ipld_encoding::serde_bytes;
use fvm_ipld_encoding::tuple::*;
use fvm_shared::address::Address;
use fvm_shared::bigint::{bigint_ser, BigInt};
use fvm_shared::econ::TokenAmount;

#[derive(Serialize_tuple, Deserialize_tuple, Debug, Clone, Eq, PartialEq)]
pub struct CreateMinerParams {
    /// Storage capacity, in bytes, the miner commits to provide.
    #[serde(with = "bigint_ser")]
    pub pledge_bytes: BigInt,
    #[serde(with = "serde_bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub peer_id: Vec<u8>,
}

#[derive(Serialize_tuple, Deserialize_tuple, Debug, Clone, Eq, PartialEq)]
pub struct AddBidParams {
    /// Price per byte.
    pub price: TokenAmount,
    #[serde(with = "bigint_ser")]
    pub size: BigInt,
}

#[derive(Serialize_tuple, Deserialize_tuple, Debug, Clone, Eq, PartialEq)]
pub struct AddAskParams {
    /// Price per byte.
    pub price: TokenAmount,
    #[serde(with = "bigint_ser")]
    pub size: BigInt,
}

/// Storage offered by a registered miner.
#[derive(Serialize_tuple, Deserialize_tuple, Debug, Clone, Eq, PartialEq)]
pub struct Ask {
    pub id: u64,
    pub owner: Address,
    pub price: TokenAmount,
    #[serde(with = "bigint_ser")]
    pub size: BigInt,
}

/// Storage wanted by a client. The full `price * size` is escrowed in the market.
#[derive(Serialize_tuple, Deserialize_tuple, Debug, Clone, Eq, PartialEq)]
pub struct Bid {
    pub id: u64,
    pub owner: Address,
    pub price: TokenAmount,
    #[serde(with = "bigint_ser")]
    pub size: BigInt,
}

impl Bid {
    /// Funds escrowed for this bid.
    pub fn total_price(&self) -> TokenAmount {
        TokenAmount::from_atto(self.price.atto() * &self.size)
    }
}

#[derive(Serialize_tuple, Deserialize_tuple, Default, Debug, Clone, Eq, PartialEq)]
pub struct Orderbook {
    pub asks: Vec<Ask>,
    pub bids: Vec<Bid>,
}
