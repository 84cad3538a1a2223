// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_ipld_encoding::RawBytes;
use fvm_shared::address::Address;
use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use log::info;
use num_traits::{Signed, Zero};

use fil_actors_runtime::runtime::{ActorCode, Runtime};
use fil_actors_runtime::{
    actor_dispatch, actor_error, decode_index, method_names, ActorContext, ActorError,
    STORAGE_MARKET_ACTOR_ADDR,
};

pub use self::state::*;
pub use self::types::*;

#[doc(hidden)]
pub mod ext;
pub mod testing;

mod state;
mod types;

method_names! {
    /// Storage miner actor methods available
    pub enum Method {
        Constructor = "constructor",
        UpdatePeerID = "updatePeerID",
        AddAsk = "addAsk",
        GetOwner = "getOwner",
        GetPeerID = "getPeerID",
        GetPledge = "getPledge",
    }
}

/// Miner Actor
pub struct Actor;

impl Actor {
    /// Initializes a miner. Only the storage market creates miners; the value
    /// it forwards becomes the miner's collateral.
    pub fn constructor(rt: &impl Runtime, params: ConstructorParams) -> Result<(), ActorError> {
        rt.validate_immediate_caller_is(std::iter::once(&STORAGE_MARKET_ACTOR_ADDR))?;

        let policy = rt.policy();
        if params.public_key.len() > policy.max_public_key_size {
            return Err(actor_error!(
                public_key_too_big,
                "public key of {} bytes exceeds maximum {}",
                params.public_key.len(),
                policy.max_public_key_size
            ));
        }

        let st = State::new(
            params.owner,
            params.public_key,
            params.peer_id,
            rt.message().value_received(),
            params.pledge_bytes,
        );
        rt.create(&st)?;
        Ok(())
    }

    pub fn update_peer_id(rt: &impl Runtime, params: UpdatePeerIDParams) -> Result<(), ActorError> {
        rt.transaction(|st: &mut State, rt| {
            rt.validate_immediate_caller_is(std::iter::once(&st.owner))?;
            st.peer_id = params.new_id;
            Ok(())
        })?;
        info!("miner {} changed peer id", rt.message().receiver());
        Ok(())
    }

    /// Offers pledged storage on the market. The storage stays locked for the
    /// lifetime of the ask.
    pub fn add_ask(rt: &impl Runtime, params: AddAskParams) -> Result<u64, ActorError> {
        let st: State = rt.state()?;
        rt.validate_immediate_caller_is(std::iter::once(&st.owner))?;

        if !params.size.is_positive() {
            return Err(actor_error!(
                illegal_argument,
                "ask size must be positive, was {}",
                params.size
            ));
        }
        if params.size > st.available_storage() {
            return Err(actor_error!(
                insufficient_funds,
                "not enough pledged storage for ask: {} available, {} requested",
                st.available_storage(),
                params.size
            ));
        }

        let size = params.size.clone();
        let ret = rt
            .send(
                &STORAGE_MARKET_ACTOR_ADDR,
                ext::market::ADD_ASK_METHOD,
                RawBytes::serialize(ext::market::AddAskParams {
                    price: params.price,
                    size: params.size,
                })?,
                TokenAmount::zero(),
            )
            .context("failed to post ask")?;
        let ask_id = ret
            .first()
            .and_then(|ret| decode_index(ret.bytes()))
            .ok_or_else(|| actor_error!(illegal_state, "market returned no ask id"))?;

        rt.transaction(|st: &mut State, _| st.lock_storage(ask_id, &size))?;
        Ok(ask_id)
    }

    pub fn get_owner(rt: &impl Runtime) -> Result<Address, ActorError> {
        rt.validate_immediate_caller_accept_any()?;
        let st: State = rt.state()?;
        Ok(st.owner)
    }

    pub fn get_peer_id(rt: &impl Runtime) -> Result<Vec<u8>, ActorError> {
        rt.validate_immediate_caller_accept_any()?;
        let st: State = rt.state()?;
        Ok(st.peer_id)
    }

    pub fn get_pledge(rt: &impl Runtime) -> Result<BigInt, ActorError> {
        rt.validate_immediate_caller_accept_any()?;
        let st: State = rt.state()?;
        Ok(st.pledge_bytes)
    }
}

impl ActorCode for Actor {
    type Methods = Method;

    fn name() -> &'static str {
        "StorageMiner"
    }

    actor_dispatch! {
        Constructor => constructor,
        UpdatePeerID => update_peer_id,
        AddAsk => add_ask,
        GetOwner => get_owner,
        GetPeerID => get_peer_id,
        GetPledge => get_pledge,
    }
}
