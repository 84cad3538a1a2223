// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_ipld_encoding::RawBytes;
use fvm_shared::address::Address;
use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use log::info;
use num_traits::Signed;

use fil_actors_runtime::runtime::builtins::Type;
use fil_actors_runtime::runtime::{ActorCode, Runtime};
use fil_actors_runtime::{actor_dispatch, actor_error, method_names, ActorContext, ActorError};

pub use self::state::*;
pub use self::types::*;

#[doc(hidden)]
pub mod ext;
pub mod testing;

mod state;
mod types;

method_names! {
    /// Storage market actor methods available
    pub enum Method {
        CreateMiner = "createMiner",
        AddAsk = "addAsk",
        AddBid = "addBid",
    }
}

/// Storage Market Actor
pub struct Actor;

impl Actor {
    /// Creates a miner actor owned by the message origin, funded with the value sent.
    ///
    /// The miner's address is derived from the message origin and nonce, so it
    /// may already hold funds sent ahead of time. Such an account is upgraded in
    /// place and keeps its balance.
    pub fn create_miner(
        rt: &impl Runtime,
        params: CreateMinerParams,
    ) -> Result<Address, ActorError> {
        rt.validate_immediate_caller_accept_any()?;

        let policy = rt.policy();
        if params.public_key.len() > policy.max_public_key_size {
            return Err(actor_error!(
                public_key_too_big,
                "public key of {} bytes exceeds maximum {}",
                params.public_key.len(),
                policy.max_public_key_size
            ));
        }
        if params.pledge_bytes < policy.minimum_pledge_bytes {
            return Err(actor_error!(
                pledge_too_low,
                "pledge of {} bytes below minimum {}",
                params.pledge_bytes,
                policy.minimum_pledge_bytes
            ));
        }
        let collateral = rt.message().value_received();
        let required = policy.minimum_collateral(&params.pledge_bytes);
        if collateral < required {
            return Err(actor_error!(
                pledge_too_low,
                "collateral {} below {} required to pledge {} bytes",
                collateral,
                required,
                params.pledge_bytes
            ));
        }

        let owner = rt.message().origin();
        let miner = rt.new_actor_address()?;

        let st: State = rt.state()?;
        if st.is_miner(rt.store(), &miner)? {
            return Err(actor_error!(illegal_state, "miner {} already registered", miner));
        }

        rt.create_actor(Type::Miner, &miner)?;
        let pledge_bytes = params.pledge_bytes.clone();
        rt.send(
            &miner,
            ext::miner::CONSTRUCTOR_METHOD,
            RawBytes::serialize(ext::miner::MinerConstructorParams {
                owner,
                public_key: params.public_key,
                pledge_bytes: params.pledge_bytes,
                peer_id: params.peer_id,
            })?,
            collateral,
        )
        .with_context(|| format!("failed to construct miner {}", miner))?;

        rt.transaction(|st: &mut State, rt| st.add_miner(rt.store(), &miner))?;

        info!("created miner {} for owner {} pledging {} bytes", miner, owner, pledge_bytes);
        Ok(miner)
    }

    /// Posts an ask on behalf of a registered miner. Asks are backed by the
    /// miner's collateral, so no value may be attached.
    pub fn add_ask(rt: &impl Runtime, params: AddAskParams) -> Result<u64, ActorError> {
        rt.validate_immediate_caller_type(std::iter::once(&Type::Miner))?;
        let miner = rt.message().caller();

        let st: State = rt.state()?;
        if !st.is_miner(rt.store(), &miner)? {
            return Err(actor_error!(forbidden, "caller {} is not a registered miner", miner));
        }
        let value = rt.message().value_received();
        if !value.is_zero() {
            return Err(actor_error!(illegal_argument, "asks take no value, received {}", value));
        }
        validate_order(&params.price, &params.size)?;

        rt.transaction(|st: &mut State, _| Ok(st.add_ask(miner, params.price, params.size)))
    }

    /// Records a bid, escrowing exactly `price * size` from the attached value.
    pub fn add_bid(rt: &impl Runtime, params: AddBidParams) -> Result<u64, ActorError> {
        rt.validate_immediate_caller_accept_any()?;
        validate_order(&params.price, &params.size)?;

        let cost = TokenAmount::from_atto(params.price.atto() * &params.size);
        if rt.message().value_received() != cost {
            return Err(actor_error!(
                insufficient_funds,
                "must send price * size funds to create bid"
            ));
        }

        let client = rt.message().caller();
        rt.transaction(|st: &mut State, _| Ok(st.add_bid(client, params.price, params.size)))
    }
}

fn validate_order(price: &TokenAmount, size: &BigInt) -> Result<(), ActorError> {
    if price.is_negative() {
        return Err(actor_error!(illegal_argument, "negative price {}", price));
    }
    if !size.is_positive() {
        return Err(actor_error!(illegal_argument, "size must be positive, was {}", size));
    }
    Ok(())
}

impl ActorCode for Actor {
    type Methods = Method;

    fn name() -> &'static str {
        "StorageMarket"
    }

    actor_dispatch! {
        CreateMiner => create_miner,
        AddAsk => add_ask,
        AddBid => add_bid,
    }
}
