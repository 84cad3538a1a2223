use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use num_traits::{Signed, Zero};

use fil_actors_runtime::MessageAccumulator;

use crate::State;

#[derive(Clone, Debug)]
pub struct StateSummary {
    pub pledge_bytes: BigInt,
    pub locked_storage: BigInt,
    pub collateral: TokenAmount,
    pub asks: Vec<u64>,
}

/// Checks internal invariants of miner state
pub fn check_state_invariants(state: &State) -> (StateSummary, MessageAccumulator) {
    let acc = MessageAccumulator::default();

    acc.require(
        !state.collateral.is_negative(),
        format!("negative collateral {}", state.collateral),
    );
    acc.require(
        !state.pledge_bytes.is_negative(),
        format!("negative pledge {}", state.pledge_bytes),
    );
    acc.require(
        !state.locked_storage.is_negative(),
        format!("negative locked storage {}", state.locked_storage),
    );
    acc.require(
        state.locked_storage <= state.pledge_bytes,
        format!(
            "locked storage {} exceeds pledge {}",
            state.locked_storage, state.pledge_bytes
        ),
    );
    acc.require(
        state.asks.is_empty() || !state.locked_storage.is_zero(),
        format!("{} asks recorded with no storage locked", state.asks.len()),
    );

    (
        StateSummary {
            pledge_bytes: state.pledge_bytes.clone(),
            locked_storage: state.locked_storage.clone(),
            collateral: state.collateral.clone(),
            asks: state.asks.clone(),
        },
        acc,
    )
}
