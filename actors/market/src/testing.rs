use std::collections::{BTreeMap, BTreeSet};

use fvm_ipld_blockstore::Blockstore;
use fvm_shared::address::Address;
use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use num_traits::Signed;

use fil_actors_runtime::MessageAccumulator;

use crate::State;

#[derive(Default, Clone, Debug)]
pub struct StateSummary {
    pub miners: BTreeSet<Address>,
    pub ask_count: u64,
    /// Ask ids posted by each miner.
    pub asks_by_owner: BTreeMap<Address, Vec<u64>>,
    /// Total size offered by each miner's asks.
    pub ask_storage_by_owner: BTreeMap<Address, BigInt>,
    pub bid_count: u64,
    pub bid_escrow: TokenAmount,
}

/// Checks internal invariants of market state
pub fn check_state_invariants<BS: Blockstore>(
    state: &State,
    store: &BS,
    balance: &TokenAmount,
) -> (StateSummary, MessageAccumulator) {
    let acc = MessageAccumulator::default();

    let miners: BTreeSet<Address> = acc
        .require_no_error(state.miners(store), "error loading miners")
        .into_iter()
        .flatten()
        .collect();

    acc.require(
        state.next_ask_id == state.orderbook.asks.len() as u64,
        format!(
            "next ask id {} does not match {} asks",
            state.next_ask_id,
            state.orderbook.asks.len()
        ),
    );
    let mut asks_by_owner = BTreeMap::<Address, Vec<u64>>::new();
    let mut ask_storage_by_owner = BTreeMap::<Address, BigInt>::new();
    for (i, ask) in state.orderbook.asks.iter().enumerate() {
        asks_by_owner.entry(ask.owner).or_default().push(ask.id);
        *ask_storage_by_owner.entry(ask.owner).or_default() += &ask.size;

        acc.require(ask.id == i as u64, format!("ask at position {i} has id {}", ask.id));
        acc.require(ask.size.is_positive(), format!("ask {} has non-positive size", ask.id));
        acc.require(!ask.price.is_negative(), format!("ask {} has negative price", ask.id));
        acc.require(
            miners.contains(&ask.owner),
            format!("ask {} owner {} is not a registered miner", ask.id, ask.owner),
        );
    }

    acc.require(
        state.next_bid_id == state.orderbook.bids.len() as u64,
        format!(
            "next bid id {} does not match {} bids",
            state.next_bid_id,
            state.orderbook.bids.len()
        ),
    );
    for (i, bid) in state.orderbook.bids.iter().enumerate() {
        acc.require(bid.id == i as u64, format!("bid at position {i} has id {}", bid.id));
        acc.require(bid.size.is_positive(), format!("bid {} has non-positive size", bid.id));
        acc.require(!bid.price.is_negative(), format!("bid {} has negative price", bid.id));
    }

    let bid_escrow = state.total_bid_escrow();
    acc.require(
        &bid_escrow <= balance,
        format!("bid escrow {bid_escrow} exceeds market balance {balance}"),
    );

    (
        StateSummary {
            miners,
            ask_count: state.orderbook.asks.len() as u64,
            asks_by_owner,
            ask_storage_by_owner,
            bid_count: state.orderbook.bids.len() as u64,
            bid_escrow,
        },
        acc,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use fil_actors_runtime::runtime::EMPTY_ARR_CID;
    use fvm_ipld_blockstore::MemoryBlockstore;
    use fvm_shared::bigint::BigInt;
    use regex::Regex;

    #[test]
    fn flags_unregistered_ask_owner_and_underfunded_escrow() {
        let store = MemoryBlockstore::new();
        let mut st = State::new(&store).unwrap();
        st.add_ask(Address::new_id(500), TokenAmount::from_atto(1), BigInt::from(10));
        st.add_bid(Address::new_id(501), TokenAmount::from_atto(2), BigInt::from(10));

        let (summary, acc) = check_state_invariants(&st, &store, &TokenAmount::from_atto(5));
        assert_eq!(1, summary.ask_count);
        assert_eq!(Some(&vec![0]), summary.asks_by_owner.get(&Address::new_id(500)));
        assert_eq!(TokenAmount::from_atto(20), summary.bid_escrow);
        acc.assert_expected(&[
            Regex::new("^ask 0 owner .* is not a registered miner$").unwrap(),
            Regex::new("^bid escrow .* exceeds market balance").unwrap(),
        ]);
    }

    #[test]
    fn reports_unreadable_miner_set() {
        let store = MemoryBlockstore::new();
        let mut st = State::new(&store).unwrap();
        st.miners = *EMPTY_ARR_CID;
        st.add_ask(Address::new_id(500), TokenAmount::from_atto(1), BigInt::from(10));

        let (summary, acc) = check_state_invariants(&st, &store, &TokenAmount::from_atto(0));
        assert!(summary.miners.is_empty());
        acc.assert_expected(&[
            Regex::new("^error loading miners: ").unwrap(),
            Regex::new("^ask 0 owner .* is not a registered miner$").unwrap(),
        ]);
    }

    #[test]
    fn clean_state_passes() {
        let store = MemoryBlockstore::new();
        let mut st = State::new(&store).unwrap();
        let miner = Address::new_actor(b"miner");
        st.add_miner(&store, &miner).unwrap();
        st.add_ask(miner, TokenAmount::from_atto(1), BigInt::from(10));

        let (summary, acc) = check_state_invariants(&st, &store, &TokenAmount::from_atto(0));
        acc.assert_empty();
        assert!(summary.miners.contains(&miner));
    }
}
