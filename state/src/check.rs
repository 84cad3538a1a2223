use std::collections::BTreeMap;

use anyhow::anyhow;
use anyhow::bail;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::CborStore;
use fvm_shared::address::Address;
use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use num_traits::Zero;

use fil_actor_market::State as MarketState;
use fil_actor_miner::State as MinerState;
use fil_actors_runtime::runtime::builtins::Type;
use fil_actors_runtime::runtime::EMPTY_ARR_CID;
use fil_actors_runtime::MessageAccumulator;
use vm_api::ActorState;

use fil_actor_market::testing as market;
use fil_actor_miner::testing as miner;

macro_rules! get_state {
    ($store:ident, $actor:ident, $state:ty) => {
        $store
            .get_cbor::<$state>(&$actor.head)?
            .ok_or_else(|| anyhow!("{} is empty", stringify!($state)))?
    };
}

/// Checks every actor's own invariants, then the relationships between the
/// market and the miners it created. An `Err` means the tree could not be
/// read at all.
pub fn check_state_invariants<BS: Blockstore>(
    store: &BS,
    manifest: &BTreeMap<Cid, Type>,
    tree: &BTreeMap<Address, ActorState>,
    expected_balance_total: Option<TokenAmount>,
) -> anyhow::Result<MessageAccumulator> {
    let acc = MessageAccumulator::default();
    let mut total_fil = TokenAmount::zero();

    let mut miner_summaries = BTreeMap::<Address, miner::StateSummary>::new();
    let mut market_summary: Option<market::StateSummary> = None;

    tree.iter().try_for_each(|(key, actor)| -> anyhow::Result<()> {
        let acc = acc.with_prefix(format!("{key} "));
        total_fil += &actor.balance;
        acc.require(!actor.balance.is_negative(), format!("negative balance {}", actor.balance));

        match manifest.get(&actor.code) {
            Some(Type::Account) => {
                acc.require(
                    actor.head == *EMPTY_ARR_CID,
                    format!("account has state {}", actor.head),
                );
            }
            Some(Type::StorageMarket) => {
                let state = get_state!(store, actor, MarketState);
                let (summary, msgs) = market::check_state_invariants(&state, store, &actor.balance);
                acc.with_prefix("market: ").add_all(&msgs);
                market_summary = Some(summary);
            }
            Some(Type::Miner) => {
                let state = get_state!(store, actor, MinerState);
                let (summary, msgs) = miner::check_state_invariants(&state);
                acc.with_prefix("miner: ").add_all(&msgs);
                miner_summaries.insert(*key, summary);
            }
            None => {
                bail!("unexpected actor code CID {} for address {}", actor.code, key);
            }
        };

        Ok(())
    })?;

    // Perform cross-actor checks from state summaries here.
    match market_summary {
        Some(market_summary) => {
            check_miners_against_market(&acc, &miner_summaries, &market_summary)
        }
        None => acc.require(miner_summaries.is_empty(), "miners exist without a market"),
    }

    if let Some(expected_balance_total) = expected_balance_total {
        acc.require(
            total_fil == expected_balance_total,
            format!("total token balance is {total_fil}, expected {expected_balance_total}"),
        );
    }

    Ok(acc)
}

fn check_miners_against_market(
    acc: &MessageAccumulator,
    miner_summaries: &BTreeMap<Address, miner::StateSummary>,
    market_summary: &market::StateSummary,
) {
    for address in &market_summary.miners {
        acc.require(
            miner_summaries.contains_key(address),
            format!("market miner {address} is not a miner actor"),
        );
    }

    for (address, miner_summary) in miner_summaries {
        acc.require(
            market_summary.miners.contains(address),
            format!("miner {address} is not registered with the market"),
        );

        let posted = market_summary.asks_by_owner.get(address).cloned().unwrap_or_default();
        acc.require(
            posted == miner_summary.asks,
            format!(
                "miner {address} records asks {:?} but market holds {:?}",
                miner_summary.asks, posted
            ),
        );

        let offered = market_summary
            .ask_storage_by_owner
            .get(address)
            .cloned()
            .unwrap_or_else(BigInt::zero);
        acc.require(
            offered == miner_summary.locked_storage,
            format!(
                "miner {address} locked {} bytes but offers {} in asks",
                miner_summary.locked_storage, offered
            ),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cid::multihash::Code;
    use fvm_ipld_blockstore::MemoryBlockstore;
    use regex::Regex;

    fn manifest() -> BTreeMap<Cid, Type> {
        Type::ALL.iter().map(|t| (t.code_cid(), *t)).collect()
    }

    fn account(balance: i64) -> ActorState {
        vm_api::new_actor(
            Type::Account.code_cid(),
            *EMPTY_ARR_CID,
            0,
            TokenAmount::from_whole(balance),
        )
    }

    #[test]
    fn balances_must_sum_to_expected_total() {
        let store = MemoryBlockstore::new();
        let mut tree = BTreeMap::new();
        tree.insert(Address::new_id(100), account(3));
        tree.insert(Address::new_id(101), account(4));

        let acc = check_state_invariants(
            &store,
            &manifest(),
            &tree,
            Some(TokenAmount::from_whole(7)),
        )
        .unwrap();
        acc.assert_empty();

        let acc = check_state_invariants(
            &store,
            &manifest(),
            &tree,
            Some(TokenAmount::from_whole(8)),
        )
        .unwrap();
        acc.assert_expected(&[Regex::new("^total token balance is").unwrap()]);
    }

    #[test]
    fn unregistered_miner_is_flagged() {
        let store = MemoryBlockstore::new();
        let market = MarketState::new(&store).unwrap();
        let market_head = store.put_cbor(&market, Code::Blake2b256).unwrap();
        let miner = MinerState::new(
            Address::new_id(100),
            vec![],
            b"peer".to_vec(),
            TokenAmount::from_whole(10),
            BigInt::from(10_000),
        );
        let miner_head = store.put_cbor(&miner, Code::Blake2b256).unwrap();

        let miner_addr = Address::new_actor(b"miner");
        let mut tree = BTreeMap::new();
        tree.insert(
            Address::new_id(2),
            vm_api::new_actor(Type::StorageMarket.code_cid(), market_head, 0, TokenAmount::zero()),
        );
        tree.insert(
            miner_addr,
            vm_api::new_actor(Type::Miner.code_cid(), miner_head, 0, TokenAmount::from_whole(10)),
        );

        let acc = check_state_invariants(&store, &manifest(), &tree, None).unwrap();
        acc.assert_expected(&[Regex::new("is not registered with the market$").unwrap()]);
    }

    #[test]
    fn unknown_code_is_an_error() {
        let store = MemoryBlockstore::new();
        let mut tree = BTreeMap::new();
        tree.insert(
            Address::new_id(100),
            vm_api::new_actor(Cid::default(), *EMPTY_ARR_CID, 0, TokenAmount::zero()),
        );
        assert!(check_state_invariants(&store, &manifest(), &tree, None).is_err());
    }
}
