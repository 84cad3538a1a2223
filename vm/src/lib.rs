use std::cell::RefCell;
use std::collections::BTreeMap;

use cid::multihash::Code;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::CborStore;
use fvm_shared::address::Address;
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;
use log::debug;
use num_traits::Zero;
use vm_api::trace::InvocationTrace;
use vm_api::{new_actor, vm_err, ActorState, Message, Receipt, VMError};

use fil_actor_market::State as MarketState;
use fil_actors_runtime::runtime::builtins::Type;
use fil_actors_runtime::runtime::{Policy, EMPTY_ARR_CID};
use fil_actors_runtime::{ActorError, NETWORK_ACTOR_ADDR, STORAGE_MARKET_ACTOR_ADDR};

pub use messaging::*;
pub use registry::*;
pub use state_tree::*;

mod messaging;
mod registry;
mod state_tree;

/// Whole FIL held by the network faucet account at genesis.
pub const GENESIS_FAUCET_FIL: i64 = 1_000_000_000;

/// Applies messages to a state tree held in `store`.
///
/// The tree is flushed after every message, so `state_root()` always names a
/// complete, loadable state.
pub struct VM<'bs, BS: Blockstore> {
    pub store: &'bs BS,
    state: RefCell<StateTree<&'bs BS>>,
    state_root: RefCell<Cid>,
    builtins: BuiltinActors,
    policy: Policy,
    invocations: RefCell<Vec<InvocationTrace>>,
}

impl<'bs, BS: Blockstore> VM<'bs, BS> {
    /// A VM over an empty state tree.
    pub fn new(store: &'bs BS, builtins: BuiltinActors, policy: Policy) -> Result<Self, VMError> {
        let mut state = StateTree::new(store);
        let root = state.flush()?;
        Ok(Self::with_state(store, state, root, builtins, policy))
    }

    /// A VM over the state tree at `root`.
    pub fn load(
        store: &'bs BS,
        root: &Cid,
        builtins: BuiltinActors,
        policy: Policy,
    ) -> Result<Self, VMError> {
        let state = StateTree::load(store, root)?;
        Ok(Self::with_state(store, state, *root, builtins, policy))
    }

    fn with_state(
        store: &'bs BS,
        state: StateTree<&'bs BS>,
        root: Cid,
        builtins: BuiltinActors,
        policy: Policy,
    ) -> Self {
        Self {
            store,
            state: RefCell::new(state),
            state_root: RefCell::new(root),
            builtins,
            policy,
            invocations: RefCell::new(vec![]),
        }
    }

    /// Genesis: the storage market at its singleton address and a faucet
    /// account holding the initial supply.
    pub fn new_with_singletons(store: &'bs BS) -> Result<Self, VMError> {
        let v = Self::new(store, BuiltinActors::new(), Policy::default())?;

        let market_state = MarketState::new(store)
            .map_err(|e| vm_err(&format!("failed to construct market state: {}", e.msg())))?;
        let market_head = store.put_cbor(&market_state, Code::Blake2b256)?;
        v.put_actor(
            &STORAGE_MARKET_ACTOR_ADDR,
            new_actor(
                v.builtins.code_for(Type::StorageMarket),
                market_head,
                0,
                TokenAmount::zero(),
            ),
        )?;

        v.put_actor(
            &NETWORK_ACTOR_ADDR,
            new_actor(
                v.builtins.code_for(Type::Account),
                *EMPTY_ARR_CID,
                0,
                TokenAmount::from_whole(GENESIS_FAUCET_FIL),
            ),
        )?;

        v.checkpoint()?;
        Ok(v)
    }

    pub fn state_root(&self) -> Cid {
        *self.state_root.borrow()
    }

    pub fn get_actor(&self, addr: &Address) -> anyhow::Result<Option<ActorState>> {
        self.state.borrow().get(addr)
    }

    /// Blindly overwrites the actor at this address whether it previously existed or not.
    pub fn put_actor(&self, addr: &Address, actor: ActorState) -> anyhow::Result<()> {
        self.state.borrow_mut().set(addr, actor)
    }

    pub(crate) fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: &TokenAmount,
    ) -> Result<(), ActorError> {
        self.state.borrow_mut().transfer(from, to, amount)
    }

    pub(crate) fn create_actor(&self, addr: &Address, code: Cid) -> Result<(), ActorError> {
        self.state.borrow_mut().create_or_upgrade(addr, code, *EMPTY_ARR_CID)
    }

    /// Flushes pending writes and returns the resulting root.
    pub fn checkpoint(&self) -> Result<Cid, VMError> {
        let root = self.state.borrow_mut().flush()?;
        self.state_root.replace(root);
        Ok(root)
    }

    /// Discards everything written since `root` was produced.
    pub fn rollback(&self, root: &Cid) -> Result<(), VMError> {
        self.state.replace(StateTree::load(self.store, root)?);
        self.state_root.replace(*root);
        Ok(())
    }

    /// Applies one message. Messages from unknown senders or with the wrong
    /// nonce are rejected without touching state. Past that point the nonce is
    /// always consumed, and a failure undoes every other effect of the message.
    ///
    /// Only the trace of the latest message is retained.
    pub fn apply_message(&self, msg: &Message) -> Result<Receipt, VMError> {
        self.invocations.borrow_mut().clear();
        let mut sender = match self.get_actor(&msg.from)? {
            Some(sender) => sender,
            None => {
                debug!("rejecting message from unknown sender {}", msg.from);
                return Ok(Receipt::failed(
                    ExitCode::SYS_SENDER_INVALID,
                    format!("sender {} not found", msg.from),
                ));
            }
        };
        if sender.call_seq_num != msg.nonce {
            debug!(
                "rejecting message from {}: nonce {} expected {}",
                msg.from, msg.nonce, sender.call_seq_num
            );
            return Ok(Receipt::failed(
                ExitCode::SYS_SENDER_STATE_INVALID,
                format!("expected nonce {}, got {}", sender.call_seq_num, msg.nonce),
            ));
        }

        sender.call_seq_num = match sender.call_seq_num.checked_add(1) {
            Some(next) => next,
            None => {
                return Ok(Receipt::failed(
                    ExitCode::SYS_SENDER_STATE_INVALID,
                    format!("nonce of {} is exhausted", msg.from),
                ));
            }
        };
        self.put_actor(&msg.from, sender)?;
        let prior_root = self.checkpoint()?;

        let top = TopCtx { originator: msg.from, originator_nonce: msg.nonce };
        let mut ctx = InvocationCtx::new(
            self,
            top,
            InternalMessage {
                from: msg.from,
                to: msg.to,
                value: msg.value.clone(),
                method: msg.method.clone(),
                params: msg.params.clone(),
            },
        );
        let res = ctx.invoke();
        let invoc = ctx.gather_trace(&res);
        self.invocations.borrow_mut().push(invoc);

        match res {
            Ok(return_values) => {
                let root = self.checkpoint()?;
                debug!("applied {}:{} from {}, new root {}", msg.to, msg.method, msg.from, root);
                Ok(Receipt::ok(return_values))
            }
            Err(e) => {
                debug!("rolling back {}:{} from {}: {}", msg.to, msg.method, msg.from, e);
                self.rollback(&prior_root)?;
                Ok(e.into())
            }
        }
    }

    /// Drains the trace left by the last applied message.
    pub fn take_invocations(&self) -> Vec<InvocationTrace> {
        self.invocations.take()
    }

    /// Every actor in the tree, ordered by address.
    pub fn actor_states(&self) -> Result<BTreeMap<Address, ActorState>, VMError> {
        let mut map = BTreeMap::new();
        self.state.borrow().for_each(|addr, actor| {
            map.insert(addr, actor.clone());
            Ok(())
        })?;
        Ok(map)
    }
}

impl<BS: Blockstore> vm_api::VM for VM<'_, BS> {
    fn blockstore(&self) -> &dyn Blockstore {
        self.store
    }

    fn actor(&self, address: &Address) -> Result<Option<ActorState>, VMError> {
        Ok(self.get_actor(address)?)
    }

    fn set_actor(&self, key: &Address, a: ActorState) -> Result<(), VMError> {
        Ok(self.put_actor(key, a)?)
    }

    fn balance(&self, address: &Address) -> Result<TokenAmount, VMError> {
        Ok(self.get_actor(address)?.map_or_else(TokenAmount::zero, |a| a.balance))
    }

    fn execute_message(&self, msg: &Message) -> Result<Receipt, VMError> {
        self.apply_message(msg)
    }

    fn state_root(&self) -> Cid {
        VM::state_root(self)
    }

    fn take_invocations(&self) -> Vec<InvocationTrace> {
        VM::take_invocations(self)
    }

    fn actor_manifest(&self) -> BTreeMap<Cid, Type> {
        self.builtins.manifest()
    }

    fn actor_states(&self) -> Result<BTreeMap<Address, ActorState>, VMError> {
        VM::actor_states(self)
    }

    fn policy(&self) -> &Policy {
        &self.policy
    }
}
